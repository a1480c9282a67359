//! Hand-rolled doubles for the GPIO, PWM, delay and HID collaborators.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::PwmPin;
use keyberon::key_code::KeyCode;

use crate::hid::{ConsumerCode, ConsumerControl, HidSink, Keyboard, MouseButton, Pointer, SinkError};
use crate::keymap::{COLS, ROWS};
use crate::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinError;

#[derive(Default)]
struct BoardState {
    closed: [[bool; COLS]; ROWS],
    high: [bool; COLS],
    reads: Vec<(usize, usize)>,
    fail_reads: bool,
}

/// A switch matrix wired to fake pins.
#[derive(Clone, Default)]
pub struct Board(Rc<RefCell<BoardState>>);

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matrix(&self) -> Matrix<RowPin, ColPin> {
        let rows = core::array::from_fn(|row| RowPin { row, board: self.clone() });
        let cols = core::array::from_fn(|col| ColPin { col, board: self.clone() });
        Matrix::new(rows, cols).unwrap()
    }

    pub fn close(&self, row: usize, col: usize) {
        self.0.borrow_mut().closed[row][col] = true;
    }

    pub fn open(&self, row: usize, col: usize) {
        self.0.borrow_mut().closed[row][col] = false;
    }

    pub fn fail_reads(&self) {
        self.0.borrow_mut().fail_reads = true;
    }

    pub fn heal(&self) {
        self.0.borrow_mut().fail_reads = false;
    }

    pub fn driven_columns(&self) -> [bool; COLS] {
        self.0.borrow().high
    }

    /// `(row, selected column)` of every row read so far.
    pub fn reads(&self) -> Vec<(usize, usize)> {
        self.0.borrow().reads.clone()
    }
}

pub struct RowPin {
    row: usize,
    board: Board,
}

impl InputPin for RowPin {
    type Error = PinError;

    fn is_high(&self) -> Result<bool, PinError> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&self) -> Result<bool, PinError> {
        let mut state = self.board.0.borrow_mut();
        if state.fail_reads {
            return Err(PinError);
        }
        let selected: Vec<usize> = (0..COLS).filter(|c| !state.high[*c]).collect();
        if let Some(col) = selected.first() {
            state.reads.push((self.row, *col));
        }
        Ok(selected.iter().any(|c| state.closed[self.row][*c]))
    }
}

pub struct ColPin {
    col: usize,
    board: Board,
}

impl OutputPin for ColPin {
    type Error = PinError;

    fn set_low(&mut self) -> Result<(), PinError> {
        self.board.0.borrow_mut().high[self.col] = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), PinError> {
        self.board.0.borrow_mut().high[self.col] = true;
        Ok(())
    }
}

pub struct Pwm {
    pub duty: u16,
    pub max: u16,
    pub enabled: bool,
}

impl Pwm {
    pub fn new(max: u16) -> Self {
        Self { duty: 0, max, enabled: false }
    }
}

impl PwmPin for Pwm {
    type Duty = u16;

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn get_duty(&self) -> u16 {
        self.duty
    }

    fn get_max_duty(&self) -> u16 {
        self.max
    }

    fn set_duty(&mut self, duty: u16) {
        self.duty = duty;
    }
}

#[derive(Default)]
pub struct Delay {
    pub waited: Vec<u32>,
}

impl DelayMs<u32> for Delay {
    fn delay_ms(&mut self, ms: u32) {
        self.waited.push(ms);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Press(Vec<KeyCode>),
    Release(Vec<KeyCode>),
    KeyboardReleaseAll,
    Move(i8, i8, i8),
    Click(MouseButton),
    PointerReleaseAll,
    Consumer(ConsumerCode),
    Reacquire,
}

/// Records every call; calls matching `fail` are recorded and then fail.
#[derive(Default)]
pub struct Sink {
    pub calls: Vec<Call>,
    pub fail: Option<fn(&Call) -> bool>,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(fail: fn(&Call) -> bool) -> Self {
        Self { calls: Vec::new(), fail: Some(fail) }
    }

    pub fn take(&mut self) -> Vec<Call> {
        core::mem::take(&mut self.calls)
    }

    fn record(&mut self, call: Call) -> Result<(), SinkError> {
        let fails = self.fail.map_or(false, |f| f(&call));
        self.calls.push(call);
        if fails {
            Err(SinkError::Transport)
        } else {
            Ok(())
        }
    }
}

impl Keyboard for Sink {
    fn press(&mut self, keys: &[KeyCode]) -> Result<(), SinkError> {
        self.record(Call::Press(keys.to_vec()))
    }

    fn release(&mut self, keys: &[KeyCode]) -> Result<(), SinkError> {
        self.record(Call::Release(keys.to_vec()))
    }

    fn release_all(&mut self) -> Result<(), SinkError> {
        self.record(Call::KeyboardReleaseAll)
    }
}

impl Pointer for Sink {
    fn move_by(&mut self, dx: i8, dy: i8, wheel: i8) -> Result<(), SinkError> {
        self.record(Call::Move(dx, dy, wheel))
    }

    fn click(&mut self, button: MouseButton) -> Result<(), SinkError> {
        self.record(Call::Click(button))
    }

    fn release_all(&mut self) -> Result<(), SinkError> {
        self.record(Call::PointerReleaseAll)
    }
}

impl ConsumerControl for Sink {
    fn send(&mut self, code: ConsumerCode) -> Result<(), SinkError> {
        self.record(Call::Consumer(code))
    }
}

impl HidSink for Sink {
    fn reacquire(&mut self) -> Result<(), SinkError> {
        self.record(Call::Reacquire)
    }
}

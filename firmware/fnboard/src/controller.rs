//! One scan-dispatch-flush cycle over an explicitly owned [`MatrixState`].

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::PwmPin;
use heapless::Vec;
use keyberon::key_code::KeyCode;

use crate::backlight::{Brightness, PwmBacklight};
use crate::dispatch::{fn_action, Dispatcher, FnAction};
use crate::flush::{flush_or_recover, FlushOutcome, PendingEvents};
use crate::hid::{HidSink, SinkError};
use crate::keymap::{Cell, Keymap, CELLS, COLS, FN_CELL, KEYMAP, ROWS};
use crate::matrix::Matrix;
use crate::scan::{self, CellGrid, CellState, Edge, Edges};
use crate::settings::Settings;
use crate::tick::{Tick, TickTimer};

/// Everything the core mutates from one cycle to the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixState {
    pub cells: CellGrid,
    pub tick: TickTimer,
    /// Tick of the last scan; `None` until the first one.
    pub last_scan: Option<Tick>,
    pub brightness: Brightness,
    pub pending: PendingEvents,
}

impl MatrixState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            cells: [[CellState::default(); COLS]; ROWS],
            tick: TickTimer::new(),
            last_scan: None,
            brightness: Brightness::new(
                settings.brightness_initial,
                settings.brightness_min,
                settings.brightness_max,
            ),
            pending: PendingEvents::new(),
        }
    }

    pub fn fn_held(&self) -> bool {
        self.cells[FN_CELL.row][FN_CELL.col].pressed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleError {
    /// A matrix line could not be driven or read.
    Matrix,
    /// An FN action could not be sent.
    Dispatch(SinkError),
}

/// What a scanned cycle did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub edges: Edges,
    pub fn_held: bool,
    pub flush: FlushOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The debounce window had not passed; nothing was read or sent.
    Skipped,
    Scanned(CycleReport),
}

pub struct Controller<I, O, P>
where
    I: InputPin,
    O: OutputPin,
{
    matrix: Matrix<I, O>,
    keymap: &'static Keymap,
    backlight: PwmBacklight<P>,
    settings: Settings,
    state: MatrixState,
}

impl<I, O, P, E> Controller<I, O, P>
where
    I: InputPin<Error = E>,
    O: OutputPin<Error = E>,
    P: PwmPin<Duty = u16>,
{
    /// Takes the backlight to its initial level.
    pub fn new(matrix: Matrix<I, O>, backlight: PwmBacklight<P>, settings: Settings) -> Self {
        let mut controller = Self {
            matrix,
            keymap: &KEYMAP,
            backlight,
            state: MatrixState::new(&settings),
            settings,
        };
        let level = controller.state.brightness.level();
        controller.backlight.set_percent(level);
        controller
    }

    pub fn state(&self) -> &MatrixState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backlight(&self) -> &PwmBacklight<P> {
        &self.backlight
    }

    /// Advance the tick counter; called once after every cycle.
    pub fn advance(&mut self) -> Tick {
        self.state.tick.advance()
    }

    /// One full cycle followed by the tick advance, as the driver loop runs it.
    pub fn cycle<S, D>(&mut self, sink: &mut S, delay: &mut D) -> Result<CycleOutcome, CycleError>
    where
        S: HidSink,
        D: DelayMs<u32>,
    {
        let outcome = self.scan_and_dispatch_one_cycle(sink, delay);
        self.advance();
        outcome
    }

    /// Scan the matrix, run FN actions for intercepted presses and flush
    /// the result to `sink`.
    ///
    /// A failed flush is handled here with the recovery sequence and shows
    /// up as [`FlushOutcome::Recovered`]. Matrix errors and failed FN
    /// actions are returned; pending releases then wait for the next flush.
    pub fn scan_and_dispatch_one_cycle<S, D>(
        &mut self,
        sink: &mut S,
        delay: &mut D,
    ) -> Result<CycleOutcome, CycleError>
    where
        S: HidSink,
        D: DelayMs<u32>,
    {
        if let Some(mark) = self.state.last_scan {
            if self.state.tick.elapsed_since(mark) <= self.settings.debounce_window {
                return Ok(CycleOutcome::Skipped);
            }
        }
        self.state.last_scan = Some(self.state.tick.current());

        let snapshot = self.matrix.scan().map_err(|_| CycleError::Matrix)?;
        // latched so every cell of this pass sees the same layer
        let fn_held = self.state.fn_held();
        let edges = scan::apply(
            &snapshot,
            &mut self.state.cells,
            self.keymap,
            fn_held,
            &mut self.state.pending,
        );

        if fn_held {
            self.intercept(&edges, sink)?;
        }

        let MatrixState { cells, pending, .. } = &mut self.state;
        pending.hold(scan::held_keys(cells));
        trace!(
            "cycle: {} edges, {} held, {} to release",
            edges.len(),
            pending.to_press.len(),
            pending.to_release.len()
        );
        let flush = flush_or_recover(pending, sink, delay, self.settings.recovery_pause_ms);

        Ok(CycleOutcome::Scanned(CycleReport { edges, fn_held, flush }))
    }

    /// Run the FN action of every fresh press that has one, in scan order.
    /// All intercepted cells stop asserting their keycode before the first
    /// action runs, so a failing action cannot leak a later one as a key.
    fn intercept<S: HidSink>(&mut self, edges: &Edges, sink: &mut S) -> Result<(), CycleError> {
        let mut actions: Vec<(Cell, FnAction), CELLS> = Vec::new();
        for edge in edges {
            let Edge::Press { cell, .. } = *edge else {
                continue;
            };
            let Some(action) = fn_action(cell) else {
                continue;
            };
            self.state.cells[cell.row][cell.col].asserted = None;
            // at most one press per cell
            let _ = actions.push((cell, action));
        }
        if actions.is_empty() {
            return Ok(());
        }

        let held: Vec<KeyCode, CELLS> = scan::held_keys(&self.state.cells).collect();
        for (cell, action) in actions {
            debug!("fn action at ({}, {})", cell.row, cell.col);
            Dispatcher {
                sink: &mut *sink,
                backlight: &mut self.backlight,
                brightness: &mut self.state.brightness,
                settings: &self.settings,
                held: &held,
            }
            .run(action)
            .map_err(CycleError::Dispatch)?;
        }
        Ok(())
    }
}

//! HID sink over the three USB interfaces shared with the `usb_rx` task.

use defmt::*;

use fugit::MicrosDurationU64;
use heapless::Vec;
use keyberon::key_code::{KbHidReport, KeyCode};
use rp_pico::hal;
use rtic::Mutex;
use usb_device::device::UsbDeviceState;
use usb_device::UsbError;
use usbd_hid::descriptor::{MediaKeyboardReport, MouseReport};

use fnboard::hid::{ConsumerCode, ConsumerControl, HidSink, Keyboard, MouseButton, Pointer, SinkError};
use fnboard::keymap::CELLS;

use crate::common::{ConsumerClass, KeyboardClass, MouseClass, UsbDevice};

/// How long a write may wait for its endpoint before giving up.
const WRITE_TIMEOUT: MicrosDurationU64 = MicrosDurationU64::millis(12);

/// Keyboard state that outlives a single cycle's sink.
pub struct HidState {
    held: Vec<KeyCode, CELLS>,
    /// Last report the host accepted; `None` forces the next write.
    sent: Option<KbHidReport>,
}

impl HidState {
    pub fn new() -> Self {
        Self {
            held: Vec::new(),
            sent: None,
        }
    }
}

pub struct UsbSink<'a, D, K, M, C> {
    timer: hal::Timer,
    usb_dev: D,
    keyboard: K,
    mouse: M,
    consumer: C,
    state: &'a mut HidState,
}

impl<'a, D, K, M, C> UsbSink<'a, D, K, M, C>
where
    D: Mutex<T = UsbDevice>,
    K: Mutex<T = KeyboardClass>,
    M: Mutex<T = MouseClass>,
    C: Mutex<T = ConsumerClass>,
{
    pub fn new(
        timer: hal::Timer,
        usb_dev: D,
        keyboard: K,
        mouse: M,
        consumer: C,
        state: &'a mut HidState,
    ) -> Self {
        Self {
            timer,
            usb_dev,
            keyboard,
            mouse,
            consumer,
            state,
        }
    }

    fn configured(&mut self) -> bool {
        self.usb_dev.lock(|usb_dev| usb_dev.state()) == UsbDeviceState::Configured
    }

    fn write_keyboard(&mut self) -> Result<(), SinkError> {
        if !self.configured() {
            return Ok(());
        }
        let report: KbHidReport = self.state.held.iter().copied().collect();
        if self.state.sent.as_ref() == Some(&report) {
            return Ok(());
        }
        self.state.sent = None;
        self.keyboard
            .lock(|keyboard| keyboard.device_mut().set_keyboard_report(report.clone()));
        let keyboard = &mut self.keyboard;
        send(self.timer, || keyboard.lock(|keyboard| keyboard.write(report.as_bytes())))?;
        self.state.sent = Some(report);
        Ok(())
    }

    fn write_mouse(&mut self, report: MouseReport) -> Result<(), SinkError> {
        if !self.configured() {
            return Ok(());
        }
        let mouse = &mut self.mouse;
        send(self.timer, || mouse.lock(|mouse| mouse.push_input(&report)))
    }

    fn write_consumer(&mut self, usage_id: u16) -> Result<(), SinkError> {
        if !self.configured() {
            return Ok(());
        }
        let report = MediaKeyboardReport { usage_id };
        let consumer = &mut self.consumer;
        send(self.timer, || consumer.lock(|consumer| consumer.push_input(&report)))
    }
}

/// Retry `write` while the endpoint is busy. keyberon signals a busy
/// endpoint with `Ok(0)`, usbd-hid with `WouldBlock`.
fn send(
    timer: hal::Timer,
    mut write: impl FnMut() -> usb_device::Result<usize>,
) -> Result<(), SinkError> {
    let deadline = timer.get_counter() + WRITE_TIMEOUT;
    loop {
        match write() {
            Ok(0) | Err(UsbError::WouldBlock) => {}
            Ok(_) => return Ok(()),
            Err(e) => {
                warn!("usb write failed: {}", Debug2Format(&e));
                return Err(SinkError::Transport);
            }
        }
        if timer.get_counter() > deadline {
            return Err(SinkError::Busy);
        }
    }
}

fn mouse_report(buttons: u8, x: i8, y: i8, wheel: i8) -> MouseReport {
    MouseReport {
        buttons,
        x,
        y,
        wheel,
        pan: 0,
    }
}

impl<'a, D, K, M, C> Keyboard for UsbSink<'a, D, K, M, C>
where
    D: Mutex<T = UsbDevice>,
    K: Mutex<T = KeyboardClass>,
    M: Mutex<T = MouseClass>,
    C: Mutex<T = ConsumerClass>,
{
    fn press(&mut self, keys: &[KeyCode]) -> Result<(), SinkError> {
        for &key in keys {
            if !self.state.held.contains(&key) && self.state.held.push(key).is_err() {
                warn!("held set full, dropping keycode {}", key as u8);
            }
        }
        self.write_keyboard()
    }

    fn release(&mut self, keys: &[KeyCode]) -> Result<(), SinkError> {
        self.state.held.retain(|key| !keys.contains(key));
        self.write_keyboard()
    }

    fn release_all(&mut self) -> Result<(), SinkError> {
        self.state.held.clear();
        self.write_keyboard()
    }
}

impl<'a, D, K, M, C> Pointer for UsbSink<'a, D, K, M, C>
where
    D: Mutex<T = UsbDevice>,
    K: Mutex<T = KeyboardClass>,
    M: Mutex<T = MouseClass>,
    C: Mutex<T = ConsumerClass>,
{
    fn move_by(&mut self, dx: i8, dy: i8, wheel: i8) -> Result<(), SinkError> {
        self.write_mouse(mouse_report(0, dx, dy, wheel))
    }

    fn click(&mut self, button: MouseButton) -> Result<(), SinkError> {
        self.write_mouse(mouse_report(button as u8, 0, 0, 0))?;
        self.write_mouse(mouse_report(0, 0, 0, 0))
    }

    fn release_all(&mut self) -> Result<(), SinkError> {
        self.write_mouse(mouse_report(0, 0, 0, 0))
    }
}

impl<'a, D, K, M, C> ConsumerControl for UsbSink<'a, D, K, M, C>
where
    D: Mutex<T = UsbDevice>,
    K: Mutex<T = KeyboardClass>,
    M: Mutex<T = MouseClass>,
    C: Mutex<T = ConsumerClass>,
{
    fn send(&mut self, code: ConsumerCode) -> Result<(), SinkError> {
        self.write_consumer(code as u16)?;
        self.write_consumer(0)
    }
}

impl<'a, D, K, M, C> HidSink for UsbSink<'a, D, K, M, C>
where
    D: Mutex<T = UsbDevice>,
    K: Mutex<T = KeyboardClass>,
    M: Mutex<T = MouseClass>,
    C: Mutex<T = ConsumerClass>,
{
    fn reacquire(&mut self) -> Result<(), SinkError> {
        info!("reacquiring hid endpoints");
        self.state.held.clear();
        self.state.sent = None;
        Pointer::release_all(self)?;
        self.write_keyboard()
    }
}

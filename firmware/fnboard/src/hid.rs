//! The HID sink the core flushes into.
//!
//! Three logical endpoints share one transport: the keyboard, the pointer
//! and consumer control. Every call may fail; the core decides what to do
//! about it (see [`crate::flush`]).

use keyberon::key_code::KeyCode;

/// Failure of a HID transport call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// The bus reported an error.
    Transport,
    /// The endpoint never became free to accept the report.
    Busy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MouseButton {
    Left = 0x01,
    Right = 0x02,
}

/// Consumer page usages sent through the consumer-control endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ConsumerCode {
    VolumeIncrement = 0xE9,
    VolumeDecrement = 0xEA,
}

pub trait Keyboard {
    /// Add `keys` to the held set and report it.
    fn press(&mut self, keys: &[KeyCode]) -> Result<(), SinkError>;
    /// Remove `keys` from the held set and report it.
    fn release(&mut self, keys: &[KeyCode]) -> Result<(), SinkError>;
    fn release_all(&mut self) -> Result<(), SinkError>;
}

pub trait Pointer {
    fn move_by(&mut self, dx: i8, dy: i8, wheel: i8) -> Result<(), SinkError>;
    /// Press and release `button`.
    fn click(&mut self, button: MouseButton) -> Result<(), SinkError>;
    fn release_all(&mut self) -> Result<(), SinkError>;
}

pub trait ConsumerControl {
    /// Press and release a single consumer usage.
    fn send(&mut self, code: ConsumerCode) -> Result<(), SinkError>;
}

/// All three endpoints, plus a way to start over with fresh handles.
pub trait HidSink: Keyboard + Pointer + ConsumerControl {
    /// Drop whatever the sink holds for the pointer and keyboard endpoints
    /// and reacquire them.
    fn reacquire(&mut self) -> Result<(), SinkError>;
}

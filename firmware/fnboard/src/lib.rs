//! Input-processing core of the fnboard keyboard.
//!
//! Every cycle the [`Controller`] samples the 6×10 matrix, turns level
//! changes into press/release edges, lets the FN layer intercept presses for
//! device-local actions (volume, backlight, pointer, text macros) and
//! flushes what should be held to the HID sink, recovering the sink when a
//! flush fails. Pins, PWM, delay and the HID endpoints are reached through
//! `embedded-hal` and the traits in [`hid`], so the same code runs on the
//! board and in host tests.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod backlight;
pub mod cadence;
pub mod controller;
pub mod dispatch;
pub mod flush;
pub mod hid;
pub mod keymap;
pub mod matrix;
pub mod scan;
pub mod settings;
pub mod tick;

#[cfg(test)]
mod testing;

pub use backlight::{Brightness, PwmBacklight};
pub use cadence::{Cadence, Heartbeat};
pub use controller::{Controller, CycleError, CycleOutcome, CycleReport, MatrixState};
pub use flush::FlushOutcome;
pub use hid::{ConsumerCode, ConsumerControl, HidSink, Keyboard, MouseButton, Pointer, SinkError};
pub use matrix::Matrix;
pub use settings::Settings;

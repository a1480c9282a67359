use fugit::MicrosDurationU32;

use crate::tick::Tick;

/// Tunables of the scan/dispatch core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    /// Ticks that must pass since the last scan before scanning again.
    /// Zero scans every cycle; the cycle period is the only debounce.
    pub debounce_window: Tick,
    /// Target length of one scan cycle.
    pub cycle_period: MicrosDurationU32,
    /// Pointer travel per FN arrow press.
    pub pointer_step: i8,
    /// Wheel travel per FN scroll press.
    pub wheel_step: i8,
    pub brightness_step: u8,
    pub brightness_min: u8,
    pub brightness_max: u8,
    /// Backlight level at power-up.
    pub brightness_initial: u8,
    /// Pause between releasing everything and reacquiring the HID endpoints.
    pub recovery_pause_ms: u32,
    /// Cycles between status LED toggles.
    pub heartbeat_period: u16,
}

impl Settings {
    pub const DEFAULT: Settings = Settings {
        debounce_window: 0,
        cycle_period: MicrosDurationU32::millis(25),
        pointer_step: 15,
        wheel_step: 3,
        brightness_step: 5,
        brightness_min: 0,
        brightness_max: 100,
        brightness_initial: 10,
        recovery_pause_ms: 1000,
        heartbeat_period: 20,
    };
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

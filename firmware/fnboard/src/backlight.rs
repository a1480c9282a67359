//! Display backlight level and the PWM that drives it.

use embedded_hal::PwmPin;

/// Backlight level in percent, clamped to `min..=max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness {
    level: u8,
    min: u8,
    max: u8,
}

impl Brightness {
    pub fn new(level: u8, min: u8, max: u8) -> Self {
        Self {
            level: level.clamp(min, max),
            min,
            max,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn raise(&mut self, step: u8) -> u8 {
        self.level = self.level.saturating_add(step).min(self.max);
        self.level
    }

    pub fn lower(&mut self, step: u8) -> u8 {
        self.level = self.level.saturating_sub(step).max(self.min);
        self.level
    }
}

/// Backlight on a PWM channel. The panel is driven inverted: full
/// brightness is the minimum duty.
pub struct PwmBacklight<P> {
    pwm: P,
}

impl<P: PwmPin<Duty = u16>> PwmBacklight<P> {
    pub fn new(mut pwm: P) -> Self {
        pwm.enable();
        Self { pwm }
    }

    pub fn set_percent(&mut self, percent: u8) {
        let duty = duty_for(percent, self.pwm.get_max_duty());
        self.pwm.set_duty(duty);
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}

/// Duty for `percent` on an inverted scale.
pub fn duty_for(percent: u8, max_duty: u16) -> u16 {
    let percent = u32::from(percent.min(100));
    ((100 - percent) * u32::from(max_duty) / 100) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Pwm;

    #[test]
    fn duty_is_inverted() {
        assert_eq!(duty_for(100, 65535), 0);
        assert_eq!(duty_for(0, 65535), 65535);
        assert_eq!(duty_for(10, 65535), 58981);
        assert_eq!(duty_for(150, 1000), 0);
    }

    #[test]
    fn brightness_clamps_at_both_ends() {
        let mut b = Brightness::new(10, 0, 100);
        for _ in 0..5 {
            b.lower(5);
        }
        assert_eq!(b.level(), 0);

        let mut b = Brightness::new(90, 0, 100);
        assert_eq!(b.raise(5), 95);
        assert_eq!(b.raise(5), 100);
        assert_eq!(b.raise(5), 100);
    }

    #[test]
    fn backlight_writes_the_duty() {
        let mut light = PwmBacklight::new(Pwm::new(1000));
        assert!(light.pwm().enabled);
        light.set_percent(25);
        assert_eq!(light.pwm().duty, 750);
    }
}

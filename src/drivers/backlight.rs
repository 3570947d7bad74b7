//! LCD backlight on an 8-bit PWM channel

use embedded_hal::PwmPin;

/// Scale a 10-bit ADC sample to an 8-bit duty value
#[inline]
pub const fn level_from_sample(sample: u16) -> u8 {
    let sample = if sample > 0x03FF { 0x03FF } else { sample };
    (sample / 4) as u8
}

pub struct Backlight<P> {
    pwm: P,
}

impl<P: PwmPin<Duty = u8>> Backlight<P> {
    /// Start the channel with a zero duty
    pub fn new(mut pwm: P) -> Self {
        pwm.set_duty(0);
        pwm.enable();
        Self { pwm }
    }

    #[inline]
    pub fn set_level(&mut self, level: u8) {
        self.pwm.set_duty(level);
    }

    #[inline]
    pub fn off(&mut self) {
        self.pwm.set_duty(0);
    }

    #[inline]
    pub fn level(&self) -> u8 {
        self.pwm.get_duty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakePwm {
        duty: u8,
        enabled: bool,
    }

    impl PwmPin for FakePwm {
        type Duty = u8;

        fn disable(&mut self) {
            self.enabled = false;
        }

        fn enable(&mut self) {
            self.enabled = true;
        }

        fn get_duty(&self) -> u8 {
            self.duty
        }

        fn get_max_duty(&self) -> u8 {
            u8::MAX
        }

        fn set_duty(&mut self, duty: u8) {
            self.duty = duty;
        }
    }

    #[test]
    fn level_is_quarter_of_sample() {
        for sample in 0..=1023u16 {
            assert_eq!(level_from_sample(sample) as u16, sample / 4);
        }
        assert_eq!(level_from_sample(1023), 255);
        assert_eq!(level_from_sample(0xFFFF), 255);
    }

    #[test]
    fn starts_enabled_and_can_be_forced_off() {
        let mut backlight = Backlight::new(FakePwm { duty: 0x80, enabled: false });
        assert!(backlight.pwm.enabled);
        assert_eq!(backlight.level(), 0);
        backlight.set_level(128);
        assert_eq!(backlight.level(), 128);
        backlight.off();
        assert_eq!(backlight.level(), 0);
    }
}

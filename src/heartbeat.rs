//! Status LED blink, driven by loop ticks rather than sample arrival.

use embedded_hal::digital::v2::OutputPin;

use crate::log_warn;

/// Something that can show the heartbeat level.
pub trait Indicator {
    fn set_level(&mut self, on: bool);
}

impl<P: OutputPin> Indicator for P {
    fn set_level(&mut self, on: bool) {
        let res = if on { self.set_high() } else { self.set_low() };
        if res.is_err() {
            log_warn!("Heartbeat indicator write failed");
        }
    }
}

pub struct Heartbeat {
    ticks: u32,
    toggle_every: u32,
    level: bool,
}

impl Heartbeat {
    /// `toggle_every` loop ticks per level change; 0 is treated as 1.
    pub const fn new(toggle_every: u32) -> Self {
        Self {
            ticks: 0,
            toggle_every: if toggle_every == 0 { 1 } else { toggle_every },
            level: false,
        }
    }

    pub fn level(&self) -> bool {
        self.level
    }

    /// Advances one tick. Returns the new level when it flips.
    pub fn tick(&mut self) -> Option<bool> {
        self.ticks += 1;
        if self.ticks < self.toggle_every {
            return None;
        }
        self.ticks = 0;
        self.level = !self.level;
        Some(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPin;

    #[test]
    fn toggles_every_n_ticks() {
        let mut hb = Heartbeat::new(10);
        let flips: std::vec::Vec<usize> = (1..=30)
            .filter_map(|t| hb.tick().map(|_| t))
            .collect();
        assert_eq!(flips, [10, 20, 30]);
        assert!(hb.level());
    }

    #[test]
    fn alternates_level() {
        let mut hb = Heartbeat::new(1);
        assert_eq!(hb.tick(), Some(true));
        assert_eq!(hb.tick(), Some(false));
        assert_eq!(hb.tick(), Some(true));
    }

    #[test]
    fn zero_period_does_not_stall() {
        let mut hb = Heartbeat::new(0);
        assert_eq!(hb.tick(), Some(true));
    }

    #[test]
    fn output_pin_follows_level() {
        let mut pin = MockPin::default();
        pin.set_level(true);
        pin.set_level(false);
        assert_eq!(pin.history(), &[true, false]);
    }
}

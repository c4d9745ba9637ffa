//! This module contains the countdown that bounds the time a player gets per round.

/// The number of seconds a round lasts unless configured otherwise.
pub(crate) const DEFAULT_ROUND_SECONDS: u32 = 60;

/// This enum holds the outcome of a single tick of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    /// The countdown reached zero on this tick; the round must be submitted.
    Expired,
    /// The countdown keeps going with the given number of seconds left.
    Running(u32),
}

/// This struct is a one-second resolution countdown. It is driven from the outside by calling
/// `tick()` once per elapsed second, so that it can be tested without a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Countdown {
    /// This field contains the duration the countdown restarts from.
    duration: u32,
    /// This field contains the seconds left until expiry.
    remaining: u32,
}

impl Countdown {
    /// This function creates a countdown that starts full.
    pub(crate) const fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }

    /// This function returns the seconds left in the current round.
    pub(crate) const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// This function returns the full duration of a round.
    pub(crate) const fn duration(&self) -> u32 {
        self.duration
    }

    /// This function refills the countdown for a new round.
    pub(crate) fn reset(&mut self) {
        self.remaining = self.duration;
    }

    /// This function advances the countdown by one second. Expiry is reported exactly once; further
    /// ticks on an expired countdown keep it at zero and report it as running.
    pub(crate) fn tick(&mut self) -> Tick {
        match self.remaining {
            0 => Tick::Running(0),
            1 => {
                self.remaining = 0;
                Tick::Expired
            }
            left => {
                self.remaining = left - 1;
                Tick::Running(self.remaining)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_expiry() {
        let mut countdown = Countdown::new(3);

        assert_eq!(countdown.tick(), Tick::Running(2));
        assert_eq!(countdown.tick(), Tick::Running(1));
        assert_eq!(countdown.tick(), Tick::Expired);
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn expiry_fires_once() {
        let mut countdown = Countdown::new(1);

        assert_eq!(countdown.tick(), Tick::Expired);
        assert_eq!(countdown.tick(), Tick::Running(0));
    }

    #[test]
    fn reset_refills() {
        let mut countdown = Countdown::new(5);
        let _ = countdown.tick();
        let _ = countdown.tick();

        countdown.reset();

        assert_eq!(countdown.remaining(), countdown.duration());
    }
}

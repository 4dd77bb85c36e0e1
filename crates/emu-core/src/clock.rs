//! CPU clock configuration.

use std::time::Duration;

use crate::Ticks;

/// Clock configuration for a system.
///
/// Machines with a single clock domain (the 8080 cabinet runs everything
/// off the CPU clock) express all timing as cycles of this frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Frequency in Hz (e.g. `2_000_000` for the Space Invaders 8080).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per frame at the given frame rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / frames_per_second)
    }

    /// Ticks that elapse in `duration` of real time (rounded down).
    #[must_use]
    pub fn ticks_in(&self, duration: Duration) -> Ticks {
        let ticks = duration.as_nanos() * u128::from(self.frequency_hz) / 1_000_000_000;
        Ticks::new(u64::try_from(ticks).unwrap_or(u64::MAX))
    }

    /// Real time taken by `ticks` cycles.
    #[must_use]
    pub fn duration_of(&self, ticks: Ticks) -> Duration {
        if self.frequency_hz == 0 {
            return Duration::ZERO;
        }
        let nanos = u128::from(ticks.get()) * 1_000_000_000 / u128::from(self.frequency_hz);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_megahertz_at_sixty_hertz() {
        let clock = MasterClock::new(2_000_000);
        assert_eq!(clock.ticks_per_frame(60), Ticks::new(33_333));
    }

    #[test]
    fn converts_between_time_and_ticks() {
        let clock = MasterClock::new(2_000_000);
        assert_eq!(clock.ticks_in(Duration::from_millis(1)), Ticks::new(2_000));
        assert_eq!(clock.duration_of(Ticks::new(2_000)), Duration::from_millis(1));
    }
}

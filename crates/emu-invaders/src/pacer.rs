//! Wall-clock pacing for the run loop.
//!
//! The emulated CPU runs far faster than 2 MHz, so the host runs it in
//! slices: ask the pacer how many cycles are due, run them, then wait for
//! the next slice. The pacer is the only place the run loop blocks.

use std::time::{Duration, Instant};

use emu_core::{MasterClock, Ticks};

/// Frames of emulated time a stalled host may catch up in one slice.
const DEFAULT_MAX_CATCH_UP_FRAMES: u64 = 4;

/// Converts elapsed real time into a cycle budget.
#[derive(Debug, Clone)]
pub struct Pacer {
    clock: MasterClock,
    /// Real time per frame; the slice length `wait()` sleeps towards.
    slice: Duration,
    max_catch_up: Ticks,
    /// Real time up to which cycles have been handed out.
    last: Instant,
}

impl Pacer {
    #[must_use]
    pub fn new(clock_hz: u64, frames_per_second: u64) -> Self {
        Self::starting_at(clock_hz, frames_per_second, Instant::now())
    }

    /// A pacer whose first slice starts at `start`.
    #[must_use]
    pub fn starting_at(clock_hz: u64, frames_per_second: u64, start: Instant) -> Self {
        let clock = MasterClock::new(clock_hz);
        let frame = clock.ticks_per_frame(frames_per_second.max(1));
        Self {
            clock,
            slice: clock.duration_of(frame),
            max_catch_up: Ticks::new(frame.get() * DEFAULT_MAX_CATCH_UP_FRAMES),
            last: start,
        }
    }

    /// Limit the budget to `frames` frames, however long the host stalled.
    ///
    /// At least one frame is always granted.
    #[must_use]
    pub fn with_max_catch_up(mut self, frames: u64) -> Self {
        let frame = self.clock.ticks_in(self.slice);
        self.max_catch_up = Ticks::new(frame.get() * frames.max(1));
        self
    }

    /// Cycles due between the previous call and `now`.
    ///
    /// Time beyond the catch-up limit is dropped rather than owed.
    pub fn budget(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last);
        let due = self.clock.ticks_in(elapsed);

        let granted = if due > self.max_catch_up {
            log::debug!(
                "host fell {} cycles behind, skipping ahead",
                (due - self.max_catch_up).get()
            );
            self.last = now;
            self.max_catch_up
        } else {
            // Sub-cycle remainders stay owed to the next slice.
            self.last += self.clock.duration_of(due);
            due
        };

        u32::try_from(granted.get()).unwrap_or(u32::MAX)
    }

    /// Sleep until one slice after the last budget.
    pub fn wait(&self) {
        let due = self.last + self.slice;
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
    }

    /// Real time per slice.
    #[must_use]
    pub fn slice(&self) -> Duration {
        self.slice
    }
}

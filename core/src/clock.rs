use serde::{Deserialize, Serialize};

/// Elapsed-seconds counter driven by an external one-second ticker.
///
/// `start` and `stop` report only real transitions, so whoever owns the periodic callback
/// can create or drop it exactly once per change and never holds two at a time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    running: bool,
    elapsed: u32,
}

impl Clock {
    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn elapsed_secs(&self) -> u32 {
        self.elapsed
    }

    /// Returns `true` when the clock was stopped before.
    pub fn start(&mut self) -> bool {
        !core::mem::replace(&mut self.running, true)
    }

    /// Returns `true` when the clock was running before.
    pub fn stop(&mut self) -> bool {
        core::mem::replace(&mut self.running, false)
    }

    /// Advances one second while running; a tick delivered after `stop` is dropped.
    pub fn tick(&mut self) -> Option<u32> {
        if self.running {
            self.elapsed = self.elapsed.saturating_add(1);
            Some(self.elapsed)
        } else {
            None
        }
    }

    /// Stops and zeroes the clock.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut clock = Clock::default();

        assert!(clock.start());
        assert!(!clock.start());
        assert!(clock.stop());
        assert!(!clock.stop());
    }

    #[test]
    fn ticks_only_count_while_running() {
        let mut clock = Clock::default();
        assert_eq!(clock.tick(), None);

        clock.start();
        assert_eq!(clock.tick(), Some(1));
        assert_eq!(clock.tick(), Some(2));

        clock.stop();
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.elapsed_secs(), 2);

        clock.reset();
        assert_eq!(clock.elapsed_secs(), 0);
        assert!(!clock.is_running());
    }
}

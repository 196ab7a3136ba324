//! Per-frame glue between a clock, the input queue, and a session.
use log::warn;

use crate::clock::{Clock, Millis};
use crate::input::{InputEvent, InputQueue, InputQueueError};
use crate::rng::RandomSource;
use crate::session::Session;

/// Owns the time source and pending inputs for one host loop.
#[derive(Debug, Clone, Default)]
pub struct FrameDriver<C: Clock> {
    clock: C,
    queue: InputQueue,
    frames: u64,
}

impl<C: Clock> FrameDriver<C> {
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            queue: InputQueue::new(),
            frames: 0,
        }
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    /// Frames stepped so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Queue an input for the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`InputQueueError::Full`] when the frame's queue is saturated.
    pub fn push(&mut self, event: InputEvent) -> Result<(), InputQueueError> {
        self.queue.push(event).inspect_err(|err| warn!("{err}"))
    }

    #[must_use]
    pub const fn pending(&self) -> &InputQueue {
        &self.queue
    }

    /// Read the clock once, apply queued inputs in order, then tick.
    /// Returns whether the session is still running.
    pub fn step<R: RandomSource>(&mut self, session: &mut Session<R>) -> bool {
        let now = self.clock.now_ms();
        for event in self.queue.drain() {
            session.handle_input(event, now);
        }
        session.tick(now);
        self.frames += 1;
        session.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boss::BossRoster;
    use crate::clock::ManualClock;
    use crate::fighter::FighterState;
    use crate::rng::ScriptedSource;

    fn session() -> Session<ScriptedSource> {
        Session::new(BossRoster::builtin(), ScriptedSource::constant(99), 0)
    }

    #[test]
    fn inputs_apply_before_tick_at_one_timestamp() {
        let mut session = session();
        let mut driver = FrameDriver::new(ManualClock::starting_at(1_000));
        driver.push(InputEvent::DodgeRight).unwrap();
        driver.push(InputEvent::Punch).unwrap();
        assert!(driver.step(&mut session));
        assert_eq!(session.player().state(), FighterState::Dodging);
        assert_eq!(session.player().state_deadline(), 1_220);
        assert!(driver.pending().is_empty());
        assert_eq!(driver.frames(), 1);

        driver.clock().advance(220);
        driver.step(&mut session);
        assert!(session.player().is_idle());
    }

    #[test]
    fn cancel_stops_the_loop() {
        let mut session = session();
        let mut driver = FrameDriver::new(ManualClock::starting_at(10));
        driver.push(InputEvent::Cancel).unwrap();
        assert!(!driver.step(&mut session));
    }

    #[test]
    fn overflow_is_reported() {
        let mut driver = FrameDriver::new(ManualClock::default());
        for _ in 0..crate::constants::INPUT_QUEUE_CAPACITY {
            driver.push(InputEvent::Punch).unwrap();
        }
        assert!(driver.push(InputEvent::Punch).is_err());
    }
}

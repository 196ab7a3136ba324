//! Discrete device inputs and the bounded queue that carries them into a tick.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::constants::INPUT_QUEUE_CAPACITY;
use crate::fighter::DodgeDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Punch,
    DodgeLeft,
    DodgeRight,
    /// Restart after a knockout; otherwise a punch.
    Confirm,
    /// Leave the session.
    Cancel,
}

impl InputEvent {
    #[must_use]
    pub const fn dodge_direction(self) -> Option<DodgeDirection> {
        match self {
            Self::DodgeLeft => Some(DodgeDirection::Left),
            Self::DodgeRight => Some(DodgeDirection::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputQueueError {
    #[error("input queue is full ({capacity} events); dropped {event:?}")]
    Full {
        capacity: usize,
        event: InputEvent,
    },
}

pub type InputBuffer = SmallVec<[InputEvent; INPUT_QUEUE_CAPACITY]>;

/// Bounded FIFO drained once per tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputQueue {
    events: InputBuffer,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`InputQueueError::Full`] when the queue already holds
    /// [`INPUT_QUEUE_CAPACITY`] events; the event is dropped.
    pub fn push(&mut self, event: InputEvent) -> Result<(), InputQueueError> {
        if self.events.len() >= INPUT_QUEUE_CAPACITY {
            return Err(InputQueueError::Full {
                capacity: INPUT_QUEUE_CAPACITY,
                event,
            });
        }
        self.events.push(event);
        Ok(())
    }

    /// Remove every queued event in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_arrival_order() {
        let mut queue = InputQueue::new();
        queue.push(InputEvent::DodgeLeft).unwrap();
        queue.push(InputEvent::Punch).unwrap();
        queue.push(InputEvent::Confirm).unwrap();
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![InputEvent::DodgeLeft, InputEvent::Punch, InputEvent::Confirm]
        );
        assert!(queue.is_empty());
        assert_eq!(queue.drain().count(), 0);
    }

    #[test]
    fn rejects_when_full() {
        let mut queue = InputQueue::new();
        for _ in 0..INPUT_QUEUE_CAPACITY {
            queue.push(InputEvent::Punch).unwrap();
        }
        let err = queue.push(InputEvent::Cancel).unwrap_err();
        assert_eq!(
            err,
            InputQueueError::Full {
                capacity: INPUT_QUEUE_CAPACITY,
                event: InputEvent::Cancel
            }
        );
        assert_eq!(queue.len(), INPUT_QUEUE_CAPACITY);
    }

    #[test]
    fn dodge_direction_mapping() {
        assert_eq!(
            InputEvent::DodgeLeft.dodge_direction(),
            Some(DodgeDirection::Left)
        );
        assert_eq!(
            InputEvent::DodgeRight.dodge_direction(),
            Some(DodgeDirection::Right)
        );
        assert_eq!(InputEvent::Punch.dodge_direction(), None);
    }
}

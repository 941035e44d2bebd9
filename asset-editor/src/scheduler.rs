//! Host contract, render batching and flash timers.
//!
//! The core never sleeps or spawns. It asks the host for a frame or a timer
//! and the host calls back into the controller (`on_frame`, `on_timer`).

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use shared_types::ValidatorResult;

use crate::row::AttributeRow;

/// Handle of a timer started through [`PanelHost::start_timer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Everything the panel needs from the environment it is embedded in.
pub trait PanelHost {
    /// Call `on_frame` once, on the next tick (animation frame or batching delay)
    fn request_frame(&self);

    /// Call `on_timer(id)` once after `delay`
    fn start_timer(&self, id: TimerId, delay: Duration);

    /// Best effort; a timer that fires anyway is ignored by the controller
    fn cancel_timer(&self, id: TimerId);

    /// Fresh visible rows, in display order. Unchanged rows are the same `Rc`.
    fn repaint(&self, rows: &[Rc<AttributeRow>]);

    /// Fired after every state changing mutation
    fn modified(&self, results: &[ValidatorResult]);

    /// Loading or subscribing failed; show an error banner
    fn load_failed(&self, message: &str) {
        let _ = message;
    }
}

/// Pending-flag scheduler: the first mutation in a tick arms it, later ones are
/// absorbed until the frame runs.
#[derive(Debug, Default)]
pub struct RenderBatch {
    pending: bool,
}

impl RenderBatch {
    /// Returns true if this call armed the batch and a frame must be requested
    pub fn arm(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    /// Returns true if a frame was pending
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// One flash-clear timer per attribute.
///
/// Ids are never reused, so a timer that fires after being replaced or after a
/// reset resolves to nothing.
#[derive(Debug, Default)]
pub struct FlashTimers {
    next_id: u64,
    by_attribute: HashMap<String, TimerId>,
    by_timer: HashMap<TimerId, String>,
}

impl FlashTimers {
    /// Start a new timer for `name`. Returns the new id and the id of the timer it
    /// replaced, which the host should cancel.
    pub fn start(&mut self, name: &str) -> (TimerId, Option<TimerId>) {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let replaced = self.by_attribute.insert(name.to_string(), id);
        if let Some(old) = replaced {
            self.by_timer.remove(&old);
        }
        self.by_timer.insert(id, name.to_string());
        (id, replaced)
    }

    /// Timer fired; returns the attribute it belongs to if still current
    pub fn complete(&mut self, id: TimerId) -> Option<String> {
        let name = self.by_timer.remove(&id)?;
        self.by_attribute.remove(&name);
        Some(name)
    }

    pub fn cancel(&mut self, name: &str) -> Option<TimerId> {
        let id = self.by_attribute.remove(name)?;
        self.by_timer.remove(&id);
        Some(id)
    }

    /// Forget all timers, returning their ids for cancellation
    pub fn drain(&mut self) -> Vec<TimerId> {
        self.by_attribute.clear();
        let mut ids: Vec<TimerId> = self.by_timer.drain().map(|(id, _)| id).collect();
        ids.sort();
        ids
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.by_attribute.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_timer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_timer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_arms_once_per_tick() {
        let mut batch = RenderBatch::default();
        assert!(batch.arm());
        assert!(!batch.arm());
        assert!(!batch.arm());
        assert!(batch.take());
        assert!(!batch.take());
        assert!(batch.arm());
    }

    #[test]
    fn restarting_a_flash_replaces_the_old_timer() {
        let mut timers = FlashTimers::default();
        let (first, replaced) = timers.start("power");
        assert_eq!(replaced, None);
        let (second, replaced) = timers.start("power");
        assert_eq!(replaced, Some(first));
        assert_ne!(first, second);

        assert_eq!(timers.complete(first), None);
        assert_eq!(timers.complete(second).as_deref(), Some("power"));
        assert!(timers.is_empty());
    }

    #[test]
    fn drained_timers_complete_to_nothing() {
        let mut timers = FlashTimers::default();
        let (a, _) = timers.start("a");
        let (b, _) = timers.start("b");
        assert_eq!(timers.drain(), vec![a, b]);
        assert_eq!(timers.complete(a), None);

        let (c, _) = timers.start("a");
        assert!(c > b);
    }

    #[test]
    fn cancel_by_attribute() {
        let mut timers = FlashTimers::default();
        let (id, _) = timers.start("power");
        assert_eq!(timers.cancel("power"), Some(id));
        assert!(!timers.is_running("power"));
        assert_eq!(timers.cancel("power"), None);
    }
}

/// Per-slot request sequencing
///
/// Two status changes fired in quick succession can resolve out of order.
/// Each logical piece of view state (a "slot", e.g. `task:12`) gets a
/// monotonic counter; a request takes a [`Ticket`] before it starts and its
/// result is only applied if the ticket is still the slot's latest when the
/// response arrives.
///
/// Bulk loads (a whole board, the project list) cannot take tickets up
/// front because they don't know which entities will come back. They take a
/// [`Mark`] instead and skip any slot that had a ticket issued or a result
/// applied after the mark.
///
/// # Example
///
/// ```
/// use taskboard_shared::sequence::RequestSequencer;
///
/// let seq = RequestSequencer::new();
/// let first = seq.issue("task:12");
/// let second = seq.issue("task:12");
///
/// assert!(!seq.is_current(&first));
/// assert!(seq.is_current(&second));
///
/// let mark = seq.mark();
/// assert!(!seq.touched_since("task:12", &mark));
/// seq.issue("task:12");
/// assert!(seq.touched_since("task:12", &mark));
/// ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle for one issued request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    slot: String,
    seq: u64,
}

impl Ticket {
    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Point in time taken by a bulk load before its request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(u64);

#[derive(Debug, Default)]
struct SlotState {
    seq: u64,
    /// Clock value of the last ticket or applied result
    touched: u64,
}

#[derive(Debug, Default)]
struct Inner {
    clock: u64,
    slots: HashMap<String, SlotState>,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Monotonic sequence numbers per slot
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    inner: Arc<Mutex<Inner>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues the next ticket for `slot`, superseding all earlier ones
    pub fn issue(&self, slot: impl Into<String>) -> Ticket {
        let slot = slot.into();
        let mut inner = self.lock();
        let now = inner.tick();
        let state = inner.slots.entry(slot.clone()).or_default();
        state.seq += 1;
        state.touched = now;
        Ticket { slot, seq: state.seq }
    }

    /// Whether `ticket` is still the newest request for its slot
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.lock()
            .slots
            .get(&ticket.slot)
            .map_or(false, |state| state.seq == ticket.seq)
    }

    /// Records that a result for `slot` was applied to the view state
    pub fn record_applied(&self, slot: &str) {
        let mut inner = self.lock();
        let now = inner.tick();
        inner.slots.entry(slot.to_string()).or_default().touched = now;
    }

    /// Marks the start of a bulk load
    pub fn mark(&self) -> Mark {
        Mark(self.lock().clock)
    }

    /// Whether `slot` saw a ticket or an applied result after `mark`
    pub fn touched_since(&self, slot: &str, mark: &Mark) -> bool {
        self.lock()
            .slots
            .get(slot)
            .map_or(false, |state| state.touched > mark.0)
    }
}

/// Slot name for a task's view state
pub fn task_slot(id: i64) -> String {
    format!("task:{}", id)
}

/// Slot name for a project's view state
pub fn project_slot(id: i64) -> String {
    format!("project:{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_wins() {
        let seq = RequestSequencer::new();
        let a = seq.issue(task_slot(1));
        let b = seq.issue(task_slot(1));
        let c = seq.issue(task_slot(1));

        assert_eq!((a.seq(), b.seq(), c.seq()), (1, 2, 3));
        assert!(!seq.is_current(&a));
        assert!(!seq.is_current(&b));
        assert!(seq.is_current(&c));
    }

    #[test]
    fn test_slots_are_independent() {
        let seq = RequestSequencer::new();
        let task = seq.issue(task_slot(1));
        let project = seq.issue(project_slot(1));
        let other_task = seq.issue(task_slot(2));

        assert!(seq.is_current(&task));
        assert!(seq.is_current(&project));
        assert!(seq.is_current(&other_task));
        assert_eq!(task.slot(), "task:1");
        assert_eq!(project.slot(), "project:1");
    }

    #[test]
    fn test_clones_share_counters() {
        let seq = RequestSequencer::new();
        let clone = seq.clone();
        let first = seq.issue("x");
        let _second = clone.issue("x");
        assert!(!seq.is_current(&first));
    }

    #[test]
    fn test_mark_sees_later_tickets_and_results() {
        let seq = RequestSequencer::new();
        let before = seq.issue(task_slot(1));
        seq.record_applied(&task_slot(2));

        let mark = seq.mark();
        assert!(!seq.touched_since(&task_slot(1), &mark));
        assert!(!seq.touched_since(&task_slot(2), &mark));
        assert!(!seq.touched_since(&task_slot(3), &mark));

        // A ticket issued before the mark whose result lands after it
        seq.record_applied(before.slot());
        assert!(seq.touched_since(&task_slot(1), &mark));

        seq.issue(task_slot(3));
        assert!(seq.touched_since(&task_slot(3), &mark));
        assert!(!seq.touched_since(&task_slot(2), &mark));
    }
}

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

/// Record ids with an action in progress. Actions on different records do
/// not block each other.
#[derive(Debug, Default)]
pub struct InFlight {
    ids: Mutex<HashSet<Uuid>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when an action is already running for `id`.
    pub fn try_begin(&self, id: Uuid) -> Option<InFlightGuard<'_>> {
        let inserted = self
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        if !inserted {
            return None;
        }
        Some(InFlightGuard { owner: self, id })
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    id: Uuid,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_record_is_rejected_until_guard_drops() {
        let in_flight = InFlight::new();
        let id = Uuid::new_v4();

        let guard = in_flight.try_begin(id);
        assert!(guard.is_some());
        assert!(in_flight.try_begin(id).is_none());
        assert!(in_flight.contains(id));

        drop(guard);
        assert!(!in_flight.contains(id));
        assert!(in_flight.try_begin(id).is_some());
    }

    #[test]
    fn rejected_attempts_leave_the_holder_in_place() {
        let in_flight = InFlight::new();
        let id = Uuid::new_v4();

        let _held = in_flight.try_begin(id).unwrap();
        for _ in 0..3 {
            assert!(in_flight.try_begin(id).is_none());
            assert!(in_flight.contains(id));
        }
        assert_eq!(in_flight.len(), 1);
    }

    #[test]
    fn different_records_proceed_together() {
        let in_flight = InFlight::new();
        let first = in_flight.try_begin(Uuid::new_v4());
        let second = in_flight.try_begin(Uuid::new_v4());
        assert!(first.is_some() && second.is_some());
        assert_eq!(in_flight.len(), 2);
    }
}

// src/action_set.rs
//! In-flight operation tracking keyed by job and operation kind.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::types::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Saving,
    Deleting,
    Applying,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::Saving => "saving",
            ActionKind::Deleting => "deleting",
            ActionKind::Applying => "applying",
        })
    }
}

/// Shared handle; clones observe the same sets.
#[derive(Debug, Clone, Default)]
pub struct ActionSet {
    active: Arc<Mutex<HashMap<ActionKind, HashSet<JobId>>>>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the id was already marked for this kind.
    pub fn begin(&self, kind: ActionKind, id: &JobId) -> bool {
        let inserted = self
            .active
            .lock()
            .entry(kind)
            .or_default()
            .insert(id.clone());
        if inserted {
            debug!(%kind, job_id = %id, "action started");
        }
        inserted
    }

    /// Idempotent.
    pub fn end(&self, kind: ActionKind, id: &JobId) {
        let mut active = self.active.lock();
        if let Some(ids) = active.get_mut(&kind) {
            if ids.remove(id) {
                debug!(%kind, job_id = %id, "action finished");
            }
            if ids.is_empty() {
                active.remove(&kind);
            }
        }
    }

    pub fn is_active(&self, kind: ActionKind, id: &JobId) -> bool {
        self.active
            .lock()
            .get(&kind)
            .is_some_and(|ids| ids.contains(id))
    }

    pub fn active(&self, kind: ActionKind) -> Vec<JobId> {
        self.active
            .lock()
            .get(&kind)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_idle(&self) -> bool {
        self.active.lock().is_empty()
    }

    /// Mark `id` and hand back a guard that unmarks it when dropped.
    /// `None` when the id is already in flight for this kind.
    pub fn acquire(&self, kind: ActionKind, id: &JobId) -> Option<ActionGuard> {
        if !self.begin(kind, id) {
            return None;
        }
        Some(ActionGuard {
            set: self.clone(),
            kind,
            id: id.clone(),
        })
    }
}

/// Releases its entry on every exit path, including a dropped future.
#[derive(Debug)]
pub struct ActionGuard {
    set: ActionSet,
    kind: ActionKind,
    id: JobId,
}

impl ActionGuard {
    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        self.set.end(self.kind, &self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_end_membership() {
        let set = ActionSet::new();
        let id = JobId::Number(1);

        assert!(set.begin(ActionKind::Saving, &id));
        assert!(set.is_active(ActionKind::Saving, &id));
        assert!(!set.begin(ActionKind::Saving, &id));

        set.end(ActionKind::Saving, &id);
        assert!(!set.is_active(ActionKind::Saving, &id));
        set.end(ActionKind::Saving, &id);
        assert!(set.is_idle());
    }

    #[test]
    fn test_kinds_are_independent() {
        let set = ActionSet::new();
        let id = JobId::Number(7);

        assert!(set.begin(ActionKind::Deleting, &id));
        assert!(!set.is_active(ActionKind::Saving, &id));
        assert!(set.begin(ActionKind::Saving, &id));
        assert_eq!(set.active(ActionKind::Deleting), vec![id.clone()]);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let set = ActionSet::new();
        let id = JobId::from("linkedin_3");

        let guard = set.acquire(ActionKind::Applying, &id).unwrap();
        assert!(set.acquire(ActionKind::Applying, &id).is_none());
        assert_eq!(guard.kind(), ActionKind::Applying);

        drop(guard);
        assert!(!set.is_active(ActionKind::Applying, &id));
        assert!(set.acquire(ActionKind::Applying, &id).is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let set = ActionSet::new();
        let other = set.clone();
        let id = JobId::Number(2);

        set.begin(ActionKind::Saving, &id);
        assert!(other.is_active(ActionKind::Saving, &id));
    }
}

// src/state.rs - Shared camera state guarded by a single lock
use std::sync::{Arc, Mutex, MutexGuard};
use serde::Serialize;
use tokio::sync::Notify;

use crate::grid::{Position, VisitedMap};

/// What the motion worker is doing with `current` right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationState {
    Idle,
    Moving,
    Capturing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    pub current: Position,
    pub target: Position,
    pub final_destination: Position,
    pub visited: VisitedMap,
    pub state: OperationState,
    /// Single steps made in the current uninterrupted journey.
    pub blocks_traveled: u32,
    /// Bumped on every reset so in-flight worker steps can tell they are stale.
    pub epoch: u64,
}

impl CameraState {
    pub fn new() -> Self {
        Self {
            current: Position::ORIGIN,
            target: Position::ORIGIN,
            final_destination: Position::ORIGIN,
            visited: VisitedMap::new(),
            state: OperationState::Idle,
            blocks_traveled: 0,
            epoch: 0,
        }
    }

    /// Restore the initial values, keeping the epoch moving forward.
    pub fn reset(&mut self) {
        let epoch = self.epoch.wrapping_add(1);
        *self = Self::new();
        self.epoch = epoch;
    }

    /// Point both the routing target and the final destination at `cell`.
    pub fn retarget(&mut self, cell: Position) {
        self.target = cell;
        self.final_destination = cell;
    }

    pub fn at_rest(&self) -> bool {
        self.current == self.target
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle to the process-wide camera state.
///
/// Every read and write goes through one mutex. Closures passed to
/// [`StateStore::apply`] run with the lock held, so they must not block.
#[derive(Debug, Clone)]
pub struct StateStore {
    inner: Arc<Mutex<CameraState>>,
    target_changed: Arc<Notify>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_state(CameraState::new())
    }

    pub fn with_state(state: CameraState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
            target_changed: Arc::new(Notify::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CameraState> {
        // Fields are plain values, so a poisoned lock still holds a usable state.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> CameraState {
        self.lock().clone()
    }

    /// Run one read-modify-write step atomically.
    pub fn apply<R>(&self, mutator: impl FnOnce(&mut CameraState) -> R) -> R {
        let mut guard = self.lock();
        mutator(&mut guard)
    }

    /// Wake the worker if it is waiting for a new target.
    pub fn notify_target_changed(&self) {
        self.target_changed.notify_one();
    }

    pub async fn target_changed(&self) {
        self.target_changed.notified().await;
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellColor;

    #[test]
    fn test_initial_state() {
        let state = CameraState::new();
        assert_eq!(state.current, Position::ORIGIN);
        assert_eq!(state.target, Position::ORIGIN);
        assert_eq!(state.final_destination, Position::ORIGIN);
        assert_eq!(state.state, OperationState::Idle);
        assert_eq!(state.blocks_traveled, 0);
        assert_eq!(state.visited.get(Position::ORIGIN), Some(CellColor::Green));
        assert_eq!(state.visited.len(), 1);
    }

    #[test]
    fn test_reset_bumps_epoch_only() {
        let store = StateStore::new();
        store.apply(|s| {
            s.current = Position::new(4, 2);
            s.retarget(Position::new(9, 3));
            s.visited.mark_captured(Position::new(4, 2));
            s.state = OperationState::Moving;
            s.blocks_traveled = 7;
        });
        store.apply(CameraState::reset);
        let snap = store.snapshot();
        assert_eq!(snap.epoch, 1);
        assert_eq!(CameraState { epoch: 0, ..snap }, CameraState::new());
    }

    #[test]
    fn test_apply_returns_closure_result() {
        let store = StateStore::new();
        let moved = store.apply(|s| {
            s.retarget(Position::new(2, 0));
            s.current.delta_to(s.target)
        });
        assert_eq!((moved.x, moved.y), (2, 0));
        assert!(!store.snapshot().at_rest());
    }
}

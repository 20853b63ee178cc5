// src/camera.rs - Camera lifecycle and the command operations behind the HTTP API
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::MotionConfig;
use crate::grid::{Direction, Offset, Position};
use crate::motion::{MotionEvent, MotionWorker};
use crate::state::{CameraState, StateStore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid direction '{0}'")]
    InvalidDirection(String),
    #[error("candidate {candidate} is outside the grid, target stays at {target}")]
    OutOfBounds { candidate: Position, target: Position },
    #[error("missing or invalid coordinates")]
    MissingCoordinates,
}

/// Result of an accepted relative move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveAccepted {
    pub target: Position,
    /// Remaining displacement from the current cell to the new target.
    pub net_delta: Offset,
}

pub struct Camera {
    store: StateStore,
    motion: MotionConfig,
    events_tx: broadcast::Sender<MotionEvent>,
    shutdown_tx: broadcast::Sender<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Camera {
    pub fn new(motion: MotionConfig) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            store: StateStore::new(),
            motion,
            events_tx,
            shutdown_tx,
            worker: Mutex::new(None),
        }
    }

    /// Spawn the motion worker. Only one worker ever runs per camera.
    pub fn start(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::warn!("Motion worker already running");
            return;
        }
        let task = MotionWorker::new(self.store.clone(), self.motion.clone(), self.events_tx.clone());
        let shutdown_rx = self.shutdown_tx.subscribe();
        *worker = Some(tokio::spawn(task.run(shutdown_rx)));
    }

    /// Stop the worker and wait for it to exit.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("Motion worker ended abnormally: {}", e);
            }
        }
    }

    /// Shift the pending target one cell. Repeated calls compose because the
    /// step is taken from `target`, not from where the camera is now.
    pub fn move_direction(&self, direction: &str) -> Result<MoveAccepted, CommandError> {
        let dir: Direction = direction.parse().map_err(|_| {
            tracing::info!("Rejected move with invalid direction '{}'", direction);
            CommandError::InvalidDirection(direction.to_string())
        })?;
        let (dx, dy) = dir.delta();
        let result = self.store.apply(|s| {
            let candidate = s.target.offset(dx, dy);
            if !candidate.in_bounds() {
                return Err(CommandError::OutOfBounds { candidate, target: s.target });
            }
            s.retarget(candidate);
            Ok(MoveAccepted {
                target: candidate,
                net_delta: s.current.delta_to(candidate),
            })
        });
        match &result {
            Ok(accepted) => {
                tracing::info!("Updated target: {}", accepted.target);
                self.store.notify_target_changed();
            }
            Err(e) => tracing::info!("Move {} ignored: {}", direction, e),
        }
        result
    }

    /// Jump the target to an absolute cell.
    pub fn set_target(&self, x: Option<i64>, y: Option<i64>) -> Result<Position, CommandError> {
        let (Some(x), Some(y)) = (x, y) else {
            tracing::info!("Set target ignored: missing coordinates");
            return Err(CommandError::MissingCoordinates);
        };
        let candidate = Position::new(x, y);
        let result = self.store.apply(|s| {
            if !candidate.in_bounds() {
                return Err(CommandError::OutOfBounds { candidate, target: s.target });
            }
            s.retarget(candidate);
            Ok(candidate)
        });
        match &result {
            Ok(target) => {
                tracing::info!("Target set to {}", target);
                self.store.notify_target_changed();
            }
            Err(e) => tracing::info!("Set target ignored: {}", e),
        }
        result
    }

    pub fn reset(&self) {
        self.store.apply(CameraState::reset);
        self.store.notify_target_changed();
        tracing::info!("System reset");
    }

    pub fn status(&self) -> CameraState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MotionEvent> {
        self.events_tx.subscribe()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_moves_compose_on_target() {
        let camera = Camera::default();
        camera.move_direction("right").unwrap();
        let second = camera.move_direction("right").unwrap();
        assert_eq!(second.target, Position::new(2, 0));
        assert_eq!(second.net_delta, Offset { x: 2, y: 0 });
        let snap = camera.status();
        assert_eq!(snap.current, Position::ORIGIN);
        assert_eq!(snap.final_destination, Position::new(2, 0));
    }

    #[test]
    fn test_opposite_moves_cancel_out() {
        let camera = Camera::default();
        camera.move_direction("down").unwrap();
        let back = camera.move_direction("up").unwrap();
        assert_eq!(back.target, Position::ORIGIN);
        assert!(back.net_delta.is_zero());
    }

    #[test]
    fn test_move_past_edge_is_ignored() {
        let camera = Camera::default();
        let err = camera.move_direction("up").unwrap_err();
        assert_eq!(
            err,
            CommandError::OutOfBounds { candidate: Position::new(0, -1), target: Position::ORIGIN }
        );
        assert_eq!(camera.status().target, Position::ORIGIN);

        camera.set_target(Some(14), Some(4)).unwrap();
        assert!(camera.move_direction("right").is_err());
        assert!(camera.move_direction("down").is_err());
        assert_eq!(camera.status().target, Position::new(14, 4));
    }

    #[test]
    fn test_invalid_direction() {
        let camera = Camera::default();
        let err = camera.move_direction("sideways").unwrap_err();
        assert_eq!(err, CommandError::InvalidDirection("sideways".to_string()));
        assert_eq!(camera.status(), CameraState::new());
    }

    #[test]
    fn test_set_target_validation() {
        let camera = Camera::default();
        assert_eq!(camera.set_target(None, Some(1)), Err(CommandError::MissingCoordinates));
        assert!(matches!(
            camera.set_target(Some(15), Some(0)),
            Err(CommandError::OutOfBounds { .. })
        ));
        assert_eq!(camera.set_target(Some(10), Some(4)), Ok(Position::new(10, 4)));
        let snap = camera.status();
        assert_eq!(snap.target, Position::new(10, 4));
        assert_eq!(snap.final_destination, Position::new(10, 4));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let camera = Camera::default();
        camera.set_target(Some(6), Some(3)).unwrap();
        camera.store().apply(|s| {
            s.current = Position::new(6, 1);
            s.visited.mark_captured(Position::new(6, 1));
            s.blocks_traveled = 5;
        });
        camera.reset();
        camera.reset();
        let snap = camera.status();
        assert_eq!(CameraState { epoch: 0, ..snap }, CameraState::new());
    }
}

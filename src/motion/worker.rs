// src/motion/worker.rs - Single background task that walks the camera one cell at a time
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::config::MotionConfig;
use crate::grid::Position;
use crate::motion::profile::{compute_delay, step_duration};
use crate::state::{OperationState, StateStore};

/// Progress notifications published by the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionEvent {
    StepStarted {
        from: Position,
        to: Position,
        block: u32,
        delay_secs: f64,
    },
    Arrived { at: Position },
    /// A reset landed while the step was in flight; the step was dropped.
    StepDiscarded { at: Position },
    CaptureStarted { at: Position },
    CaptureCompleted { at: Position },
}

/// Next cell on the way from `current` to `target`. Vertical moves win.
pub fn next_step(current: Position, target: Position) -> Option<Position> {
    let delta = current.delta_to(target);
    if delta.y != 0 {
        Some(current.offset(0, delta.y.signum()))
    } else if delta.x != 0 {
        Some(current.offset(delta.x.signum(), 0))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct PlannedStep {
    from: Position,
    to: Position,
    block: u32,
    epoch: u64,
}

pub struct MotionWorker {
    store: StateStore,
    timing: MotionConfig,
    events_tx: broadcast::Sender<MotionEvent>,
}

impl MotionWorker {
    pub fn new(store: StateStore, timing: MotionConfig, events_tx: broadcast::Sender<MotionEvent>) -> Self {
        Self { store, timing, events_tx }
    }

    /// Loop until a shutdown signal arrives. Never exits on its own.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        tracing::info!("Motion worker started");
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Motion worker shutting down");
                    // An interrupted step or dwell never finishes.
                    self.store.apply(|s| s.state = OperationState::Idle);
                    break;
                }
                _ = self.tick() => {}
            }
        }
    }

    /// One pass of the loop: either wait for a target or make a single step.
    pub async fn tick(&self) {
        let planned = self.store.apply(|s| match next_step(s.current, s.target) {
            None => {
                s.blocks_traveled = 0;
                None
            }
            Some(to) => {
                s.state = OperationState::Moving;
                s.blocks_traveled = s.blocks_traveled.saturating_add(1);
                Some(PlannedStep {
                    from: s.current,
                    to,
                    block: s.blocks_traveled,
                    epoch: s.epoch,
                })
            }
        });

        match planned {
            Some(step) => self.make_step(step).await,
            None => {
                tokio::select! {
                    _ = self.store.target_changed() => {}
                    _ = sleep(self.timing.idle_poll()) => {}
                }
            }
        }
    }

    async fn make_step(&self, step: PlannedStep) {
        let delay_secs = compute_delay(self.timing.base_step_secs, step.block);
        tracing::info!(
            "Moving from {} to {} (block {}, {:.3}s)",
            step.from, step.to, step.block, delay_secs
        );
        self.publish(MotionEvent::StepStarted {
            from: step.from,
            to: step.to,
            block: step.block,
            delay_secs,
        });

        // Handlers may retarget freely while we are in transit.
        sleep(step_duration(self.timing.base_step_secs, step.block)).await;

        let arrived = self.store.apply(|s| {
            if s.epoch != step.epoch {
                return false;
            }
            s.current = step.to;
            s.visited.mark_passed(step.to);
            true
        });
        if !arrived {
            tracing::info!("Step to {} discarded after reset", step.to);
            self.publish(MotionEvent::StepDiscarded { at: step.to });
            return;
        }
        tracing::debug!("Move complete. Current region: {}", step.to);
        self.publish(MotionEvent::Arrived { at: step.to });

        // Give a command that raced the arrival a chance to land first.
        sleep(self.timing.settle_grace()).await;

        let capture = self.store.apply(|s| {
            if s.epoch != step.epoch {
                return false;
            }
            if s.current == s.final_destination {
                s.state = OperationState::Capturing;
                true
            } else {
                s.state = OperationState::Idle;
                false
            }
        });
        if capture {
            self.capture(step.to, step.epoch).await;
        }
    }

    /// Dwell on `cell` and mark it red. Target changes wait until this is done.
    async fn capture(&self, cell: Position, epoch: u64) {
        tracing::info!("Capturing cell {}", cell);
        self.publish(MotionEvent::CaptureStarted { at: cell });

        sleep(self.timing.capture_dwell()).await;

        let completed = self.store.apply(|s| {
            if s.epoch != epoch {
                return false;
            }
            s.visited.mark_captured(cell);
            s.state = OperationState::Idle;
            true
        });
        if completed {
            tracing::info!("Capture complete on cell {}", cell);
            self.publish(MotionEvent::CaptureCompleted { at: cell });
        } else {
            tracing::info!("Capture of {} abandoned after reset", cell);
        }
    }

    fn publish(&self, event: MotionEvent) {
        // No subscribers is the normal case outside of tests.
        let _ = self.events_tx.send(event);
    }
}

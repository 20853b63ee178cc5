// gridcam-rs: single camera walking a fixed grid, driven over HTTP

pub mod camera;
pub mod config;
pub mod grid;
pub mod motion;
pub mod state;
pub mod web;

pub use camera::{Camera, CommandError, MoveAccepted};
pub use config::{Config, ConfigError, MotionConfig};
pub use grid::{CellColor, Direction, Offset, Position, VisitedMap};
pub use motion::{MotionEvent, MotionWorker};
pub use state::{CameraState, OperationState, StateStore};

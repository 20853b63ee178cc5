// src/motion/mod.rs - Speed profile and the motion worker
pub mod profile;
pub mod worker;

pub use profile::compute_delay;
pub use worker::{next_step, MotionEvent, MotionWorker};

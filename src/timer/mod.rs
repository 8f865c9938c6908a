//! Timer module for the task timer.
//!
//! - `engine`: the Idle/Running/Paused state machine over the durable store

pub mod engine;

pub use engine::TimerEngine;

//! Background Tasks Module
//!
//! Shared access to a cache and the tasks that run against it.
//!
//! # Tasks
//! - Expiry sweep: removes expired entries at a configured interval

mod sweep;

pub use sweep::{share, spawn_sweep_task, SharedCache};

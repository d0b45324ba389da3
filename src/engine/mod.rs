// src/engine/mod.rs

//! Orchestration engine for gowatch.
//!
//! - [`debouncer`] coalesces bursts of change notifications into one
//!   delayed action.
//! - [`pipeline`] is that action: build, then (on success and with auto-run)
//!   restart the target program. It also publishes the current
//!   [`PipelineState`].

pub mod debouncer;
pub mod pipeline;

pub use crate::types::PipelineState;
pub use debouncer::Debouncer;
pub use pipeline::{CycleOutcome, Pipeline};

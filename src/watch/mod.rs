// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Discovering the directories to watch (`registry`).
//! - Deciding which changed paths matter (`patterns`, `filter`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) and feeding
//!   qualifying changes into the debounced build pipeline (`watcher`).

pub mod filter;
pub mod path_utils;
pub mod patterns;
pub mod registry;
pub mod watcher;

pub use filter::{ChangeKind, EventFilter, ExclusionRules};
pub use patterns::{IgnorePatterns, DEFAULT_IGNORE_PATTERNS};
pub use registry::{register_with, PathRegistry, RegistryOptions, WatchSet};
pub use watcher::{run_detection_loop, spawn_watcher, Dispatcher, Watcher, WatcherHandle};

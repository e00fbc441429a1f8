// src/watch/mod.rs

//! Change detection for the watched source tree.
//!
//! - [`scan`] implements the modification-time check (`has_changes`).
//! - [`patterns`] compiles `exclude` globs.
//! - [`detector`] puts a `ChangeDetector` trait in front of the scan and of
//!   the `notify`-based event watcher, so the loop can poll either.

pub mod detector;
pub mod patterns;
pub mod scan;

pub use detector::{build_detector, ChangeDetector, NotifyDetector, PollingDetector};
pub use patterns::ExcludeSet;
pub use scan::{has_changes, has_changes_now, latest_modification};

//! Service layer for card scanning.
//!
//! This module holds the pipeline logic separated from UI concerns, so the
//! CLI and the web server drive the same code.

pub mod batch;

pub use batch::{BatchEntry, BatchError, BatchOrchestrator, ImageFailure, NO_CONTACT_DATA};

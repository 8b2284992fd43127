//! # Gesture-Core
//!
//! Core types and utilities for turning body-landmark streams into
//! stress and emotion signals.
//!
//! - [`types`]: landmark frames, per-region keypoint layouts, identifiers
//! - [`geometry`]: joint angles, roll and lean measurements
//! - [`history`]: bounded sample windows and the shared jitter statistic

pub mod error;
pub mod geometry;
pub mod history;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use history::*;
pub use types::*;

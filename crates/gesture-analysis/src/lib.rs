//! # Gesture-Analysis
//!
//! Per-region body-landmark analysis and multimodal score fusion for
//! interview stress assessment.
//!
//! ## Regions
//!
//! Each region turns a noisy landmark stream into a 0-100 steadiness score:
//!
//! - **Hands**: fist closure, finger spread, fingertip tremor
//! - **Shoulders**: shrugs against an auto-calibrated resting baseline
//! - **Arms**: elbow angle tiers, wrist and elbow tremor
//! - **Upper body**: head roll/pitch, torso lean and sway
//!
//! All regions share one windowed-jitter scorer ([`scorer`]) and one jitter
//! statistic, so their scores are comparable.
//!
//! ## Fusion
//!
//! The [`fusion`] engine renormalizes the configured weights over the
//! regions that are valid this frame and maps the overall score onto six
//! emotion states, from `very_relaxed` down to `highly_anxious`.
//!
//! [`GesturePipeline`] ties it together, one frame at a time.

pub mod arm;
pub mod config;
#[cfg(test)]
mod fixtures;
pub mod fusion;
pub mod hand;
pub mod pipeline;
pub mod record;
pub mod replay;
pub mod scorer;
pub mod shoulder;
pub mod summary;
pub mod upper_body;

pub use arm::*;
pub use config::*;
pub use fusion::*;
pub use hand::*;
pub use pipeline::*;
pub use record::*;
pub use replay::*;
pub use scorer::*;
pub use shoulder::*;
pub use summary::*;
pub use upper_body::*;

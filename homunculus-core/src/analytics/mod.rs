//! Pattern mining over the observation log
//!
//! Each analysis run rebuilds three frequency models from the active store
//! (archives are never read):
//! - **Transitions**: adjacent `tool → tool` pairs
//! - **Commands**: leading token of shell commands
//! - **File extensions**: extension of edited files
//!
//! Each model is filtered by a minimum count, ranked by descending count
//! (ties in first-seen order), capped, and rendered as [`Suggestion`]s.
//!
//! [`Suggestion`]: crate::types::Suggestion

mod frequency;
mod patterns;

pub use frequency::FrequencyTable;
pub use patterns::{
    command_token, file_extension, PatternAnalyzer, PatternModels, Transition,
    DEFAULT_MIN_COUNT, MIN_OBSERVATIONS, NO_EXTENSION,
};

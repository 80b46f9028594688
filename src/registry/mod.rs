//! Session-wide registries
//!
//! - [`MuteRegistry`]: remote mute intent that survives lane churn
//! - [`RemoteParticipantRegistry`]: which remote participants publish what

pub mod mute;
pub mod participant;

pub use mute::MuteRegistry;
pub use participant::{RemoteParticipantRegistry, Unpublished};

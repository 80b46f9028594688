//! Publish and subscribe lanes
//!
//! A lane is one independently switchable media flow. Its activity is a pure
//! function of two inputs:
//!
//! ```text
//!   active = runnable && !muted
//! ```
//!
//! `runnable` is driven by the connection state machine, `muted` by user
//! intent. Whenever either input changes the owner calls `reevaluate()`, which
//! compares the desired flow with what was last requested from the engine and
//! issues at most one call to close the gap. Calling it again with unchanged
//! inputs does nothing.

pub mod publish;
pub mod subscribe;

pub use publish::PublishLane;
pub use subscribe::SubscribeLane;

use crate::media::MediaKind;

/// Point-in-time view of a lane, for observability and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneSnapshot {
    pub kind: MediaKind,
    /// The connection permits activity
    pub runnable: bool,
    /// User intent
    pub muted: bool,
    /// `runnable && !muted`
    pub active: bool,
    /// Media is currently requested from the engine
    pub flowing: bool,
}

//! rtc-lanes: real-time media session adapter
//!
//! Turns one connection to a media routing channel into independently
//! switchable lanes:
//!
//! - three local **publish lanes** (camera, microphone, screen share)
//! - one remote **subscribe lane** per (participant, media kind)
//!
//! Every lane is active iff the connection permits it (`runnable`) and the
//! user has not muted it. The connection state machine flips `runnable` on all
//! lanes; mute intent comes from the caller, and for remote media it is kept in
//! a registry that outlives participant churn. Lanes only ever issue the
//! engine call that closes the gap between desired and requested flow, so
//! repeated evaluation is free.
//!
//! # Architecture
//!
//! ```text
//!                     SessionAdapter<E: RtcEngine>
//!        ┌──────────────────────────────────────────────────┐
//!        │ Mutex<SessionCore> {                             │
//!        │   ConnectionStateMachine                         │
//!        │   PublishLane × 3                                │
//!        │   HashMap<(ParticipantId, MediaKind),            │
//!        │           SubscribeLane>                         │
//!        │   MuteRegistry, RemoteParticipantRegistry        │
//!        │   NetworkQualityAggregator                       │
//!        │ }                                                │
//!        └───────▲───────────────────────────┬──────────────┘
//!                │ EngineEvent               │ publish / subscribe
//!                │                           ▼
//!            [engine event stream]       [RtcEngine]
//! ```
//!
//! The transport itself is out of scope: plug one in by implementing
//! [`RtcEngine`] and feeding its callbacks into
//! [`SessionAdapter::handle_event`] or [`SessionAdapter::spawn_event_loop`].

pub mod engine;
pub mod error;
pub mod lane;
pub mod media;
pub mod registry;
pub mod session;
pub mod stats;

pub use engine::{
    AudioLevel, EngineConnectionState, EngineEvent, EngineSetup, JoinCredentials, RenderSink,
    RtcEngine, SinkMap,
};
pub use error::{EngineError, ErrorCode, ErrorReport, LaneError, Result};
pub use lane::LaneSnapshot;
pub use media::{LocalTrack, MediaFlags, MediaKind, ParticipantId, RemoteTrack};
pub use session::{
    Capabilities, ChannelMode, ChannelRole, ConnectionState, EncryptionMode, SessionAdapter,
    SessionConfig, SessionEvent, VideoCodec,
};
pub use stats::{NetworkQuality, NetworkQualitySummary, NetworkSample};

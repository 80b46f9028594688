//! Transport engine boundary
//!
//! The adapter drives a real-time transport through the [`RtcEngine`] trait and
//! learns about the outside world only through [`EngineEvent`]s. Nothing in
//! this crate knows how the engine moves packets.
//!
//! ```text
//!   caller ──join/leave/mute──►  SessionAdapter ──publish/subscribe──► RtcEngine
//!                                     ▲                                   │
//!                                     └────────── EngineEvent ◄───────────┘
//! ```

pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

use crate::error::EngineError;
use crate::media::{LocalTrack, MediaFlags, MediaKind, ParticipantId, RemoteTrack};
use crate::session::config::{ChannelMode, EncryptionMode, VideoCodec};
use crate::session::state::ConnectionState;
use crate::stats::NetworkSample;

pub use sink::{RenderSink, SinkMap};

/// Credentials used to join a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCredentials {
    /// Application identifier issued by the media service
    pub app_id: String,
    /// Channel (room) name
    pub channel: String,
    /// Access token
    pub token: String,
    /// Our own stream id inside the channel
    pub uid: u32,
}

impl JoinCredentials {
    pub fn new(
        app_id: impl Into<String>,
        channel: impl Into<String>,
        token: impl Into<String>,
        uid: u32,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            channel: channel.into(),
            token: token.into(),
            uid,
        }
    }
}

/// Engine settings resolved from the session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSetup {
    pub codec: VideoCodec,
    pub mode: ChannelMode,
    pub region: Option<String>,
    pub encryption: EncryptionMode,
    /// Key for `encryption`; empty when encryption is off
    pub encryption_key: bytes::Bytes,
    /// Whether the engine should emit periodic audio levels
    pub audio_level_indication: bool,
}

/// Capabilities required from the real-time transport
///
/// `join` and `leave` complete asynchronously. Every other call is
/// fire-and-forget; its outcome comes back later as an [`EngineEvent`].
pub trait RtcEngine: Send + Sync + 'static {
    /// Apply construction-time settings. Called exactly once.
    fn configure(&self, setup: &EngineSetup);

    /// Join the channel
    fn join(
        &self,
        credentials: &JoinCredentials,
    ) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Leave the channel
    fn leave(&self) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Start sending a local track
    fn publish(&self, track: &LocalTrack);

    /// Stop sending a local track
    fn unpublish(&self, track: &LocalTrack);

    /// Start receiving a remote participant's track
    fn subscribe(&self, participant: &ParticipantId, kind: MediaKind) -> RemoteTrack;

    /// Stop receiving a remote track
    fn unsubscribe(&self, track: &RemoteTrack);
}

/// Raw connection states as the engine reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Disconnecting,
}

impl From<EngineConnectionState> for ConnectionState {
    fn from(state: EngineConnectionState) -> Self {
        match state {
            EngineConnectionState::Connected => ConnectionState::Connected,
            EngineConnectionState::Connecting => ConnectionState::Connecting,
            EngineConnectionState::Reconnecting => ConnectionState::Reconnecting,
            EngineConnectionState::Disconnected | EngineConnectionState::Disconnecting => {
                ConnectionState::Idle
            }
        }
    }
}

/// Audio level of one participant in a volume report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioLevel {
    pub participant: ParticipantId,
    /// Level in 0..=100
    pub level: u8,
}

/// Events delivered by the engine, applied by the session in arrival order
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Connectivity changed
    ConnectionStateChanged(EngineConnectionState),

    /// A remote participant published a track of `kind`
    UserPublished {
        participant: ParticipantId,
        kind: MediaKind,
    },

    /// A remote participant unpublished; `remaining` is what they still publish
    UserUnpublished {
        participant: ParticipantId,
        remaining: MediaFlags,
    },

    /// Periodic network quality sample
    NetworkQuality(NetworkSample),

    /// Periodic audio levels of remote participants
    AudioLevels(Vec<AudioLevel>),

    /// A publish request finished and the track is now live
    LocalTrackPublished { kind: MediaKind, track_id: String },

    /// A subscribe request finished and the remote track is now flowing
    RemoteTrackSubscribed {
        participant: ParticipantId,
        kind: MediaKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_state_mapping() {
        assert_eq!(
            ConnectionState::from(EngineConnectionState::Connected),
            ConnectionState::Connected
        );
        assert_eq!(
            ConnectionState::from(EngineConnectionState::Connecting),
            ConnectionState::Connecting
        );
        assert_eq!(
            ConnectionState::from(EngineConnectionState::Reconnecting),
            ConnectionState::Reconnecting
        );
        assert_eq!(
            ConnectionState::from(EngineConnectionState::Disconnecting),
            ConnectionState::Idle
        );
        assert_eq!(
            ConnectionState::from(EngineConnectionState::Disconnected),
            ConnectionState::Idle
        );
    }
}

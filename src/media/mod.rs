//! Media identities shared by lanes, registries and the engine boundary
//!
//! This module provides:
//! - Media kinds and the remaining-media flags reported on unpublish
//! - Participant identities
//! - Local and remote track handles

pub mod track;

pub use track::{LocalTrack, ParticipantId, RemoteTrack};

/// Category of a media track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaKind {
    /// Camera video
    Video,
    /// Microphone audio
    Audio,
    /// Screen share
    Screen,
}

impl MediaKind {
    /// Kinds that can be published locally, one lane each
    pub const LOCAL: [MediaKind; 3] = [MediaKind::Video, MediaKind::Audio, MediaKind::Screen];

    /// Kinds a remote participant can publish to us
    pub const REMOTE: [MediaKind; 2] = [MediaKind::Video, MediaKind::Audio];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Screen => "screen",
        }
    }

    /// Whether tracks of this kind are drawn onto a render sink
    pub fn is_visual(&self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Screen)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media a remote participant still publishes after an unpublish event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaFlags {
    pub has_video: bool,
    pub has_audio: bool,
}

impl MediaFlags {
    pub fn new(has_video: bool, has_audio: bool) -> Self {
        Self {
            has_video,
            has_audio,
        }
    }

    /// Whether the flags include the given remote kind
    pub fn contains(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Video => self.has_video,
            MediaKind::Audio => self.has_audio,
            MediaKind::Screen => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.has_video && !self.has_audio
    }
}

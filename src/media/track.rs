//! Track and participant handles

/// Identity of a remote participant (the engine's stream/user id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u32> for ParticipantId {
    fn from(uid: u32) -> Self {
        Self(uid.to_string())
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A local track-producing source (camera, microphone, screen capture)
///
/// The adapter never touches media samples; it only tells the engine which
/// source to publish. Two handles refer to the same source iff their ids match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalTrack {
    /// Kind of media this source produces
    pub kind: super::MediaKind,
    /// Source identifier, e.g. a capture device id
    pub id: String,
}

impl LocalTrack {
    pub fn new(kind: super::MediaKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Camera source
    pub fn video(id: impl Into<String>) -> Self {
        Self::new(super::MediaKind::Video, id)
    }

    /// Microphone source
    pub fn audio(id: impl Into<String>) -> Self {
        Self::new(super::MediaKind::Audio, id)
    }

    /// Screen capture source
    pub fn screen(id: impl Into<String>) -> Self {
        Self::new(super::MediaKind::Screen, id)
    }
}

/// A subscribed remote track, handed to render sinks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteTrack {
    pub participant: ParticipantId,
    pub kind: super::MediaKind,
}

impl RemoteTrack {
    pub fn new(participant: ParticipantId, kind: super::MediaKind) -> Self {
        Self { participant, kind }
    }
}

impl std::fmt::Display for RemoteTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.participant, self.kind)
    }
}

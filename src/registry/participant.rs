//! Remote participant tracking
//!
//! Records which media kinds each remote participant currently publishes. The
//! registry only does the bookkeeping; it reports what changed so the session
//! can create or stop the matching subscribe lanes.

use std::collections::{BTreeSet, HashMap};

use crate::media::{MediaFlags, MediaKind, ParticipantId};

/// Outcome of an unpublish event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unpublished {
    /// Kinds the participant no longer publishes
    pub removed: Vec<MediaKind>,
    /// The participant publishes nothing any more and was dropped
    pub departed: bool,
}

/// participant → kinds currently published
#[derive(Debug, Default)]
pub struct RemoteParticipantRegistry {
    participants: HashMap<ParticipantId, BTreeSet<MediaKind>>,
}

impl RemoteParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `participant` published `kind`
    ///
    /// Returns true if the kind was not already known for the participant.
    pub fn on_published(&mut self, participant: &ParticipantId, kind: MediaKind) -> bool {
        let kinds = self.participants.entry(participant.clone()).or_default();
        let added = kinds.insert(kind);

        tracing::debug!(
            participant = %participant,
            kind = %kind,
            new = added,
            "Remote media published"
        );

        added
    }

    /// Recompute a participant's kinds from the flags left after an unpublish
    ///
    /// Unknown participants are ignored and yield an empty outcome.
    pub fn on_unpublished(&mut self, participant: &ParticipantId, remaining: MediaFlags) -> Unpublished {
        let Some(kinds) = self.participants.get_mut(participant) else {
            return Unpublished::default();
        };

        let removed: Vec<MediaKind> = kinds
            .iter()
            .copied()
            .filter(|kind| !remaining.contains(*kind))
            .collect();
        kinds.retain(|kind| remaining.contains(*kind));

        let departed = kinds.is_empty();
        if departed {
            self.participants.remove(participant);
        }

        tracing::debug!(
            participant = %participant,
            removed = ?removed,
            departed = departed,
            "Remote media unpublished"
        );

        Unpublished { removed, departed }
    }

    /// Kinds currently published by a participant
    pub fn kinds(&self, participant: &ParticipantId) -> Option<&BTreeSet<MediaKind>> {
        self.participants.get(participant)
    }

    /// Whether the participant is publishing this kind
    pub fn is_publishing(&self, participant: &ParticipantId, kind: MediaKind) -> bool {
        self.participants
            .get(participant)
            .is_some_and(|kinds| kinds.contains(&kind))
    }

    /// Whether the participant is known
    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.participants.contains_key(participant)
    }

    /// Known remote participants, unordered
    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.participants.keys()
    }

    /// Number of known participants
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_video_then_audio() {
        let mut registry = RemoteParticipantRegistry::new();
        let p = ParticipantId::from("42");

        assert!(registry.on_published(&p, MediaKind::Video));
        assert!(registry.on_published(&p, MediaKind::Audio));
        assert!(!registry.on_published(&p, MediaKind::Audio));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.kinds(&p).map(|k| k.len()), Some(2));
    }

    #[test]
    fn test_partial_unpublish() {
        let mut registry = RemoteParticipantRegistry::new();
        let p = ParticipantId::from("42");
        registry.on_published(&p, MediaKind::Video);
        registry.on_published(&p, MediaKind::Audio);

        let outcome = registry.on_unpublished(&p, MediaFlags::new(false, true));

        assert_eq!(outcome.removed, vec![MediaKind::Video]);
        assert!(!outcome.departed);
        assert!(registry.is_publishing(&p, MediaKind::Audio));
        assert!(!registry.is_publishing(&p, MediaKind::Video));
    }

    #[test]
    fn test_full_unpublish_drops_participant() {
        let mut registry = RemoteParticipantRegistry::new();
        let p = ParticipantId::from("42");
        registry.on_published(&p, MediaKind::Video);
        registry.on_published(&p, MediaKind::Audio);

        let outcome = registry.on_unpublished(&p, MediaFlags::default());

        assert_eq!(outcome.removed, vec![MediaKind::Video, MediaKind::Audio]);
        assert!(outcome.departed);
        assert!(!registry.contains(&p));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unpublish_unknown_participant() {
        let mut registry = RemoteParticipantRegistry::new();

        let outcome = registry.on_unpublished(&ParticipantId::from("ghost"), MediaFlags::default());

        assert_eq!(outcome, Unpublished::default());
    }

    #[test]
    fn test_flags_for_unpublished_kind_are_ignored() {
        let mut registry = RemoteParticipantRegistry::new();
        let p = ParticipantId::from("42");
        registry.on_published(&p, MediaKind::Audio);

        // Engine claims video is still up although it was never published
        let outcome = registry.on_unpublished(&p, MediaFlags::new(true, false));

        assert_eq!(outcome.removed, vec![MediaKind::Audio]);
        assert!(outcome.departed);
    }
}

//! Remote mute intent
//!
//! Intent is keyed by participant identity, not by lane, so a decision to mute
//! someone outlives their lanes: it still applies after they unpublish, leave,
//! or the connection drops and comes back. Entries go away only through an
//! explicit reset.

use std::collections::HashMap;

use crate::media::{MediaKind, ParticipantId};

/// (participant, kind) → muted
#[derive(Debug, Default, Clone)]
pub struct MuteRegistry {
    entries: HashMap<(ParticipantId, MediaKind), bool>,
}

impl MuteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intended mute state; participants never written are not muted
    pub fn is_muted(&self, participant: &ParticipantId, kind: MediaKind) -> bool {
        self.get(participant, kind).unwrap_or(false)
    }

    /// Stored intent, if any
    pub fn get(&self, participant: &ParticipantId, kind: MediaKind) -> Option<bool> {
        self.entries.get(&(participant.clone(), kind)).copied()
    }

    /// Record mute intent for one remote lane
    pub fn set(&mut self, participant: ParticipantId, kind: MediaKind, muted: bool) {
        self.entries.insert((participant, kind), muted);
    }

    /// Whether any intent was recorded
    pub fn contains(&self, participant: &ParticipantId, kind: MediaKind) -> bool {
        self.entries.contains_key(&(participant.clone(), kind))
    }

    /// Forget all intent for one participant
    pub fn clear_participant(&mut self, participant: &ParticipantId) {
        self.entries.retain(|(p, _), _| p != participant);
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_not_muted() {
        let registry = MuteRegistry::new();
        let p = ParticipantId::from("1001");

        assert!(!registry.is_muted(&p, MediaKind::Video));
        assert!(!registry.contains(&p, MediaKind::Video));
        assert_eq!(registry.get(&p, MediaKind::Audio), None);
    }

    #[test]
    fn test_set_is_per_kind() {
        let mut registry = MuteRegistry::new();
        let p = ParticipantId::from("1001");

        registry.set(p.clone(), MediaKind::Video, true);

        assert!(registry.is_muted(&p, MediaKind::Video));
        assert!(!registry.is_muted(&p, MediaKind::Audio));

        registry.set(p.clone(), MediaKind::Video, false);
        assert!(!registry.is_muted(&p, MediaKind::Video));
        // An explicit "unmuted" still counts as a stored entry
        assert!(registry.contains(&p, MediaKind::Video));
    }

    #[test]
    fn test_clear_participant() {
        let mut registry = MuteRegistry::new();
        let a = ParticipantId::from("a");
        let b = ParticipantId::from("b");
        registry.set(a.clone(), MediaKind::Video, true);
        registry.set(a.clone(), MediaKind::Audio, true);
        registry.set(b.clone(), MediaKind::Audio, true);

        registry.clear_participant(&a);

        assert_eq!(registry.len(), 1);
        assert!(!registry.is_muted(&a, MediaKind::Video));
        assert!(registry.is_muted(&b, MediaKind::Audio));

        registry.clear();
        assert!(registry.is_empty());
    }
}

//! Render sinks for remote video
//!
//! The embedding application assigns a sink (a drawing surface) to each remote
//! participant it wants to show. The session only reads the map when a video
//! lane starts; it never inserts or removes entries.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::media::{ParticipantId, RemoteTrack};

/// A surface that can display one remote video track
pub trait RenderSink: Send + Sync {
    /// Start drawing `track`
    fn attach(&self, track: &RemoteTrack);

    /// Stop drawing `track`
    fn detach(&self, track: &RemoteTrack);
}

/// Shared participant → sink assignments
#[derive(Clone, Default)]
pub struct SinkMap {
    sinks: Arc<RwLock<HashMap<ParticipantId, Arc<dyn RenderSink>>>>,
}

impl SinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a sink to a participant, replacing any previous one
    ///
    /// Takes effect the next time a video lane for the participant starts.
    pub fn assign(&self, participant: ParticipantId, sink: Arc<dyn RenderSink>) {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(participant, sink);
    }

    /// Remove a participant's sink
    pub fn remove(&self, participant: &ParticipantId) -> Option<Arc<dyn RenderSink>> {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(participant)
    }

    /// Look up the sink assigned to a participant
    pub fn get(&self, participant: &ParticipantId) -> Option<Arc<dyn RenderSink>> {
        self.sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(participant)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.sinks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SinkMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkMap").field("len", &self.len()).finish()
    }
}

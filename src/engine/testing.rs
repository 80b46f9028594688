//! Recording engine and sink used by unit tests

use std::sync::{Mutex, PoisonError};

use crate::error::EngineError;
use crate::media::{LocalTrack, MediaKind, ParticipantId, RemoteTrack};

use super::{EngineSetup, JoinCredentials, RenderSink, RtcEngine};

/// One call made against the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Configure(EngineSetup),
    Join(JoinCredentials),
    Leave,
    Publish(LocalTrack),
    Unpublish(LocalTrack),
    Subscribe(RemoteTrack),
    Unsubscribe(RemoteTrack),
}

/// Engine that records every call and answers join/leave with canned results
#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
    join_error: Option<EngineError>,
    leave_error: Option<EngineError>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose join always fails
    pub fn failing_join(error: EngineError) -> Self {
        Self {
            join_error: Some(error),
            ..Self::default()
        }
    }

    /// Engine whose leave always fails
    pub fn failing_leave(error: EngineError) -> Self {
        Self {
            leave_error: Some(error),
            ..Self::default()
        }
    }

    fn record(&self, call: EngineCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Every call recorded so far
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls that start or stop media flow (publish/unpublish/subscribe/unsubscribe)
    pub fn media_calls(&self) -> Vec<EngineCall> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    EngineCall::Publish(_)
                        | EngineCall::Unpublish(_)
                        | EngineCall::Subscribe(_)
                        | EngineCall::Unsubscribe(_)
                )
            })
            .collect()
    }

    /// Forget recorded calls
    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl RtcEngine for RecordingEngine {
    fn configure(&self, setup: &EngineSetup) {
        self.record(EngineCall::Configure(setup.clone()));
    }

    async fn join(&self, credentials: &JoinCredentials) -> Result<(), EngineError> {
        self.record(EngineCall::Join(credentials.clone()));
        match &self.join_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn leave(&self) -> Result<(), EngineError> {
        self.record(EngineCall::Leave);
        match &self.leave_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn publish(&self, track: &LocalTrack) {
        self.record(EngineCall::Publish(track.clone()));
    }

    fn unpublish(&self, track: &LocalTrack) {
        self.record(EngineCall::Unpublish(track.clone()));
    }

    fn subscribe(&self, participant: &ParticipantId, kind: MediaKind) -> RemoteTrack {
        let track = RemoteTrack::new(participant.clone(), kind);
        self.record(EngineCall::Subscribe(track.clone()));
        track
    }

    fn unsubscribe(&self, track: &RemoteTrack) {
        self.record(EngineCall::Unsubscribe(track.clone()));
    }
}

/// Sink that remembers which tracks are currently attached
#[derive(Default)]
pub struct RecordingSink {
    attached: Mutex<Vec<RemoteTrack>>,
    attach_count: Mutex<usize>,
}

impl RecordingSink {
    pub fn attached(&self) -> Vec<RemoteTrack> {
        self.attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn attach_count(&self) -> usize {
        *self.attach_count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RenderSink for RecordingSink {
    fn attach(&self, track: &RemoteTrack) {
        self.attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(track.clone());
        *self.attach_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn detach(&self, track: &RemoteTrack) {
        self.attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|t| t != track);
    }
}

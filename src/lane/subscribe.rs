//! Remote subscribe lanes
//!
//! One lane per (participant, kind). The lane holds no mute flag of its own:
//! intent is read from the [`MuteRegistry`] on every evaluation, so it follows
//! the participant across unpublish/republish cycles.

use std::sync::Arc;

use crate::engine::{RenderSink, RtcEngine, SinkMap};
use crate::media::{MediaKind, ParticipantId, RemoteTrack};
use crate::registry::MuteRegistry;

use super::LaneSnapshot;

/// Decides whether a remote track should currently be received
pub struct SubscribeLane {
    participant: ParticipantId,
    kind: MediaKind,

    /// Connection permits receiving
    runnable: bool,

    /// Subscribed track, until unsubscribed
    track: Option<RemoteTrack>,

    /// Sink the track is drawn on (video only)
    sink: Option<Arc<dyn RenderSink>>,
}

impl SubscribeLane {
    pub fn new(participant: ParticipantId, kind: MediaKind, runnable: bool) -> Self {
        Self {
            participant,
            kind,
            runnable,
            track: None,
            sink: None,
        }
    }

    /// Remote participant this lane receives from
    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    /// Media kind this lane carries
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Whether the connection permits subscribing
    pub fn is_runnable(&self) -> bool {
        self.runnable
    }

    /// Runnable and not muted in the registry
    pub fn is_active(&self, mutes: &MuteRegistry) -> bool {
        self.runnable && !mutes.is_muted(&self.participant, self.kind)
    }

    /// Whether a subscription has been requested
    pub fn is_subscribed(&self) -> bool {
        self.track.is_some()
    }

    /// Whether a render sink is attached to the subscribed track
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Point-in-time view of the lane
    pub fn snapshot(&self, mutes: &MuteRegistry) -> LaneSnapshot {
        LaneSnapshot {
            kind: self.kind,
            runnable: self.runnable,
            muted: mutes.is_muted(&self.participant, self.kind),
            active: self.is_active(mutes),
            flowing: self.track.is_some(),
        }
    }

    pub(crate) fn set_runnable(&mut self, runnable: bool) {
        self.runnable = runnable;
    }

    /// Reconcile the engine with the current inputs
    ///
    /// Returns true if the lane subscribed or unsubscribed.
    pub fn reevaluate<E: RtcEngine>(
        &mut self,
        mutes: &MuteRegistry,
        sinks: &SinkMap,
        engine: &E,
    ) -> bool {
        match (self.is_active(mutes), self.track.is_some()) {
            (true, false) => {
                self.start(sinks, engine);
                true
            }
            (false, true) => {
                self.halt(engine);
                true
            }
            _ => false,
        }
    }

    /// Tear the lane down
    ///
    /// Consumes the lane, so it runs once per lane.
    pub fn stop<E: RtcEngine>(mut self, engine: &E) {
        self.halt(engine);
        tracing::debug!(
            participant = %self.participant,
            kind = %self.kind,
            "Subscribe lane stopped"
        );
    }

    /// Handle the engine's confirmation that the subscription is flowing
    pub fn on_subscribe_settled<E: RtcEngine>(&mut self, engine: &E) {
        if self.track.is_none() {
            tracing::debug!(
                participant = %self.participant,
                kind = %self.kind,
                "Stale subscribe settled, unsubscribing"
            );
            engine.unsubscribe(&RemoteTrack::new(self.participant.clone(), self.kind));
        }
    }

    fn start<E: RtcEngine>(&mut self, sinks: &SinkMap, engine: &E) {
        let track = engine.subscribe(&self.participant, self.kind);

        if self.kind.is_visual() {
            match sinks.get(&self.participant) {
                Some(sink) => {
                    sink.attach(&track);
                    self.sink = Some(sink);
                }
                None => {
                    tracing::debug!(track = %track, "No render sink assigned");
                }
            }
        }

        tracing::debug!(track = %track, "Subscribed remote track");
        self.track = Some(track);
    }

    fn halt<E: RtcEngine>(&mut self, engine: &E) {
        if let Some(track) = self.track.take() {
            if let Some(sink) = self.sink.take() {
                sink.detach(&track);
            }
            engine.unsubscribe(&track);
            tracing::debug!(track = %track, "Unsubscribed remote track");
        }
    }
}

impl std::fmt::Debug for SubscribeLane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscribeLane")
            .field("participant", &self.participant)
            .field("kind", &self.kind)
            .field("runnable", &self.runnable)
            .field("track", &self.track)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{EngineCall, RecordingEngine, RecordingSink};

    fn track(p: &str, kind: MediaKind) -> RemoteTrack {
        RemoteTrack::new(ParticipantId::from(p), kind)
    }

    #[test]
    fn test_not_runnable_does_nothing() {
        let engine = RecordingEngine::new();
        let mut lane = SubscribeLane::new(ParticipantId::from("7"), MediaKind::Audio, false);

        assert!(!lane.reevaluate(&MuteRegistry::new(), &SinkMap::new(), &engine));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_runnable_subscribes_once() {
        let engine = RecordingEngine::new();
        let mutes = MuteRegistry::new();
        let sinks = SinkMap::new();
        let mut lane = SubscribeLane::new(ParticipantId::from("7"), MediaKind::Audio, true);

        assert!(lane.reevaluate(&mutes, &sinks, &engine));
        assert!(!lane.reevaluate(&mutes, &sinks, &engine));

        assert_eq!(
            engine.calls(),
            vec![EngineCall::Subscribe(track("7", MediaKind::Audio))]
        );
    }

    #[test]
    fn test_muted_in_registry_stays_inactive() {
        let engine = RecordingEngine::new();
        let mut mutes = MuteRegistry::new();
        mutes.set(ParticipantId::from("7"), MediaKind::Video, true);
        let mut lane = SubscribeLane::new(ParticipantId::from("7"), MediaKind::Video, true);

        assert!(!lane.reevaluate(&mutes, &SinkMap::new(), &engine));
        assert!(!lane.is_active(&mutes));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_registry_change_applies_on_reevaluate() {
        let engine = RecordingEngine::new();
        let mut mutes = MuteRegistry::new();
        let sinks = SinkMap::new();
        let mut lane = SubscribeLane::new(ParticipantId::from("7"), MediaKind::Audio, true);
        lane.reevaluate(&mutes, &sinks, &engine);

        mutes.set(ParticipantId::from("7"), MediaKind::Audio, true);
        assert!(lane.reevaluate(&mutes, &sinks, &engine));

        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::Subscribe(track("7", MediaKind::Audio)),
                EngineCall::Unsubscribe(track("7", MediaKind::Audio)),
            ]
        );
        assert!(!lane.is_subscribed());
    }

    #[test]
    fn test_video_attaches_assigned_sink() {
        let engine = RecordingEngine::new();
        let sinks = SinkMap::new();
        let sink = Arc::new(RecordingSink::default());
        sinks.assign(ParticipantId::from("7"), sink.clone());
        let mut lane = SubscribeLane::new(ParticipantId::from("7"), MediaKind::Video, true);

        lane.reevaluate(&MuteRegistry::new(), &sinks, &engine);

        assert!(lane.has_sink());
        assert_eq!(sink.attached(), vec![track("7", MediaKind::Video)]);

        lane.stop(&engine);
        assert!(sink.attached().is_empty());
        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::Subscribe(track("7", MediaKind::Video)),
                EngineCall::Unsubscribe(track("7", MediaKind::Video)),
            ]
        );
    }

    #[test]
    fn test_audio_ignores_sink() {
        let engine = RecordingEngine::new();
        let sinks = SinkMap::new();
        let sink = Arc::new(RecordingSink::default());
        sinks.assign(ParticipantId::from("7"), sink.clone());
        let mut lane = SubscribeLane::new(ParticipantId::from("7"), MediaKind::Audio, true);

        lane.reevaluate(&MuteRegistry::new(), &sinks, &engine);

        assert!(!lane.has_sink());
        assert_eq!(sink.attach_count(), 0);
    }

    #[test]
    fn test_video_without_sink_still_subscribes() {
        let engine = RecordingEngine::new();
        let mut lane = SubscribeLane::new(ParticipantId::from("7"), MediaKind::Video, true);

        lane.reevaluate(&MuteRegistry::new(), &SinkMap::new(), &engine);

        assert!(lane.is_subscribed());
        assert!(!lane.has_sink());
    }

    #[test]
    fn test_stop_inactive_lane_makes_no_call() {
        let engine = RecordingEngine::new();
        let lane = SubscribeLane::new(ParticipantId::from("7"), MediaKind::Video, false);

        lane.stop(&engine);

        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_stale_subscribe_is_taken_down() {
        let engine = RecordingEngine::new();
        let mut lane = SubscribeLane::new(ParticipantId::from("7"), MediaKind::Video, false);

        lane.on_subscribe_settled(&engine);

        assert_eq!(
            engine.calls(),
            vec![EngineCall::Unsubscribe(track("7", MediaKind::Video))]
        );
    }
}

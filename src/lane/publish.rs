//! Local publish lanes
//!
//! One lane exists per local media kind for the whole lifetime of a session.
//! A lane starts not runnable and muted with no source bound, so nothing is
//! published until the connection is up, a source is bound and the caller
//! unmutes.

use crate::engine::RtcEngine;
use crate::error::{LaneError, Result};
use crate::media::{LocalTrack, MediaKind};

use super::LaneSnapshot;

/// Decides whether a local track should currently be sent to the session
#[derive(Debug)]
pub struct PublishLane {
    kind: MediaKind,

    /// Bound track source (camera, microphone, screen capture)
    source: Option<LocalTrack>,

    /// Connection permits publishing
    runnable: bool,

    /// User intent
    muted: bool,

    /// Track last handed to `engine.publish`, until the matching unpublish
    published: Option<LocalTrack>,
}

impl PublishLane {
    /// Create an idle lane for `kind`
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            source: None,
            runnable: false,
            muted: true,
            published: None,
        }
    }

    /// Media kind this lane carries
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Currently bound local source
    pub fn source(&self) -> Option<&LocalTrack> {
        self.source.as_ref()
    }

    /// Whether the connection permits publishing
    pub fn is_runnable(&self) -> bool {
        self.runnable
    }

    /// Whether the user muted this lane
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Runnable and not muted
    pub fn is_active(&self) -> bool {
        self.runnable && !self.muted
    }

    /// Track currently published, if any
    pub fn published(&self) -> Option<&LocalTrack> {
        self.published.as_ref()
    }

    /// Point-in-time view of the lane
    pub fn snapshot(&self) -> LaneSnapshot {
        LaneSnapshot {
            kind: self.kind,
            runnable: self.runnable,
            muted: self.muted,
            active: self.is_active(),
            flowing: self.published.is_some(),
        }
    }

    /// Update the connection input; the caller re-evaluates afterwards
    pub(crate) fn set_runnable(&mut self, runnable: bool) {
        self.runnable = runnable;
    }

    /// Set user intent and re-evaluate
    ///
    /// Fails without touching any state when no source is bound.
    pub fn set_muted<E: RtcEngine>(&mut self, muted: bool, engine: &E) -> Result<()> {
        if self.source.is_none() {
            return Err(LaneError::NoLocalSource(self.kind));
        }

        self.muted = muted;
        self.reevaluate(engine);
        Ok(())
    }

    /// Bind (or rebind) the track source
    ///
    /// If the lane is active the old source is unpublished and the new one
    /// published, so at most one source of this kind is ever live.
    pub fn bind_source<E: RtcEngine>(&mut self, source: LocalTrack, engine: &E) -> Result<()> {
        if source.kind != self.kind {
            return Err(LaneError::KindMismatch {
                lane: self.kind,
                source: source.kind,
            });
        }

        self.source = Some(source);
        self.reevaluate(engine);
        Ok(())
    }

    /// Reconcile the engine with the current inputs
    ///
    /// Returns true if an engine call was made.
    pub fn reevaluate<E: RtcEngine>(&mut self, engine: &E) -> bool {
        let desired = if self.is_active() {
            self.source.clone()
        } else {
            None
        };

        if desired == self.published {
            return false;
        }

        if let Some(old) = self.published.take() {
            tracing::debug!(kind = %self.kind, track = %old.id, "Unpublishing local track");
            engine.unpublish(&old);
        }

        if let Some(ref new) = desired {
            tracing::debug!(kind = %self.kind, track = %new.id, "Publishing local track");
            engine.publish(new);
        }

        self.published = desired;
        true
    }

    /// Handle the engine's confirmation that `track_id` went live
    ///
    /// A publish that completes after the lane moved on (muted, disconnected or
    /// rebound) is taken down again right away.
    pub fn on_publish_settled<E: RtcEngine>(&mut self, track_id: &str, engine: &E) {
        let wanted = self
            .published
            .as_ref()
            .is_some_and(|track| track.id == track_id);

        if !wanted {
            tracing::debug!(
                kind = %self.kind,
                track = track_id,
                "Stale publish settled, unpublishing"
            );
            engine.unpublish(&LocalTrack::new(self.kind, track_id));
        }
    }
}

//! Session adapter
//!
//! Composition root of a session. It owns the connection state machine, the
//! three local publish lanes, every remote subscribe lane and the registries,
//! and it is the only place where engine events are applied.
//!
//! # Serialization
//!
//! All session state lives behind one mutex. Each engine event and each caller
//! operation holds it for the whole reaction, so no two reactions interleave
//! their read-modify-write of a lane or registry entry. The lock is never held
//! across an `.await`: `join` and `leave` only talk to the engine.
//!
//! ```text
//!   EngineEvent ──► handle_event ──┐
//!   set_*_mute  ───────────────────┼──► Mutex<SessionCore> ──► lanes ──► RtcEngine
//!   bind_local_source ─────────────┘            │
//!                                               └──► broadcast<SessionEvent>
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use tokio::sync::{broadcast, mpsc};

use crate::engine::{EngineEvent, JoinCredentials, RtcEngine, SinkMap};
use crate::error::{EngineError, ErrorCode, ErrorReport, Result};
use crate::lane::{LaneSnapshot, PublishLane, SubscribeLane};
use crate::media::{LocalTrack, MediaFlags, MediaKind, ParticipantId, RemoteTrack};
use crate::registry::{MuteRegistry, RemoteParticipantRegistry};
use crate::stats::{NetworkQualityAggregator, NetworkQualitySummary, NetworkSample};

use super::config::{Capabilities, ChannelRole, SessionConfig};
use super::event::SessionEvent;
use super::state::{ConnectionState, ConnectionStateMachine};

/// The three local publish lanes
#[derive(Debug)]
struct PublishLanes {
    video: PublishLane,
    audio: PublishLane,
    screen: PublishLane,
}

impl PublishLanes {
    fn new() -> Self {
        Self {
            video: PublishLane::new(MediaKind::Video),
            audio: PublishLane::new(MediaKind::Audio),
            screen: PublishLane::new(MediaKind::Screen),
        }
    }

    fn get(&self, kind: MediaKind) -> &PublishLane {
        match kind {
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.audio,
            MediaKind::Screen => &self.screen,
        }
    }

    fn get_mut(&mut self, kind: MediaKind) -> &mut PublishLane {
        match kind {
            MediaKind::Video => &mut self.video,
            MediaKind::Audio => &mut self.audio,
            MediaKind::Screen => &mut self.screen,
        }
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut PublishLane> {
        [&mut self.video, &mut self.audio, &mut self.screen].into_iter()
    }
}

/// Everything guarded by the session lock
#[derive(Debug)]
struct SessionCore {
    machine: ConnectionStateMachine,
    publish_lanes: PublishLanes,
    subscribe_lanes: HashMap<(ParticipantId, MediaKind), SubscribeLane>,
    mutes: MuteRegistry,
    participants: RemoteParticipantRegistry,
    stats: NetworkQualityAggregator,
}

impl SessionCore {
    fn new() -> Self {
        Self {
            machine: ConnectionStateMachine::new(),
            publish_lanes: PublishLanes::new(),
            subscribe_lanes: HashMap::new(),
            mutes: MuteRegistry::new(),
            participants: RemoteParticipantRegistry::new(),
            stats: NetworkQualityAggregator::new(),
        }
    }

    /// Push a new `runnable` value into every lane and re-evaluate each one
    fn set_all_runnable<E: RtcEngine>(&mut self, runnable: bool, sinks: &SinkMap, engine: &E) {
        for lane in self.publish_lanes.iter_mut() {
            lane.set_runnable(runnable);
            lane.reevaluate(engine);
        }

        for lane in self.subscribe_lanes.values_mut() {
            lane.set_runnable(runnable);
            lane.reevaluate(&self.mutes, sinks, engine);
        }
    }

    /// Re-evaluate the subscribe lane for a pair, if one exists
    fn reevaluate_remote<E: RtcEngine>(
        &mut self,
        participant: &ParticipantId,
        kind: MediaKind,
        sinks: &SinkMap,
        engine: &E,
    ) {
        if let Some(lane) = self.subscribe_lanes.get_mut(&(participant.clone(), kind)) {
            lane.reevaluate(&self.mutes, sinks, engine);
        }
    }

    fn stop_remote<E: RtcEngine>(&mut self, participant: &ParticipantId, kind: MediaKind, engine: &E) {
        if let Some(lane) = self.subscribe_lanes.remove(&(participant.clone(), kind)) {
            lane.stop(engine);
        }
    }
}

/// Real-time media session adapter
///
/// Turns one engine connection into independently switchable publish and
/// subscribe lanes.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use rtc_lanes::{SessionAdapter, SessionConfig, RtcEngine, JoinCredentials, LocalTrack, MediaKind};
///
/// # async fn example<E: RtcEngine>(engine: E) -> Result<(), Box<dyn std::error::Error>> {
/// let session = Arc::new(SessionAdapter::new(engine, SessionConfig::default()));
/// let (_engine_tx, engine_rx) = tokio::sync::mpsc::unbounded_channel();
/// let _loop = session.spawn_event_loop(engine_rx);
///
/// session.join(&JoinCredentials::new("app", "room-1", "token", 1001)).await?;
/// session.bind_local_source(LocalTrack::video("camera-0"))?;
/// session.set_local_mute(MediaKind::Video, false)?;
/// # Ok(())
/// # }
/// ```
pub struct SessionAdapter<E: RtcEngine> {
    engine: E,
    config: SessionConfig,
    sinks: SinkMap,
    core: Mutex<SessionCore>,
    events: broadcast::Sender<SessionEvent>,
    left: AtomicBool,
}

impl<E: RtcEngine> SessionAdapter<E> {
    /// Create a session with its own render sink map
    pub fn new(engine: E, config: SessionConfig) -> Self {
        Self::with_sinks(engine, config, SinkMap::new())
    }

    /// Create a session that reads render sinks from a shared map
    pub fn with_sinks(engine: E, config: SessionConfig, sinks: SinkMap) -> Self {
        let setup = config.engine_setup();
        engine.configure(&setup);

        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        tracing::debug!(
            role = ?config.role,
            capabilities = ?config.capabilities,
            codec = ?setup.codec,
            mode = ?setup.mode,
            encryption = setup.encryption.as_str(),
            "Session created"
        );

        Self {
            engine,
            config,
            sinks,
            core: Mutex::new(SessionCore::new()),
            events,
            left: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }

    /// The underlying engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Channel role this session joined as
    pub fn role(&self) -> ChannelRole {
        self.config.role
    }

    /// Publish/subscribe capabilities
    pub fn capabilities(&self) -> Capabilities {
        self.config.capabilities
    }

    /// Render sink assignments read by remote video lanes
    pub fn sinks(&self) -> &SinkMap {
        &self.sinks
    }

    /// Receive upward notifications
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Join the channel
    ///
    /// Engine failures are returned as-is; retrying is up to the caller.
    pub async fn join(&self, credentials: &JoinCredentials) -> std::result::Result<(), EngineError> {
        tracing::info!(
            channel = %credentials.channel,
            uid = credentials.uid,
            role = ?self.config.role,
            "Joining channel"
        );

        if let Err(e) = self.engine.join(credentials).await {
            tracing::warn!(channel = %credentials.channel, error = %e, "Join failed");
            return Err(e);
        }

        self.left.store(false, Ordering::Release);
        Ok(())
    }

    /// Leave the channel
    ///
    /// An engine failure is reported on the event channel as
    /// [`ErrorCode::ClientLeaveChannelFail`]; the session counts as left either way.
    pub async fn leave(&self) {
        match self.engine.leave().await {
            Ok(()) => {
                tracing::info!(role = ?self.config.role, "Left channel");
            }
            Err(cause) => {
                let report = ErrorReport::new(ErrorCode::ClientLeaveChannelFail, cause);
                tracing::warn!(code = %report.code, error = %report.cause, "Leave failed");
                self.emit(SessionEvent::Error(report));
            }
        }

        self.left.store(true, Ordering::Release);
    }

    /// Whether `leave` has been called since the last successful `join`
    pub fn has_left(&self) -> bool {
        self.left.load(Ordering::Acquire)
    }

    /// Mute or unmute a local lane
    pub fn set_local_mute(&self, kind: MediaKind, muted: bool) -> Result<()> {
        tracing::info!(kind = %kind, muted = muted, "Set local mute");
        self.lock()
            .publish_lanes
            .get_mut(kind)
            .set_muted(muted, &self.engine)
    }

    /// Bind a track source to the local lane of its kind
    pub fn bind_local_source(&self, track: LocalTrack) -> Result<()> {
        tracing::debug!(kind = %track.kind, track = %track.id, "Bind local source");
        let kind = track.kind;
        self.lock()
            .publish_lanes
            .get_mut(kind)
            .bind_source(track, &self.engine)
    }

    /// Record mute intent for a remote participant
    ///
    /// Always succeeds. Intent for someone who has not published yet takes
    /// effect once they do, and it survives them leaving and coming back.
    pub fn set_remote_mute(&self, participant: &ParticipantId, kind: MediaKind, muted: bool) {
        tracing::info!(participant = %participant, kind = %kind, muted = muted, "Set remote mute");

        let mut guard = self.lock();
        let core = &mut *guard;
        core.mutes.set(participant.clone(), kind, muted);
        core.reevaluate_remote(participant, kind, &self.sinks, &self.engine);
    }

    /// Stored remote mute intent
    pub fn remote_mute(&self, participant: &ParticipantId, kind: MediaKind) -> bool {
        self.lock().mutes.is_muted(participant, kind)
    }

    /// Forget all remote mute intent and re-evaluate every remote lane
    pub fn reset_remote_mutes(&self) {
        tracing::info!("Reset remote mutes");

        let mut guard = self.lock();
        let core = &mut *guard;
        core.mutes.clear();
        for lane in core.subscribe_lanes.values_mut() {
            lane.reevaluate(&core.mutes, &self.sinks, &self.engine);
        }
    }

    /// Current connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.lock().machine.state()
    }

    /// Whether the session is connected
    pub fn is_ready(&self) -> bool {
        self.lock().machine.is_connected()
    }

    /// Latest network quality summary
    pub fn network_summary(&self) -> NetworkQualitySummary {
        *self.lock().stats.summary()
    }

    /// Snapshot of a local lane
    pub fn local_lane(&self, kind: MediaKind) -> LaneSnapshot {
        self.lock().publish_lanes.get(kind).snapshot()
    }

    /// Snapshot of a remote lane, if one exists
    pub fn remote_lane(&self, participant: &ParticipantId, kind: MediaKind) -> Option<LaneSnapshot> {
        let core = self.lock();
        let snapshot = core
            .subscribe_lanes
            .get(&(participant.clone(), kind))
            .map(|lane| lane.snapshot(&core.mutes));
        snapshot
    }

    /// Number of remote subscribe lanes
    pub fn remote_lane_count(&self) -> usize {
        self.lock().subscribe_lanes.len()
    }

    /// Remote participants currently publishing anything
    pub fn remote_participants(&self) -> Vec<ParticipantId> {
        let mut participants: Vec<ParticipantId> =
            self.lock().participants.participants().cloned().collect();
        participants.sort();
        participants
    }

    /// Apply one engine event
    pub fn handle_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::ConnectionStateChanged(state) => self.on_connection_state(state.into()),
            EngineEvent::UserPublished { participant, kind } => {
                self.on_user_published(participant, kind)
            }
            EngineEvent::UserUnpublished {
                participant,
                remaining,
            } => self.on_user_unpublished(participant, remaining),
            EngineEvent::NetworkQuality(sample) => self.on_network_quality(sample),
            EngineEvent::AudioLevels(levels) => {
                if !self.config.capabilities.subscribes() {
                    return;
                }
                let levels: HashMap<ParticipantId, u8> = levels
                    .into_iter()
                    .map(|l| (l.participant, l.level))
                    .collect();
                self.emit(SessionEvent::AudioLevelsChanged(levels));
            }
            EngineEvent::LocalTrackPublished { kind, track_id } => {
                self.lock()
                    .publish_lanes
                    .get_mut(kind)
                    .on_publish_settled(&track_id, &self.engine);
            }
            EngineEvent::RemoteTrackSubscribed { participant, kind } => {
                self.on_remote_subscribed(participant, kind)
            }
        }
    }

    /// Drain engine events in arrival order on a background task
    ///
    /// The task ends when every sender is dropped.
    pub fn spawn_event_loop(
        self: &Arc<Self>,
        mut rx: mpsc::UnboundedReceiver<EngineEvent>,
    ) -> tokio::task::JoinHandle<()> {
        let session = Arc::clone(self);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                session.handle_event(event);
            }
            tracing::debug!(role = ?session.config.role, "Engine event stream closed");
        })
    }

    fn on_connection_state(&self, reported: ConnectionState) {
        let mut guard = self.lock();
        let core = &mut *guard;

        let Some(transition) = core.machine.apply(reported) else {
            return;
        };

        if let Some(runnable) = transition.lane_runnable() {
            core.set_all_runnable(runnable, &self.sinks, &self.engine);
        }

        tracing::info!(
            from = %transition.from,
            to = %transition.to,
            role = ?self.config.role,
            "Connection state changed"
        );

        self.emit(SessionEvent::ConnectionStateChanged {
            state: transition.to,
            role: self.config.role,
        });
    }

    fn on_user_published(&self, participant: ParticipantId, kind: MediaKind) {
        if !self.config.capabilities.subscribes() {
            tracing::trace!(participant = %participant, kind = %kind, "Ignoring remote publish");
            return;
        }
        if !MediaKind::REMOTE.contains(&kind) {
            tracing::warn!(participant = %participant, kind = %kind, "Unsupported remote media kind");
            return;
        }

        let mut guard = self.lock();
        let core = &mut *guard;

        core.participants.on_published(&participant, kind);

        let runnable = core.machine.is_connected();
        core.subscribe_lanes
            .entry((participant.clone(), kind))
            .or_insert_with(|| SubscribeLane::new(participant.clone(), kind, runnable));

        core.reevaluate_remote(&participant, kind, &self.sinks, &self.engine);
    }

    fn on_user_unpublished(&self, participant: ParticipantId, remaining: MediaFlags) {
        if !self.config.capabilities.subscribes() {
            return;
        }

        let mut guard = self.lock();
        let core = &mut *guard;

        let outcome = core.participants.on_unpublished(&participant, remaining);

        let kinds: &[MediaKind] = if outcome.departed {
            &MediaKind::REMOTE
        } else {
            &outcome.removed
        };
        for kind in kinds {
            core.stop_remote(&participant, *kind, &self.engine);
        }

        if outcome.departed {
            tracing::debug!(participant = %participant, "Remote participant gone");
        }
    }

    fn on_network_quality(&self, sample: NetworkSample) {
        if !self.config.capabilities.subscribes() {
            return;
        }

        let mut guard = self.lock();
        let core = &mut *guard;
        let participants = &core.participants;

        let summary = core
            .stats
            .ingest(&sample, |p| participants.is_publishing(p, MediaKind::Video));
        self.emit(SessionEvent::NetworkStatsChanged(summary));
    }

    fn on_remote_subscribed(&self, participant: ParticipantId, kind: MediaKind) {
        let mut guard = self.lock();

        match guard.subscribe_lanes.get_mut(&(participant.clone(), kind)) {
            Some(lane) => lane.on_subscribe_settled(&self.engine),
            None => {
                tracing::debug!(
                    participant = %participant,
                    kind = %kind,
                    "Subscribe settled for a removed lane, unsubscribing"
                );
                self.engine
                    .unsubscribe(&RemoteTrack::new(participant, kind));
            }
        }
    }
}

impl<E: RtcEngine> std::fmt::Debug for SessionAdapter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("SessionAdapter");
        debug.field("config", &self.config);
        // Sink and engine callbacks run with the lock held
        match self.core.try_lock() {
            Ok(core) => {
                debug.field("core", &*core);
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                debug.field("core", &*poisoned.into_inner());
            }
            Err(TryLockError::WouldBlock) => {
                debug.field("core", &format_args!("<locked>"));
            }
        }
        debug.field("left", &self.has_left()).finish()
    }
}

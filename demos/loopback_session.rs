//! Loopback session demo
//!
//! Run with: cargo run --example loopback_session
//!
//! Drives a session against an in-process engine that echoes every request
//! back as the event a real transport would raise: joining connects, publishes
//! settle, and two fake remote participants come and go.
//!
//! Set `RUST_LOG=rtc_lanes=debug` to watch lanes switch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use rtc_lanes::stats::RemoteVideoStats;
use rtc_lanes::{
    EngineConnectionState, EngineError, EngineEvent, EngineSetup, JoinCredentials, LocalTrack,
    MediaFlags, MediaKind, NetworkQuality, NetworkSample, ParticipantId, RemoteTrack, RenderSink,
    RtcEngine, SessionAdapter, SessionConfig, SessionEvent,
};

/// Engine that answers every call with the matching event
struct LoopbackEngine {
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl LoopbackEngine {
    fn raise(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }
}

impl RtcEngine for LoopbackEngine {
    fn configure(&self, setup: &EngineSetup) {
        println!(
            "configure: codec={:?} mode={:?} encryption={}",
            setup.codec,
            setup.mode,
            setup.encryption.as_str()
        );
    }

    async fn join(&self, credentials: &JoinCredentials) -> Result<(), EngineError> {
        println!("join: channel={} uid={}", credentials.channel, credentials.uid);
        self.raise(EngineEvent::ConnectionStateChanged(
            EngineConnectionState::Connecting,
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.raise(EngineEvent::ConnectionStateChanged(
            EngineConnectionState::Connected,
        ));
        Ok(())
    }

    async fn leave(&self) -> Result<(), EngineError> {
        println!("leave");
        self.raise(EngineEvent::ConnectionStateChanged(
            EngineConnectionState::Disconnected,
        ));
        Ok(())
    }

    fn publish(&self, track: &LocalTrack) {
        println!("publish: {} {}", track.kind, track.id);
        self.raise(EngineEvent::LocalTrackPublished {
            kind: track.kind,
            track_id: track.id.clone(),
        });
    }

    fn unpublish(&self, track: &LocalTrack) {
        println!("unpublish: {} {}", track.kind, track.id);
    }

    fn subscribe(&self, participant: &ParticipantId, kind: MediaKind) -> RemoteTrack {
        println!("subscribe: {}/{}", participant, kind);
        self.raise(EngineEvent::RemoteTrackSubscribed {
            participant: participant.clone(),
            kind,
        });
        RemoteTrack::new(participant.clone(), kind)
    }

    fn unsubscribe(&self, track: &RemoteTrack) {
        println!("unsubscribe: {}", track);
    }
}

/// Sink that just prints what it would draw
struct ConsoleSink(&'static str);

impl RenderSink for ConsoleSink {
    fn attach(&self, track: &RemoteTrack) {
        println!("[{}] drawing {}", self.0, track);
    }

    fn detach(&self, track: &RemoteTrack) {
        println!("[{}] cleared {}", self.0, track);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rtc_lanes=info".parse()?),
        )
        .init();

    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let engine = LoopbackEngine {
        events: engine_tx.clone(),
    };

    let config = SessionConfig::default().encryption("aes-128-gcm", "demo-key");
    let session = Arc::new(SessionAdapter::new(engine, config));
    session
        .sinks()
        .assign(ParticipantId::from("2002"), Arc::new(ConsoleSink("main")));

    let mut events = session.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::ConnectionStateChanged { state, role } => {
                    println!("event: connection {} ({:?})", state, role)
                }
                SessionEvent::NetworkStatsChanged(summary) => println!(
                    "event: rtt={}ms tx_loss={:.3} rx_loss={:.3} delay={:.0}ms",
                    summary.rtt_ms,
                    summary.tx_video_loss_ratio,
                    summary.rx_video_loss_ratio,
                    summary.end_to_end_delay_ms
                ),
                SessionEvent::AudioLevelsChanged(levels) => {
                    println!("event: audio levels {:?}", levels)
                }
                SessionEvent::Error(report) => println!("event: error {}", report),
            }
        }
    });

    let event_loop = session.spawn_event_loop(engine_rx);

    session
        .join(&JoinCredentials::new("demo-app", "room-1", "token", 1001))
        .await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    session.bind_local_source(LocalTrack::video("camera-0"))?;
    session.bind_local_source(LocalTrack::audio("mic-0"))?;
    session.set_local_mute(MediaKind::Video, false)?;
    session.set_local_mute(MediaKind::Audio, false)?;

    // Screen share has no source yet
    if let Err(e) = session.set_local_mute(MediaKind::Screen, false) {
        println!("screen share: {}", e);
    }

    // Remote participants show up
    let host = ParticipantId::from("2002");
    let guest = ParticipantId::from("3003");
    session.set_remote_mute(&guest, MediaKind::Audio, true);
    for (participant, kind) in [
        (&host, MediaKind::Video),
        (&host, MediaKind::Audio),
        (&guest, MediaKind::Audio),
    ] {
        engine_tx.send(EngineEvent::UserPublished {
            participant: participant.clone(),
            kind,
        })?;
    }

    let mut sample = NetworkSample {
        uplink: NetworkQuality::Good,
        downlink: NetworkQuality::Excellent,
        rtt_ms: 38,
        ..Default::default()
    };
    sample.local_video.sent_packets = 1200;
    sample.local_video.sent_packets_lost = 6;
    sample.remote_video.insert(
        host.clone(),
        RemoteVideoStats {
            received_packets: 900,
            received_packets_lost: 9,
            end_to_end_delay_ms: 140,
        },
    );
    engine_tx.send(EngineEvent::NetworkQuality(sample))?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The host stops their camera, then leaves entirely
    engine_tx.send(EngineEvent::UserUnpublished {
        participant: host.clone(),
        remaining: MediaFlags::new(false, true),
    })?;
    engine_tx.send(EngineEvent::UserUnpublished {
        participant: host,
        remaining: MediaFlags::default(),
    })?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    session.leave().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("final state: {}", session.connection_state());
    println!("remote participants: {:?}", session.remote_participants());

    // The engine inside the session keeps the event channel open
    event_loop.abort();

    Ok(())
}

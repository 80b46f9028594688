//! Network quality aggregation
//!
//! The engine reports raw counters once per tick. The aggregator folds them
//! into a [`NetworkQualitySummary`] that never contains NaN: whenever a ratio
//! or mean has no denominator for this tick, the previous value is kept.

use std::collections::HashMap;

use crate::media::ParticipantId;

/// Quality grade reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkQuality {
    #[default]
    Unknown,
    Excellent,
    Good,
    Poor,
    Bad,
    VeryBad,
    Down,
}

impl NetworkQuality {
    /// Map the engine's 0..=6 grade; anything else is `Unknown`
    pub fn from_grade(grade: u8) -> Self {
        match grade {
            1 => NetworkQuality::Excellent,
            2 => NetworkQuality::Good,
            3 => NetworkQuality::Poor,
            4 => NetworkQuality::Bad,
            5 => NetworkQuality::VeryBad,
            6 => NetworkQuality::Down,
            _ => NetworkQuality::Unknown,
        }
    }

    /// Numeric grade, 0 (unknown) to 6 (down)
    pub fn grade(&self) -> u8 {
        match self {
            NetworkQuality::Unknown => 0,
            NetworkQuality::Excellent => 1,
            NetworkQuality::Good => 2,
            NetworkQuality::Poor => 3,
            NetworkQuality::Bad => 4,
            NetworkQuality::VeryBad => 5,
            NetworkQuality::Down => 6,
        }
    }
}

/// Send counters of our own video track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalVideoStats {
    pub sent_packets: u64,
    pub sent_packets_lost: u64,
}

/// Receive counters of one remote participant's video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoteVideoStats {
    pub received_packets: u64,
    pub received_packets_lost: u64,
    pub end_to_end_delay_ms: u32,
}

/// One raw sample, as delivered by the engine each tick
#[derive(Debug, Clone, Default)]
pub struct NetworkSample {
    pub uplink: NetworkQuality,
    pub downlink: NetworkQuality,
    pub rtt_ms: u32,
    pub local_video: LocalVideoStats,
    pub remote_video: HashMap<ParticipantId, RemoteVideoStats>,
}

/// Rolling network quality summary
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NetworkQualitySummary {
    pub uplink_quality: NetworkQuality,
    pub downlink_quality: NetworkQuality,
    pub rtt_ms: u32,
    /// Lost / sent for our video, 0.0..=1.0
    pub tx_video_loss_ratio: f64,
    /// Mean receive loss across publishing participants, 0.0..=1.0
    pub rx_video_loss_ratio: f64,
    /// Mean end-to-end delay across publishing participants
    pub end_to_end_delay_ms: f64,
}

/// Folds samples into a [`NetworkQualitySummary`]
#[derive(Debug, Default)]
pub struct NetworkQualityAggregator {
    summary: NetworkQualitySummary,
    ticks: u64,
}

impl NetworkQualityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest summary
    pub fn summary(&self) -> &NetworkQualitySummary {
        &self.summary
    }

    /// Number of samples folded so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Fold one sample
    ///
    /// Only remote entries for which `is_publishing` holds take part in the
    /// receive-side means.
    pub fn ingest<F>(&mut self, sample: &NetworkSample, is_publishing: F) -> NetworkQualitySummary
    where
        F: Fn(&ParticipantId) -> bool,
    {
        self.ticks += 1;

        let summary = &mut self.summary;
        summary.uplink_quality = sample.uplink;
        summary.downlink_quality = sample.downlink;
        summary.rtt_ms = sample.rtt_ms;

        let local = sample.local_video;
        if local.sent_packets > 0 {
            summary.tx_video_loss_ratio =
                local.sent_packets_lost as f64 / local.sent_packets as f64;
        }

        let publishing: Vec<&RemoteVideoStats> = sample
            .remote_video
            .iter()
            .filter(|(participant, _)| is_publishing(participant))
            .map(|(_, stats)| stats)
            .collect();

        if !publishing.is_empty() {
            let delay_total: f64 = publishing
                .iter()
                .map(|s| s.end_to_end_delay_ms as f64)
                .sum();
            summary.end_to_end_delay_ms = delay_total / publishing.len() as f64;

            let ratios: Vec<f64> = publishing
                .iter()
                .filter(|s| s.received_packets > 0)
                .map(|s| s.received_packets_lost as f64 / s.received_packets as f64)
                .collect();
            if !ratios.is_empty() {
                summary.rx_video_loss_ratio = ratios.iter().sum::<f64>() / ratios.len() as f64;
            }
        }

        tracing::trace!(
            tick = self.ticks,
            rtt_ms = summary.rtt_ms,
            tx_loss = summary.tx_video_loss_ratio,
            rx_loss = summary.rx_video_loss_ratio,
            delay_ms = summary.end_to_end_delay_ms,
            "Network quality updated"
        );

        *summary
    }
}

//! Network quality statistics

pub mod quality;

pub use quality::{
    LocalVideoStats, NetworkQuality, NetworkQualityAggregator, NetworkQualitySummary,
    NetworkSample, RemoteVideoStats,
};

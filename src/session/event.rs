//! Notifications emitted toward the UI layer

use std::collections::HashMap;

use crate::error::ErrorReport;
use crate::media::ParticipantId;
use crate::stats::NetworkQualitySummary;

use super::config::ChannelRole;
use super::state::ConnectionState;

/// Events published on the session's broadcast channel
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The connection state machine moved
    ConnectionStateChanged {
        state: ConnectionState,
        role: ChannelRole,
    },

    /// A network quality tick was folded
    NetworkStatsChanged(NetworkQualitySummary),

    /// Latest audio level per remote participant
    AudioLevelsChanged(HashMap<ParticipantId, u8>),

    /// A non-fatal failure
    Error(ErrorReport),
}

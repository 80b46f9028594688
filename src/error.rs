//! Error types
//!
//! Engine failures are carried as opaque values so callers see exactly what the
//! transport reported. Local precondition failures are lane errors. Non-fatal
//! failures that must not abort the session are wrapped in an [`ErrorReport`]
//! and pushed through the session's event channel.

use crate::media::MediaKind;

/// Result type for session operations that can only fail locally
pub type Result<T> = std::result::Result<T, LaneError>;

/// Failure reported by the transport engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    /// Engine-specific error code
    pub code: i32,
    /// Human readable reason
    pub message: String,
}

impl EngineError {
    /// Create a new engine error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Engine error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for EngineError {}

/// Error type for lane operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaneError {
    /// No local track source is bound to the lane
    NoLocalSource(MediaKind),
    /// A source of one kind was offered to a lane of another kind
    KindMismatch {
        lane: MediaKind,
        source: MediaKind,
    },
}

impl std::fmt::Display for LaneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaneError::NoLocalSource(kind) => write!(f, "No local {} source bound", kind),
            LaneError::KindMismatch { lane, source } => {
                write!(f, "Cannot bind {} source to {} lane", source, lane)
            }
        }
    }
}

impl std::error::Error for LaneError {}

/// Identifying codes for non-fatal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The engine failed to leave the channel
    ClientLeaveChannelFail,
}

impl ErrorCode {
    /// Stable string form used in logs and upstream reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ClientLeaveChannelFail => "RTC_ERR_CLIENT_LEAVE_CHANNEL_FAIL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal error delivered through the session event channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// What failed
    pub code: ErrorCode,
    /// The underlying engine failure
    pub cause: EngineError,
}

impl ErrorReport {
    pub fn new(code: ErrorCode, cause: EngineError) -> Self {
        Self { code, cause }
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.cause)
    }
}

impl std::error::Error for ErrorReport {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_report_display() {
        let report = ErrorReport::new(
            ErrorCode::ClientLeaveChannelFail,
            EngineError::new(17, "socket closed"),
        );

        assert_eq!(
            report.to_string(),
            "RTC_ERR_CLIENT_LEAVE_CHANNEL_FAIL: Engine error 17: socket closed"
        );
        assert!(std::error::Error::source(&report).is_some());
    }

    #[test]
    fn test_lane_error_display() {
        let err = LaneError::NoLocalSource(MediaKind::Screen);
        assert_eq!(err.to_string(), "No local screen source bound");
    }
}

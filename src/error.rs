//! Error types for stop sets, directions providers and route sequencing

use std::time::Duration;

use thiserror::Error;

use crate::types::StopId;

#[derive(Debug, Error, PartialEq)]
pub enum StopSetError {
    #[error("Stop {id} has missing or invalid coordinates")]
    InvalidStop { id: StopId },

    #[error("Stop id {id} appears more than once")]
    DuplicateStopId { id: StopId },

    #[error("New order is not a permutation of the stop ids: {reason}")]
    PermutationMismatch { reason: String },
}

/// Coarse classification of a directions failure, for caller retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionsErrorKind {
    Transport,
    Rejected,
    Timeout,
}

#[derive(Debug, Error)]
pub enum DirectionsError {
    /// Request never reached the provider or the provider was unreachable
    #[error("Directions transport failure: {0}")]
    Transport(String),

    /// Provider answered with a non-OK status
    #[error("Directions provider rejected request: {status} {message}")]
    Rejected { status: String, message: String },

    #[error("Directions request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Directions request cancelled")]
    Cancelled,
}

impl DirectionsError {
    pub fn rejected(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> DirectionsErrorKind {
        match self {
            DirectionsError::Transport(_) | DirectionsError::Cancelled => {
                DirectionsErrorKind::Transport
            }
            DirectionsError::Rejected { .. } => DirectionsErrorKind::Rejected,
            DirectionsError::Timeout(_) => DirectionsErrorKind::Timeout,
        }
    }

    /// Rejections need different input; everything else may succeed on retry
    pub fn is_retryable(&self) -> bool {
        self.kind() != DirectionsErrorKind::Rejected
    }

    /// Classify an HTTP client error; an unparseable body counts as a rejection
    pub fn from_request(e: reqwest::Error, timeout: Duration) -> Self {
        // The URL may carry an API key
        let e = e.without_url();
        if e.is_timeout() {
            DirectionsError::Timeout(timeout)
        } else if e.is_decode() {
            DirectionsError::rejected("INVALID_RESPONSE", e.to_string())
        } else {
            DirectionsError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Directions(#[from] DirectionsError),

    /// Provider permutation disagrees with the stop set
    #[error("Waypoint order does not match the stop set: {0}")]
    Reconciliation(String),

    #[error(transparent)]
    StopSet(#[from] StopSetError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct() {
        let transport = DirectionsError::Transport("connection refused".into());
        let rejected = DirectionsError::rejected("ZERO_RESULTS", "");
        let timeout = DirectionsError::Timeout(Duration::from_secs(15));

        assert_eq!(transport.kind(), DirectionsErrorKind::Transport);
        assert_eq!(rejected.kind(), DirectionsErrorKind::Rejected);
        assert_eq!(timeout.kind(), DirectionsErrorKind::Timeout);
    }

    #[test]
    fn test_cancelled_counts_as_transport() {
        let cancelled = DirectionsError::Cancelled;
        assert_eq!(cancelled.kind(), DirectionsErrorKind::Transport);
        assert!(cancelled.is_retryable());
    }

    #[test]
    fn test_rejected_is_not_retryable() {
        assert!(!DirectionsError::rejected("NOT_FOUND", "origin").is_retryable());
        assert!(DirectionsError::Timeout(Duration::from_secs(15)).is_retryable());
        assert!(DirectionsError::Transport("dns".into()).is_retryable());
    }

    #[test]
    fn test_timeout_message_keeps_sub_second_precision() {
        let timeout = DirectionsError::Timeout(Duration::from_millis(250));
        assert_eq!(timeout.to_string(), "Directions request timed out after 250ms");
    }

    #[test]
    fn test_route_error_wraps_directions() {
        let err: RouteError = DirectionsError::rejected("ZERO_RESULTS", "no route").into();
        assert!(matches!(
            err,
            RouteError::Directions(DirectionsError::Rejected { .. })
        ));
        assert!(err.to_string().contains("ZERO_RESULTS"));
    }
}

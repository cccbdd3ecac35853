//! Error taxonomy for the quiz session engine.
//!
//! Three families are kept apart so callers can react to each differently:
//! [`ValidationError`] for bad generation requests (state unchanged),
//! [`ServiceError`] for collaborator failures (state moves to `Error`), and
//! the protocol/index variants of [`EngineError`] for caller bugs.

use std::fmt;

use thiserror::Error;

use crate::session::SessionState;

/// A generation request that was rejected before reaching the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The topic was empty or whitespace.
    #[error("topic must not be empty")]
    EmptyTopic,

    /// The requested question count is outside the accepted range.
    #[error("question count must be between 1 and {max}, got {requested}")]
    QuestionCount { requested: u32, max: u32 },

    /// The requested time limit exceeds the configured maximum.
    #[error("time limit must be at most {max} minutes, got {requested}")]
    TimeLimit { requested: u32, max: u32 },
}

/// Failures reported by the generation or scoring collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service answered with an error status.
    #[error("service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A transport-level failure occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered, but the payload broke the collaborator contract.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    /// Returns `true` if retrying the same call may plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Timeout(_) | ServiceError::Network(_) => true,
            ServiceError::Api { status, .. } => *status == 429 || *status >= 500,
            ServiceError::MalformedResponse(_) => false,
        }
    }
}

/// The collaborator call that put the session into the `Error` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailedOperation {
    Generation,
    Scoring,
}

impl fmt::Display for FailedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedOperation::Generation => write!(f, "quiz generation"),
            FailedOperation::Scoring => write!(f, "quiz scoring"),
        }
    }
}

/// Controller operations, used to report protocol violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RequestGeneration,
    SelectAnswer,
    Navigate,
    Submit,
    BeginReview,
    ReviewNavigate,
    BackToResults,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::RequestGeneration => "request_generation",
            Operation::SelectAnswer => "select_answer",
            Operation::Navigate => "navigate",
            Operation::Submit => "submit",
            Operation::BeginReview => "begin_review",
            Operation::ReviewNavigate => "review navigation",
            Operation::BackToResults => "back_to_results",
        };
        f.write_str(name)
    }
}

/// Errors returned by [`SessionController`](crate::session::SessionController).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid quiz request: {0}")]
    Validation(#[from] ValidationError),

    /// The caller invoked an operation that is illegal in the current state.
    #[error("`{operation}` is not allowed in state {state}")]
    ProtocolViolation {
        operation: Operation,
        state: SessionState,
    },

    #[error("question position {position} is out of range (quiz has {len} questions)")]
    QuestionOutOfRange { position: usize, len: usize },

    #[error("option {option} is out of range for question {position} ({len} options)")]
    OptionOutOfRange {
        position: usize,
        option: usize,
        len: usize,
    },

    /// A collaborator call failed; the session is now in the `Error` state.
    #[error("{operation} failed: {source}")]
    Service {
        operation: FailedOperation,
        #[source]
        source: ServiceError,
    },
}

impl EngineError {
    /// Returns `true` for errors that indicate a bug in the caller.
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            EngineError::ProtocolViolation { .. }
                | EngineError::QuestionOutOfRange { .. }
                | EngineError::OptionOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ServiceError::Timeout(30).is_transient());
        assert!(ServiceError::Network("reset".into()).is_transient());
        assert!(ServiceError::Api {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(!ServiceError::Api {
            status: 400,
            message: "bad".into()
        }
        .is_transient());
        assert!(!ServiceError::MalformedResponse("no questions".into()).is_transient());
    }

    #[test]
    fn protocol_violation_message_names_operation_and_state() {
        let err = EngineError::ProtocolViolation {
            operation: Operation::SelectAnswer,
            state: SessionState::Scored,
        };
        assert_eq!(
            err.to_string(),
            "`select_answer` is not allowed in state scored"
        );
        assert!(err.is_caller_bug());
    }

    #[test]
    fn service_error_message_names_operation() {
        let err = EngineError::Service {
            operation: FailedOperation::Scoring,
            source: ServiceError::Timeout(5),
        };
        assert_eq!(err.to_string(), "quiz scoring failed: request timed out after 5s");
        assert!(!err.is_caller_bug());
    }
}

use ulid::Ulid;

use crate::model::BookingStatus;

#[derive(Debug, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed input: bad interval, fractional nights, negative rate,
    /// past check-in, oversized field.
    Validation(&'static str),
    /// Overlapping active booking, room out of service, or guard timeout.
    Conflict(&'static str),
    NotFound(Ulid),
    /// Actor lacks the role or ownership for the operation.
    Forbidden(&'static str),
    /// Requested status change is not legal from the current state.
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    /// Persistence failure — fatal, distinct from the domain taxonomy.
    /// Callers must not assume any state change occurred.
    Wal(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(msg) => write!(f, "validation failed: {msg}"),
            EngineError::Conflict(msg) => write!(f, "conflict: {msg}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::Forbidden(msg) => write!(f, "forbidden: {msg}"),
            EngineError::InvalidTransition { from, to } => {
                write!(f, "invalid transition: {} -> {}", from.as_str(), to.as_str())
            }
            EngineError::Wal(e) => write!(f, "WAL error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

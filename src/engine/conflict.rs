use ulid::Ulid;

use crate::model::{Calendar, Ms, Span};

use super::EngineError;

pub(crate) fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as Ms
}

/// Validate raw interval endpoints before a `Span` is ever constructed.
pub(crate) fn validate_interval(check_in: Ms, check_out: Ms) -> Result<Span, EngineError> {
    use crate::limits::*;
    if check_in >= check_out {
        return Err(EngineError::Validation("check-out must be after check-in"));
    }
    if check_in < MIN_VALID_TIMESTAMP_MS || check_out > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::Validation("timestamp out of range"));
    }
    let span = Span::new(check_in, check_out);
    if span.duration_ms() > MAX_SPAN_DURATION_MS {
        return Err(EngineError::Validation("stay too long"));
    }
    Ok(span)
}

/// The overlap test: `[a, b)` conflicts with `[c, d)` iff `a < d && c < b`.
/// `exclude` lets an edit skip the booking being moved.
pub(crate) fn check_no_conflict(
    calendar: &Calendar,
    span: &Span,
    exclude: Option<Ulid>,
) -> Result<(), EngineError> {
    if calendar.conflicts(span, exclude).is_empty() {
        Ok(())
    } else {
        Err(EngineError::Conflict("room not available for the requested dates"))
    }
}

use crate::model::{Actor, Booking, BookingStatus};

use super::EngineError;

use BookingStatus::*;

/// Is `from -> to` a legal status change at all, regardless of who asks?
pub(crate) fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) | (Confirmed, Completed)
    )
}

/// Who may drive a booking into `to`?
///
/// confirm/complete: administrator. cancel: holder or administrator.
/// (The auto-completion sweep runs as the system actor, which is an admin.)
fn transition_permitted(to: BookingStatus, actor: &Actor, booking: &Booking) -> bool {
    if actor.role.is_admin() {
        return true;
    }
    match to {
        Cancelled => actor.id == booking.holder_id,
        _ => false,
    }
}

/// Full transition check: legality first, then authority. A cancelled
/// booking confirmed by an admin is an InvalidTransition, not Forbidden.
pub(crate) fn check_transition(
    booking: &Booking,
    to: BookingStatus,
    actor: &Actor,
) -> Result<(), EngineError> {
    if !can_transition(booking.status, to) {
        return Err(EngineError::InvalidTransition {
            from: booking.status,
            to,
        });
    }
    if !transition_permitted(to, actor, booking) {
        return Err(EngineError::Forbidden("role not permitted for this transition"));
    }
    Ok(())
}

/// May `actor` edit this booking's fields?
/// Holder: only while pending. Administrator: any non-terminal state.
pub(crate) fn check_edit(booking: &Booking, actor: &Actor) -> Result<(), EngineError> {
    if actor.role.is_admin() {
        if booking.status.is_terminal() {
            return Err(EngineError::InvalidTransition {
                from: booking.status,
                to: booking.status,
            });
        }
        return Ok(());
    }
    if actor.id != booking.holder_id {
        return Err(EngineError::Forbidden("not the booking holder"));
    }
    if booking.status != Pending {
        return Err(EngineError::Forbidden("holders may only edit pending bookings"));
    }
    Ok(())
}

use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::availability::free_spans;
use super::{Engine, EngineError};

impl Engine {
    /// Fetch one booking. Clients see only their own; a foreign id reads
    /// the same as a missing one.
    pub async fn get_booking(&self, id: Ulid, actor: &Actor) -> Result<Booking, EngineError> {
        let room_id = self
            .store
            .room_for_booking(&id)
            .ok_or(EngineError::NotFound(id))?;
        let rs = self
            .store
            .get_room(&room_id)
            .ok_or(EngineError::NotFound(id))?;
        let guard = rs.read().await;
        let booking = guard.bookings.get(&id).ok_or(EngineError::NotFound(id))?;
        if !actor.role.is_admin() && booking.holder_id != actor.id {
            return Err(EngineError::NotFound(id));
        }
        Ok(booking.clone())
    }

    /// List bookings matching the filter, newest first. Clients are always
    /// scoped to their own bookings regardless of the requested filter.
    pub async fn list_bookings(
        &self,
        mut filter: BookingFilter,
        actor: &Actor,
    ) -> Result<Vec<Booking>, EngineError> {
        if !actor.role.is_admin() {
            filter.holder_id = Some(actor.id);
        }

        let room_ids = match filter.room_id {
            Some(room_id) => {
                if !self.store.contains_room(&room_id) {
                    return Err(EngineError::NotFound(room_id));
                }
                vec![room_id]
            }
            None => self.store.room_ids(),
        };

        let mut out: Vec<Booking> = Vec::new();
        for room_id in room_ids {
            let Some(rs) = self.store.get_room(&room_id) else {
                continue;
            };
            let guard = rs.read().await;
            for b in guard.bookings.values() {
                if let Some(status) = filter.status
                    && b.status != status {
                        continue;
                    }
                if let Some(holder) = filter.holder_id
                    && b.holder_id != holder {
                        continue;
                    }
                out.push(b.clone());
            }
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        out.truncate(MAX_LIST_RESULTS);
        Ok(out)
    }

    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let mut out = Vec::new();
        for room_id in self.store.room_ids() {
            let Some(rs) = self.store.get_room(&room_id) else {
                continue;
            };
            out.push(rs.read().await.info());
        }
        out.sort_by_key(|r| r.id);
        out
    }

    /// Free spans of a room's calendar inside the query window.
    pub async fn room_availability(
        &self,
        room_id: Ulid,
        start: Ms,
        end: Ms,
    ) -> Result<Vec<Span>, EngineError> {
        if start >= end {
            return Err(EngineError::Validation("window end must be after start"));
        }
        if start < MIN_VALID_TIMESTAMP_MS || end > MAX_VALID_TIMESTAMP_MS {
            return Err(EngineError::Validation("timestamp out of range"));
        }
        let query = Span::new(start, end);
        if query.duration_ms() > MAX_QUERY_WINDOW_MS {
            return Err(EngineError::Validation("query window too large"));
        }
        let rs = self
            .store
            .get_room(&room_id)
            .ok_or(EngineError::NotFound(room_id))?;
        let guard = rs.read().await;
        Ok(free_spans(&guard.calendar, &query))
    }
}

use tokio::sync::oneshot;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::conflict::{check_no_conflict, now_ms, validate_interval};
use super::lifecycle::{check_edit, check_transition};
use super::pricing::price_cents;
use super::{Engine, EngineError, WalCommand};

fn require_admin(actor: &Actor) -> Result<(), EngineError> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(EngineError::Forbidden("administrator role required"))
    }
}

impl Engine {
    // ── Room administration ──────────────────────────────────

    pub async fn create_room(
        &self,
        id: Ulid,
        actor: &Actor,
        number: Option<String>,
        rate_cents: i64,
        available: bool,
    ) -> Result<(), EngineError> {
        require_admin(actor)?;
        if self.store.room_count() >= MAX_ROOMS {
            return Err(EngineError::Validation("too many rooms"));
        }
        if let Some(ref n) = number
            && n.len() > MAX_NAME_LEN {
                return Err(EngineError::Validation("room number too long"));
            }
        if !(0..=MAX_RATE_CENTS).contains(&rate_cents) {
            return Err(EngineError::Validation("nightly rate out of range"));
        }
        if self.store.contains_room(&id) {
            return Err(EngineError::Conflict("room already exists"));
        }

        let _gate = self.compaction_gate.read().await;
        let event = Event::RoomCreated {
            id,
            number: number.clone(),
            rate_cents,
            available,
        };
        self.wal_append(&event).await?;
        self.store.new_room(id, number, rate_cents, available);
        Ok(())
    }

    /// Partial update: `None` fields keep their current value. Rate changes
    /// never reprice existing bookings; the amount was fixed at creation.
    pub async fn update_room(
        &self,
        id: Ulid,
        actor: &Actor,
        number: Option<Option<String>>,
        rate_cents: Option<i64>,
        available: Option<bool>,
    ) -> Result<RoomInfo, EngineError> {
        require_admin(actor)?;
        if let Some(Some(ref n)) = number
            && n.len() > MAX_NAME_LEN {
                return Err(EngineError::Validation("room number too long"));
            }
        if let Some(rate) = rate_cents
            && !(0..=MAX_RATE_CENTS).contains(&rate) {
                return Err(EngineError::Validation("nightly rate out of range"));
            }

        let _gate = self.compaction_gate.read().await;
        let mut guard = self.lock_room(&id).await?;
        let event = Event::RoomUpdated {
            id,
            number: number.unwrap_or_else(|| guard.number.clone()),
            rate_cents: rate_cents.unwrap_or(guard.rate_cents),
            available: available.unwrap_or(guard.available),
        };
        self.persist_and_apply(&mut guard, &event).await?;
        Ok(guard.info())
    }

    /// Rooms with any active booking cannot be removed; cancel or complete
    /// the bookings first.
    pub async fn delete_room(&self, id: Ulid, actor: &Actor) -> Result<(), EngineError> {
        require_admin(actor)?;
        let _gate = self.compaction_gate.read().await;
        let guard = self.lock_room(&id).await?;
        if !guard.calendar.is_empty() {
            return Err(EngineError::Conflict("room has active bookings"));
        }

        self.wal_append(&Event::RoomDeleted { id }).await?;
        for booking_id in guard.bookings.keys() {
            self.store.unmap_booking(booking_id);
        }
        drop(guard);
        self.store.remove_room(&id);
        Ok(())
    }

    // ── User registry ────────────────────────────────────────

    pub async fn add_user(
        &self,
        id: Ulid,
        actor: &Actor,
        name: Option<String>,
        role: Role,
    ) -> Result<(), EngineError> {
        require_admin(actor)?;
        if self.store.user_count() >= MAX_USERS {
            return Err(EngineError::Validation("too many users"));
        }
        if let Some(ref n) = name
            && n.len() > MAX_NAME_LEN {
                return Err(EngineError::Validation("user name too long"));
            }
        if self.store.contains_user(&id) {
            return Err(EngineError::Conflict("user already exists"));
        }

        let _gate = self.compaction_gate.read().await;
        let event = Event::UserAdded {
            id,
            name: name.clone(),
            role,
        };
        self.wal_append(&event).await?;
        self.store.add_user(id, name, role);
        Ok(())
    }

    pub async fn set_user_role(
        &self,
        id: Ulid,
        actor: &Actor,
        role: Role,
    ) -> Result<(), EngineError> {
        require_admin(actor)?;
        if !self.store.contains_user(&id) {
            return Err(EngineError::NotFound(id));
        }
        let _gate = self.compaction_gate.read().await;
        self.wal_append(&Event::UserRoleChanged { id, role }).await?;
        self.store.set_user_role(&id, role);
        Ok(())
    }

    // ── Booking lifecycle ────────────────────────────────────

    /// Atomic check-and-reserve. Validation that needs no room state runs
    /// before the guard is taken; the conflict check, pricing against the
    /// room's current rate, and the insert all happen inside the critical
    /// section, so no concurrent writer can slip between check and apply.
    pub async fn create_booking(
        &self,
        id: Ulid,
        room_id: Ulid,
        actor: &Actor,
        check_in: Ms,
        check_out: Ms,
        payment_mode: Option<String>,
    ) -> Result<Booking, EngineError> {
        if let Some(ref pm) = payment_mode
            && pm.len() > MAX_PAYMENT_MODE_LEN {
                return Err(EngineError::Validation("payment mode too long"));
            }
        let span = validate_interval(check_in, check_out)?;
        let now = now_ms();
        if check_in < now {
            return Err(EngineError::Validation("check-in must not be in the past"));
        }

        let _gate = self.compaction_gate.read().await;
        let mut guard = self.lock_room(&room_id).await?;
        // Ids come from the caller; reusing one would overwrite the canonical
        // record while leaving its old calendar slot behind.
        if guard.bookings.contains_key(&id) || self.store.room_for_booking(&id).is_some() {
            return Err(EngineError::Conflict("booking id already in use"));
        }
        if !guard.available {
            return Err(EngineError::Conflict("room is not open for booking"));
        }
        if guard.bookings.len() >= MAX_BOOKINGS_PER_ROOM {
            return Err(EngineError::Validation("too many bookings for room"));
        }
        check_no_conflict(&guard.calendar, &span, None)?;
        let amount_cents = price_cents(guard.rate_cents, &span)?;

        let event = Event::BookingCreated {
            id,
            room_id,
            holder_id: actor.id,
            span,
            amount_cents,
            payment_mode,
            created_at: now,
        };
        self.persist_and_apply(&mut guard, &event).await?;
        Ok(guard.bookings[&id].clone())
    }

    /// Change dates or payment mode. New dates re-run the conflict check
    /// with the booking itself excluded and reprice at the room's current
    /// rate. An empty patch is a no-op returning the current record.
    pub async fn edit_booking(
        &self,
        id: Ulid,
        actor: &Actor,
        patch: BookingPatch,
    ) -> Result<Booking, EngineError> {
        if let Some(ref pm) = patch.payment_mode
            && pm.len() > MAX_PAYMENT_MODE_LEN {
                return Err(EngineError::Validation("payment mode too long"));
            }

        let _gate = self.compaction_gate.read().await;
        let (room_id, mut guard) = self.resolve_booking_write(&id).await?;
        let booking = guard
            .bookings
            .get(&id)
            .ok_or(EngineError::NotFound(id))?
            .clone();
        check_edit(&booking, actor)?;
        if patch.is_empty() {
            return Ok(booking);
        }

        let span = match (patch.check_in, patch.check_out) {
            (None, None) => booking.span,
            (ci, co) => {
                let s = validate_interval(
                    ci.unwrap_or(booking.span.start),
                    co.unwrap_or(booking.span.end),
                )?;
                check_no_conflict(&guard.calendar, &s, Some(id))?;
                s
            }
        };
        let amount_cents = if span == booking.span {
            booking.amount_cents
        } else {
            price_cents(guard.rate_cents, &span)?
        };

        let event = Event::BookingEdited {
            id,
            room_id,
            span,
            amount_cents,
            payment_mode: patch.payment_mode.or(booking.payment_mode),
        };
        self.persist_and_apply(&mut guard, &event).await?;
        Ok(guard.bookings[&id].clone())
    }

    pub async fn confirm_booking(&self, id: Ulid, actor: &Actor) -> Result<Booking, EngineError> {
        self.transition_booking(id, BookingStatus::Confirmed, actor)
            .await
    }

    /// Cancelling frees the calendar slot in the same critical section, so
    /// the dates are reservable again the moment this returns.
    pub async fn cancel_booking(&self, id: Ulid, actor: &Actor) -> Result<Booking, EngineError> {
        self.transition_booking(id, BookingStatus::Cancelled, actor)
            .await
    }

    pub async fn complete_booking(&self, id: Ulid, actor: &Actor) -> Result<Booking, EngineError> {
        self.transition_booking(id, BookingStatus::Completed, actor)
            .await
    }

    async fn transition_booking(
        &self,
        id: Ulid,
        to: BookingStatus,
        actor: &Actor,
    ) -> Result<Booking, EngineError> {
        let _gate = self.compaction_gate.read().await;
        let (room_id, mut guard) = self.resolve_booking_write(&id).await?;
        let booking = guard
            .bookings
            .get(&id)
            .ok_or(EngineError::NotFound(id))?
            .clone();
        check_transition(&booking, to, actor)?;

        let event = match to {
            BookingStatus::Confirmed => Event::BookingConfirmed { id, room_id },
            BookingStatus::Cancelled => Event::BookingCancelled { id, room_id },
            BookingStatus::Completed => Event::BookingCompleted { id, room_id },
            BookingStatus::Pending => {
                return Err(EngineError::InvalidTransition {
                    from: booking.status,
                    to,
                })
            }
        };
        self.persist_and_apply(&mut guard, &event).await?;
        Ok(guard.bookings[&id].clone())
    }

    /// Hard removal of a booking record, admin only. Unlike cancellation
    /// this erases the record entirely.
    pub async fn delete_booking(&self, id: Ulid, actor: &Actor) -> Result<(), EngineError> {
        require_admin(actor)?;
        let _gate = self.compaction_gate.read().await;
        let (room_id, mut guard) = self.resolve_booking_write(&id).await?;
        if !guard.bookings.contains_key(&id) {
            return Err(EngineError::NotFound(id));
        }
        self.persist_and_apply(&mut guard, &Event::BookingDeleted { id, room_id })
            .await
    }

    // ── Maintenance ──────────────────────────────────────────

    /// Confirmed bookings whose stay has ended, due for auto-completion.
    /// Rooms under contention are skipped and picked up on the next sweep.
    pub async fn collect_due_completions(&self, now: Ms) -> Vec<Ulid> {
        let mut due = Vec::new();
        for room_id in self.store.room_ids() {
            let Some(rs) = self.store.get_room(&room_id) else {
                continue;
            };
            let Ok(guard) = rs.try_read() else { continue };
            for b in guard.bookings.values() {
                if b.status == BookingStatus::Confirmed && b.span.end <= now {
                    due.push(b.id);
                }
            }
        }
        due
    }

    /// Rewrite the WAL as a minimal snapshot: users, rooms, then each live
    /// booking as a create plus its status transition.
    ///
    /// Holds the compaction gate exclusive from snapshot to swap. Without it
    /// a write landing between the snapshot of its room and the rewrite would
    /// be in the old log but not the new one, and lost on restart.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        let _gate = self.compaction_gate.write().await;
        let mut events: Vec<Event> = Vec::new();
        for (id, entry) in self.store.user_entries() {
            events.push(Event::UserAdded {
                id,
                name: entry.name,
                role: entry.role,
            });
        }
        for room_id in self.store.room_ids() {
            let Some(rs) = self.store.get_room(&room_id) else {
                continue;
            };
            let guard = rs.read().await;
            events.push(Event::RoomCreated {
                id: guard.id,
                number: guard.number.clone(),
                rate_cents: guard.rate_cents,
                available: guard.available,
            });
            let mut bookings: Vec<&Booking> = guard.bookings.values().collect();
            bookings.sort_by_key(|b| b.created_at);
            for b in bookings {
                events.push(Event::BookingCreated {
                    id: b.id,
                    room_id: b.room_id,
                    holder_id: b.holder_id,
                    span: b.span,
                    amount_cents: b.amount_cents,
                    payment_mode: b.payment_mode.clone(),
                    created_at: b.created_at,
                });
                match b.status {
                    BookingStatus::Pending => {}
                    BookingStatus::Confirmed => events.push(Event::BookingConfirmed {
                        id: b.id,
                        room_id: b.room_id,
                    }),
                    BookingStatus::Cancelled => events.push(Event::BookingCancelled {
                        id: b.id,
                        room_id: b.room_id,
                    }),
                    BookingStatus::Completed => events.push(Event::BookingCompleted {
                        id: b.id,
                        room_id: b.room_id,
                    }),
                }
            }
        }

        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Compact {
                events,
                response: tx,
            })
            .await
            .map_err(|_| EngineError::Wal("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::Wal("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::Wal(e.to_string()))
    }

    pub async fn wal_appends_since_compact(&self) -> Result<u64, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::AppendsSinceCompact { response: tx })
            .await
            .map_err(|_| EngineError::Wal("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::Wal("WAL writer dropped response".into()))
    }
}

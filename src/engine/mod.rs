mod availability;
mod conflict;
mod error;
mod lifecycle;
mod mutations;
mod pricing;
mod queries;
mod store;

pub use availability::{free_spans, merge_overlapping, subtract_intervals};
pub use error::EngineError;
pub use store::RoomStore;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, OwnedRwLockWriteGuard, RwLock};
use ulid::Ulid;

use crate::limits::GUARD_WAIT_MS;
use crate::model::*;
use crate::wal::Wal;

pub type SharedRoomState = Arc<RwLock<RoomState>>;

// ── Group-commit WAL channel ─────────────────────────────

pub(super) enum WalCommand {
    Append {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Compact {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
}

/// Background task that owns the WAL and batches appends for group commit.
/// 1. Block until the first Append arrives.
/// 2. Buffer it (no fsync).
/// 3. Drain all immediately available Appends (the batch window).
/// 4. Single flush_sync for the whole batch.
/// 5. Respond Ok to all senders.
async fn wal_writer_loop(mut wal: Wal, mut rx: mpsc::Receiver<WalCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            WalCommand::Append { event, response } => {
                let mut batch = vec![(event, response)];

                // Drain all immediately available appends
                loop {
                    match rx.try_recv() {
                        Ok(WalCommand::Append { event, response }) => {
                            batch.push((event, response));
                        }
                        Ok(other) => {
                            // Flush current batch first, then handle the non-append command
                            flush_and_respond(&mut wal, &mut batch);
                            handle_non_append(&mut wal, other);
                            break;
                        }
                        Err(_) => break, // channel empty — flush batch
                    }
                }

                if !batch.is_empty() {
                    flush_and_respond(&mut wal, &mut batch);
                }
            }
            other => handle_non_append(&mut wal, other),
        }
    }
}

fn flush_and_respond(wal: &mut Wal, batch: &mut Vec<(Event, oneshot::Sender<io::Result<()>>)>) {
    metrics::histogram!(crate::observability::WAL_FLUSH_BATCH_SIZE).record(batch.len() as f64);
    let flush_start = std::time::Instant::now();
    let result = flush_batch(wal, batch);
    metrics::histogram!(crate::observability::WAL_FLUSH_DURATION_SECONDS)
        .record(flush_start.elapsed().as_secs_f64());
    respond_batch(batch, &result);
}

fn flush_batch(
    wal: &mut Wal,
    batch: &mut [(Event, oneshot::Sender<io::Result<()>>)],
) -> io::Result<()> {
    let mut append_err: Option<io::Error> = None;
    for (event, _) in batch.iter() {
        if let Err(e) = wal.append_buffered(event) {
            append_err = Some(e);
            break;
        }
    }
    // Always flush — even on append error — so partially buffered bytes
    // don't leak into the next batch (callers were told this batch failed).
    let flush_err = wal.flush_sync().err();
    if let Some(e) = append_err {
        return Err(e);
    }
    if let Some(e) = flush_err {
        return Err(e);
    }
    Ok(())
}

fn respond_batch(batch: &mut Vec<(Event, oneshot::Sender<io::Result<()>>)>, result: &io::Result<()>) {
    for (_, tx) in batch.drain(..) {
        let r = match result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = tx.send(r);
    }
}

fn handle_non_append(wal: &mut Wal, cmd: WalCommand) {
    match cmd {
        WalCommand::Compact { events, response } => {
            let result = Wal::write_compact_file(wal.path(), &events)
                .and_then(|()| wal.swap_compact_file());
            let _ = response.send(result);
        }
        WalCommand::AppendsSinceCompact { response } => {
            let _ = response.send(wal.appends_since_compact());
        }
        WalCommand::Append { .. } => unreachable!(),
    }
}

/// The Reservation Coordinator: sole writer of booking state.
///
/// Per-room state sits behind its own RwLock; the check-conflicts →
/// decide → mutate sequence for one room runs entirely under that room's
/// write lock, so no two writers on the same room can interleave. Rooms
/// never block each other.
pub struct Engine {
    pub(super) store: RoomStore,
    pub(super) wal_tx: mpsc::Sender<WalCommand>,
    /// Writers hold this shared for the duration of their append+apply;
    /// compaction takes it exclusive, so the snapshot it rewrites can never
    /// miss an event that a concurrent writer already persisted. Acquired
    /// before any room guard.
    pub(super) compaction_gate: RwLock<()>,
}

/// Apply an event directly to a RoomState (no locking — caller holds the lock).
fn apply_to_room(rs: &mut RoomState, event: &Event, store: &RoomStore) {
    match event {
        Event::RoomUpdated {
            number,
            rate_cents,
            available,
            ..
        } => {
            rs.number = number.clone();
            rs.rate_cents = *rate_cents;
            rs.available = *available;
        }
        Event::BookingCreated {
            id,
            room_id,
            holder_id,
            span,
            amount_cents,
            payment_mode,
            created_at,
        } => {
            rs.bookings.insert(
                *id,
                Booking {
                    id: *id,
                    room_id: *room_id,
                    holder_id: *holder_id,
                    span: *span,
                    status: BookingStatus::Pending,
                    amount_cents: *amount_cents,
                    payment_mode: payment_mode.clone(),
                    created_at: *created_at,
                },
            );
            rs.calendar.insert(*id, *span);
            store.map_booking(*id, *room_id);
        }
        Event::BookingEdited {
            id,
            span,
            amount_cents,
            payment_mode,
            ..
        } => {
            if let Some(b) = rs.bookings.get_mut(id) {
                b.span = *span;
                b.amount_cents = *amount_cents;
                b.payment_mode = payment_mode.clone();
            }
            rs.calendar.replace(*id, *span);
        }
        Event::BookingConfirmed { id, .. } => {
            if let Some(b) = rs.bookings.get_mut(id) {
                b.status = BookingStatus::Confirmed;
            }
        }
        Event::BookingCancelled { id, .. } => {
            if let Some(b) = rs.bookings.get_mut(id) {
                b.status = BookingStatus::Cancelled;
            }
            rs.calendar.remove(*id);
        }
        Event::BookingCompleted { id, .. } => {
            if let Some(b) = rs.bookings.get_mut(id) {
                b.status = BookingStatus::Completed;
            }
            rs.calendar.remove(*id);
        }
        Event::BookingDeleted { id, .. } => {
            rs.bookings.remove(id);
            rs.calendar.remove(*id);
            store.unmap_booking(id);
        }
        // Room create/delete and user events are handled at the store level
        Event::RoomCreated { .. }
        | Event::RoomDeleted { .. }
        | Event::UserAdded { .. }
        | Event::UserRoleChanged { .. } => {}
    }
}

impl Engine {
    pub fn new(wal_path: PathBuf) -> std::io::Result<Self> {
        let events = Wal::replay(&wal_path)?;
        let wal = Wal::open(&wal_path)?;
        let (wal_tx, wal_rx) = mpsc::channel(4096);
        tokio::spawn(wal_writer_loop(wal, wal_rx));

        let engine = Self {
            store: RoomStore::new(),
            wal_tx,
            compaction_gate: RwLock::new(()),
        };

        // Replay events — we're the sole owner of these Arcs, so try_write
        // always succeeds instantly (no contention). Never use blocking_write
        // here because this runs inside an async context.
        for event in &events {
            match event {
                Event::RoomCreated {
                    id,
                    number,
                    rate_cents,
                    available,
                } => {
                    engine
                        .store
                        .new_room(*id, number.clone(), *rate_cents, *available);
                }
                Event::RoomDeleted { id } => {
                    engine.store.remove_room(id);
                }
                Event::UserAdded { id, name, role } => {
                    engine.store.add_user(*id, name.clone(), *role);
                }
                Event::UserRoleChanged { id, role } => {
                    engine.store.set_user_role(id, *role);
                }
                other => {
                    if let Some(room_id) = event_room_id(other)
                        && let Some(rs) = engine.store.get_room(&room_id)
                        && let Ok(mut guard) = rs.try_write()
                    {
                        apply_to_room(&mut guard, other, &engine.store);
                    }
                }
            }
        }

        Ok(engine)
    }

    /// Write event to WAL via the background group-commit writer.
    pub(super) async fn wal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Append {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| EngineError::Wal("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::Wal("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::Wal(e.to_string()))
    }

    /// WAL-append + apply in one call, inside the caller's critical section.
    /// Nothing touches the in-memory state unless the append succeeded, so
    /// the log and the live index always agree.
    pub(super) async fn persist_and_apply(
        &self,
        rs: &mut RoomState,
        event: &Event,
    ) -> Result<(), EngineError> {
        self.wal_append(event).await?;
        apply_to_room(rs, event, &self.store);
        Ok(())
    }

    /// Acquire a room's reservation guard with a bounded wait. A writer that
    /// cannot get the guard within the budget fails with Conflict instead of
    /// queuing indefinitely behind a stalled request.
    pub(super) async fn lock_room(
        &self,
        room_id: &Ulid,
    ) -> Result<OwnedRwLockWriteGuard<RoomState>, EngineError> {
        let rs = self
            .store
            .get_room(room_id)
            .ok_or(EngineError::NotFound(*room_id))?;
        tokio::time::timeout(Duration::from_millis(GUARD_WAIT_MS), rs.write_owned())
            .await
            .map_err(|_| EngineError::Conflict("timed out waiting for room guard"))
    }

    /// Lookup booking → room, then acquire that room's guard.
    pub(super) async fn resolve_booking_write(
        &self,
        booking_id: &Ulid,
    ) -> Result<(Ulid, OwnedRwLockWriteGuard<RoomState>), EngineError> {
        let room_id = self
            .store
            .room_for_booking(booking_id)
            .ok_or(EngineError::NotFound(*booking_id))?;
        let guard = self.lock_room(&room_id).await?;
        Ok((room_id, guard))
    }

    /// Map a wire-level identity claim to an Actor. The literal `admin` is
    /// the bootstrap administrator; everyone else must be registered.
    pub fn resolve_actor(&self, user: &str) -> Option<Actor> {
        if user == "admin" {
            return Some(Actor::system());
        }
        let id = Ulid::from_string(user).ok()?;
        let role = self.store.user_role(&id)?;
        Some(Actor { id, role })
    }
}

/// Extract the room id from an event (for per-room events).
fn event_room_id(event: &Event) -> Option<Ulid> {
    match event {
        Event::BookingCreated { room_id, .. }
        | Event::BookingEdited { room_id, .. }
        | Event::BookingConfirmed { room_id, .. }
        | Event::BookingCancelled { room_id, .. }
        | Event::BookingCompleted { room_id, .. }
        | Event::BookingDeleted { room_id, .. } => Some(*room_id),
        Event::RoomUpdated { id, .. } => Some(*id),
        Event::RoomCreated { .. }
        | Event::RoomDeleted { .. }
        | Event::UserAdded { .. }
        | Event::UserRoleChanged { .. } => None,
    }
}

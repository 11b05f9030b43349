use dashmap::DashMap;
use ulid::Ulid;

use crate::model::{Role, RoomState};

use super::SharedRoomState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub name: Option<String>,
    pub role: Role,
}

/// In-memory state shared across connections: rooms, the booking → room
/// reverse index, and the user registry. Per-room state sits behind its own
/// lock; the maps themselves are lock-free.
pub struct RoomStore {
    rooms: DashMap<Ulid, SharedRoomState>,
    booking_to_room: DashMap<Ulid, Ulid>,
    users: DashMap<Ulid, UserEntry>,
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            booking_to_room: DashMap::new(),
            users: DashMap::new(),
        }
    }

    // ── Rooms ────────────────────────────────────────────────

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains_room(&self, id: &Ulid) -> bool {
        self.rooms.contains_key(id)
    }

    pub fn get_room(&self, id: &Ulid) -> Option<SharedRoomState> {
        self.rooms.get(id).map(|e| e.value().clone())
    }

    pub fn insert_room(&self, id: Ulid, state: SharedRoomState) {
        self.rooms.insert(id, state);
    }

    pub fn remove_room(&self, id: &Ulid) -> Option<(Ulid, SharedRoomState)> {
        self.rooms.remove(id)
    }

    pub fn room_ids(&self) -> Vec<Ulid> {
        self.rooms.iter().map(|e| *e.key()).collect()
    }

    // ── Booking index ────────────────────────────────────────

    pub fn room_for_booking(&self, booking_id: &Ulid) -> Option<Ulid> {
        self.booking_to_room.get(booking_id).map(|e| *e.value())
    }

    pub fn map_booking(&self, booking_id: Ulid, room_id: Ulid) {
        self.booking_to_room.insert(booking_id, room_id);
    }

    pub fn unmap_booking(&self, booking_id: &Ulid) {
        self.booking_to_room.remove(booking_id);
    }

    // ── User registry ────────────────────────────────────────

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn contains_user(&self, id: &Ulid) -> bool {
        self.users.contains_key(id)
    }

    pub fn add_user(&self, id: Ulid, name: Option<String>, role: Role) {
        self.users.insert(id, UserEntry { name, role });
    }

    /// Returns false if the user is unknown.
    pub fn set_user_role(&self, id: &Ulid, role: Role) -> bool {
        match self.users.get_mut(id) {
            Some(mut entry) => {
                entry.role = role;
                true
            }
            None => false,
        }
    }

    pub fn user_role(&self, id: &Ulid) -> Option<Role> {
        self.users.get(id).map(|e| e.value().role)
    }

    pub fn user_entries(&self) -> Vec<(Ulid, UserEntry)> {
        self.users
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect()
    }

    /// Fresh RoomState behind a new lock — used by create and replay.
    pub fn new_room(
        &self,
        id: Ulid,
        number: Option<String>,
        rate_cents: i64,
        available: bool,
    ) -> SharedRoomState {
        let rs = RoomState::new(id, number, rate_cents, available);
        let shared: SharedRoomState = std::sync::Arc::new(tokio::sync::RwLock::new(rs));
        self.rooms.insert(id, shared.clone());
        shared
    }
}

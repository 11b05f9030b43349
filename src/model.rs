use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

/// One night: exactly 24 hours.
pub const NIGHT_MS: Ms = 86_400_000;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

// ── Actors ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Client,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "client" => Some(Role::Client),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Resolved identity of the caller. Authentication happens upstream; the
/// engine only ever authorizes against this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Ulid,
    pub role: Role,
}

impl Actor {
    /// Internal actor for background tasks (auto-completion sweep) and the
    /// bootstrap `admin` login.
    pub fn system() -> Self {
        Self {
            id: Ulid::nil(),
            role: Role::Admin,
        }
    }
}

// ── Bookings ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Active bookings occupy the room's calendar.
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<BookingStatus> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Ulid,
    pub room_id: Ulid,
    pub holder_id: Ulid,
    pub span: Span,
    pub status: BookingStatus,
    pub amount_cents: i64,
    pub payment_mode: Option<String>,
    pub created_at: Ms,
}

/// Explicit edit patch — each field independently present or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingPatch {
    pub check_in: Option<Ms>,
    pub check_out: Option<Ms>,
    pub payment_mode: Option<String>,
}

impl BookingPatch {
    pub fn is_empty(&self) -> bool {
        self.check_in.is_none() && self.check_out.is_none() && self.payment_mode.is_none()
    }
}

// ── Calendar (interval index) ────────────────────────────────────

/// One occupied slot on a room's calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub booking_id: Ulid,
    pub span: Span,
}

/// Per-room index of active booking intervals, sorted by `span.start`.
///
/// Not a source of truth: a derived view over the room's active bookings,
/// mutated only under the room's reservation guard so it can never drift
/// from the records beside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    slots: Vec<Slot>,
}

impl Calendar {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Insert a slot maintaining sort order by span.start.
    pub fn insert(&mut self, booking_id: Ulid, span: Span) {
        let pos = self
            .slots
            .binary_search_by_key(&span.start, |s| s.span.start)
            .unwrap_or_else(|e| e);
        self.slots.insert(pos, Slot { booking_id, span });
    }

    /// Remove a slot by booking id.
    pub fn remove(&mut self, booking_id: Ulid) -> Option<Slot> {
        let pos = self.slots.iter().position(|s| s.booking_id == booking_id)?;
        Some(self.slots.remove(pos))
    }

    /// Swap a booking's slot for a new span in one step.
    pub fn replace(&mut self, booking_id: Ulid, new_span: Span) {
        self.remove(booking_id);
        self.insert(booking_id, new_span);
    }

    /// Slots whose span overlaps the query window. Binary search skips
    /// everything starting at or after `query.end`.
    pub fn overlapping(&self, query: &Span) -> impl Iterator<Item = &Slot> {
        let right_bound = self.slots.partition_point(|s| s.span.start < query.end);
        self.slots[..right_bound]
            .iter()
            .filter(move |s| s.span.end > query.start)
    }

    /// Booking ids whose slot overlaps `span`, optionally excluding one
    /// booking (for edits, which must not conflict with themselves).
    pub fn conflicts(&self, span: &Span, exclude: Option<Ulid>) -> Vec<Ulid> {
        self.overlapping(span)
            .filter(|s| exclude != Some(s.booking_id))
            .map(|s| s.booking_id)
            .collect()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

// ── Rooms ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RoomState {
    pub id: Ulid,
    /// Human label ("101", "suite-2") — display only.
    pub number: Option<String>,
    /// Flat nightly rate in cents.
    pub rate_cents: i64,
    /// Generally available for new reservations. Out-of-service rooms keep
    /// their existing bookings but reject new ones.
    pub available: bool,
    /// Active (pending/confirmed) intervals.
    pub calendar: Calendar,
    /// Canonical booking records, all statuses.
    pub bookings: HashMap<Ulid, Booking>,
}

impl RoomState {
    pub fn new(id: Ulid, number: Option<String>, rate_cents: i64, available: bool) -> Self {
        Self {
            id,
            number,
            rate_cents,
            available,
            calendar: Calendar::new(),
            bookings: HashMap::new(),
        }
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id,
            number: self.number.clone(),
            rate_cents: self.rate_cents,
            available: self.available,
        }
    }
}

// ── WAL events ───────────────────────────────────────────────────

/// The event types — flat, no nesting. This is the WAL record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RoomCreated {
        id: Ulid,
        number: Option<String>,
        rate_cents: i64,
        available: bool,
    },
    RoomUpdated {
        id: Ulid,
        number: Option<String>,
        rate_cents: i64,
        available: bool,
    },
    RoomDeleted {
        id: Ulid,
    },
    UserAdded {
        id: Ulid,
        name: Option<String>,
        role: Role,
    },
    UserRoleChanged {
        id: Ulid,
        role: Role,
    },
    BookingCreated {
        id: Ulid,
        room_id: Ulid,
        holder_id: Ulid,
        span: Span,
        amount_cents: i64,
        payment_mode: Option<String>,
        created_at: Ms,
    },
    /// Carries the resulting field values after an edit, not the patch.
    BookingEdited {
        id: Ulid,
        room_id: Ulid,
        span: Span,
        amount_cents: i64,
        payment_mode: Option<String>,
    },
    BookingConfirmed {
        id: Ulid,
        room_id: Ulid,
    },
    BookingCancelled {
        id: Ulid,
        room_id: Ulid,
    },
    BookingCompleted {
        id: Ulid,
        room_id: Ulid,
    },
    BookingDeleted {
        id: Ulid,
        room_id: Ulid,
    },
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub id: Ulid,
    pub number: Option<String>,
    pub rate_cents: i64,
    pub available: bool,
}

/// Filter for booking listings. Fields are ANDed; `None` matches all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub room_id: Option<Ulid>,
    pub holder_id: Option<Ulid>,
}

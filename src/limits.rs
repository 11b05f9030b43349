use crate::model::{Ms, NIGHT_MS};

pub const MAX_ROOMS: usize = 10_000;
pub const MAX_USERS: usize = 100_000;
pub const MAX_BOOKINGS_PER_ROOM: usize = 10_000;
pub const MAX_LIST_RESULTS: usize = 10_000;

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_PAYMENT_MODE_LEN: usize = 64;

/// Ceiling on the nightly rate: one million dollars, in cents.
pub const MAX_RATE_CENTS: i64 = 100_000_000;

pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;
/// 2100-01-01T00:00:00Z.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;

/// A stay longer than a year is a data-entry error, not a booking.
pub const MAX_STAY_NIGHTS: i64 = 366;
pub const MAX_SPAN_DURATION_MS: Ms = MAX_STAY_NIGHTS * NIGHT_MS;

/// Widest availability query window: two years.
pub const MAX_QUERY_WINDOW_MS: Ms = 2 * 366 * NIGHT_MS;

/// Bounded wait for a room's reservation guard. A writer stuck longer than
/// this on a hot room fails with a conflict instead of queuing forever.
pub const GUARD_WAIT_MS: u64 = 2_000;

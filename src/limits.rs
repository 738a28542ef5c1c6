/// Bookings held by one store.
pub const MAX_BOOKINGS: usize = 100_000;

/// Longest single stay.
pub const MAX_BOOKING_DAYS: usize = 366;

/// Longest window for day-by-day queries.
pub const MAX_QUERY_DAYS: usize = 3_660;

/// Customer and pet names.
pub const MAX_NAME_LEN: usize = 256;

/// Longest course (in calendar days) a single date run may cover.
pub const MAX_COURSE_DAYS: u32 = 60;

/// Upper bound on availability records accepted from one fetch.
pub const MAX_RECORDS_PER_FETCH: usize = 10_000;

/// Upper bound on slots a single selection may hold.
pub const MAX_SELECTED_SLOTS: usize = 124;

/// Upper bound on free-text fields carried into a booking request.
pub const MAX_FIELD_LEN: usize = 512;

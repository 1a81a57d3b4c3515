/// Minimum year accepted as a display month
pub const MIN_YEAR: i32 = 1;

/// Maximum year accepted as a display month (inclusive)
pub const MAX_YEAR: i32 = 9999;

/// Days in one grid row
pub const DAYS_PER_WEEK: usize = 7;

/// Months in one year
pub const MONTHS_PER_YEAR: i32 = 12;

/// Cells per month when weeks are fixed (6 rows)
pub const FIXED_WEEKS_DAYS: usize = 42;

/// Cells per month when weeks are fixed in broadcast mode (5 rows)
pub const BROADCAST_FIXED_WEEKS_DAYS: usize = 35;

/// Upper bound on the candidates tried when searching for a focusable day
pub const MAX_FOCUS_ATTEMPTS: usize = 365;

/// Day-of-week number for Sunday (0-based, Sunday first)
pub const SUNDAY: u8 = 0;
/// Day-of-week number for Monday
pub const MONDAY: u8 = 1;
/// Day-of-week number for Saturday
pub const SATURDAY: u8 = 6;

/// Day of January that always falls in week 1 (locale default)
pub const FIRST_WEEK_CONTAINS_JAN_1: u8 = 1;
/// Day of January that always falls in week 1 (ISO 8601)
pub const FIRST_WEEK_CONTAINS_JAN_4: u8 = 4;

/// Name of the custom modifier that pins the initial focus
pub const FOCUSED_MODIFIER: &str = "focused";

/// Default capacity of a zoned calendar's offset cache
pub const DEFAULT_OFFSET_CACHE_CAPACITY: usize = 1024;

/// Format of ISO-8601 timestamps without an offset
pub const ISO_NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Format of ISO-8601 calendar dates
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Range separator (ISO 8601 interval format)
pub const RANGE_SEPARATOR: char = '/';

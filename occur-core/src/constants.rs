/// Number of days `occur list` shows when no end date is given
pub const DEFAULT_LIST_DAYS: i64 = 7;

/// Upper bound on instances expanded from one rule for a single query
pub const MAX_EXPANDED_INSTANCES: u16 = 2000;

/// File holding an event definition inside its catalog directory
pub const EVENT_FILE: &str = "event.toml";

/// Directory holding persisted exceptions inside an event's catalog directory
pub const EXCEPTIONS_DIR: &str = "exceptions";

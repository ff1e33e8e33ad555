/// Salary runs are split into windows of this many days, anchored at the run's start date
pub const WEEK_LENGTH_DAYS: u64 = 7;

pub const DEFAULT_HOST_ADDRESS: &str = "127.0.0.1:0";

/// One week
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;

pub const DEFAULT_LOG_FILE: &str = "trace.log";

/// Activities shown on a dashboard summary
pub const RECENT_ACTIVITY_LIMIT: u64 = 5;

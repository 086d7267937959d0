//! Timestamp utilities
//!
//! Record timestamps are Unix epoch milliseconds; cache expiries are Unix
//! epoch seconds.

use chrono::Utc;

/// Current time as Unix epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current time as Unix epoch seconds
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Expiry (epoch seconds) for an entry written now with the given lifetime
pub fn expiry_from_now(ttl_minutes: i64) -> i64 {
    now_secs() + ttl_minutes * 60
}

/// Whether an expiry (epoch seconds) lies in the past at `now_ms`
pub fn is_expired(expires_at_secs: i64, now_ms: i64) -> bool {
    expires_at_secs * 1000 < now_ms
}

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Hours subtracted from UTC when stamping `createdAt`.
///
/// This is a fixed shift (UTC-6), not a timezone: there is no daylight
/// saving handling and no zone is recorded alongside the value.
pub const CREATED_AT_OFFSET_HOURS: i64 = 6;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Creation timestamp for a task stamped at `now`.
///
/// Truncated to milliseconds, the resolution the document store keeps, so a
/// freshly created task compares equal to the one read back.
pub fn created_at_from(now: DateTime<Utc>) -> DateTime<Utc> {
    (now - Duration::hours(CREATED_AT_OFFSET_HOURS)).trunc_subsecs(3)
}

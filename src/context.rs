//! Request context
//!
//! Every tool call runs against an explicit context: whose data, and what
//! "today" and "now" are in the configured zone. Nothing is kept between
//! calls.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

/// Local wall clock in the configured zone
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    tz: Tz,
}

impl Clock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Local date and minute-precision time at `instant`
    pub fn local_at(&self, instant: DateTime<Utc>) -> (NaiveDate, NaiveTime) {
        let local = instant.with_timezone(&self.tz);
        let time = local
            .time()
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or_else(|| local.time());
        (local.date_naive(), time)
    }

    /// Context for `user_id` as of this instant
    pub fn context_for(&self, user_id: impl Into<String>) -> RequestContext {
        let (today, now) = self.local_at(Utc::now());
        RequestContext {
            user_id: user_id.into(),
            today,
            now,
        }
    }
}

/// Who is asking, and the local date and time they are asking at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: String,
    pub today: NaiveDate,
    pub now: NaiveTime,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>, today: NaiveDate, now: NaiveTime) -> Self {
        Self {
            user_id: user_id.into(),
            today,
            now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_date_uses_zone_not_utc() {
        let clock = Clock::new(chrono_tz::US::Eastern);
        // 02:30 UTC on the 11th is still the evening of the 10th in New York
        let instant = Utc.with_ymd_and_hms(2025, 6, 11, 2, 30, 45).unwrap();
        let (date, time) = clock.local_at(instant);

        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(22, 30, 0).unwrap());
    }

    #[test]
    fn test_other_zone() {
        let clock = Clock::new(chrono_tz::Asia::Tokyo);
        let instant = Utc.with_ymd_and_hms(2025, 6, 10, 20, 5, 0).unwrap();
        let (date, time) = clock.local_at(instant);

        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 11).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(5, 5, 0).unwrap());
    }

    #[test]
    fn test_context_carries_user() {
        let clock = Clock::new(chrono_tz::UTC);
        let ctx = clock.context_for("abc");
        assert_eq!(ctx.user_id, "abc");
        assert_eq!(ctx.now.second(), 0);
    }
}

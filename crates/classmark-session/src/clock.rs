//! Time source for sessions.
//!
//! The state machine takes `now` as an argument everywhere; this type is
//! where callers get it from. Production code uses the system clock,
//! tests pin a fixed instant and advance it by hand.

use chrono::{DateTime, Duration, Utc};

/// A clock that is either the system clock or a fixed instant.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Real wall-clock time.
    #[default]
    System,
    /// A pinned instant, moved only by `advance`.
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// A clock pinned to `instant`.
    pub fn fixed(instant: DateTime<Utc>) -> Self {
        Clock::Fixed(instant)
    }

    /// The current time according to this clock.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(instant) => *instant,
        }
    }

    /// Move a fixed clock forward. Does nothing to the system clock.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(instant) = self {
            *instant += delta;
        }
    }
}

/// Render remaining seconds the way the countdown shows them: `M:SS`.
pub fn format_remaining(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_stays_put_until_advanced() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let mut clock = Clock::fixed(t0);
        assert_eq!(clock.now(), t0);
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), t0 + Duration::seconds(90));
    }

    #[test]
    fn default_clock_tracks_real_time() {
        let clock = Clock::default();
        let before = Utc::now();
        let observed = clock.now();
        let after = Utc::now();
        assert!(observed >= before && observed <= after);
    }

    #[test]
    fn remaining_renders_minutes_and_padded_seconds() {
        assert_eq!(format_remaining(0), "0:00");
        assert_eq!(format_remaining(9), "0:09");
        assert_eq!(format_remaining(60), "1:00");
        assert_eq!(format_remaining(605), "10:05");
    }
}

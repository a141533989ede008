use crate::format::format_time_left;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Client-side spacing between two chat requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    period: Duration,
    last_request: Option<DateTime<Utc>>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_request: None,
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.last_request = Some(now);
    }

    /// Whole seconds left, rounded up. Zero means a request may be sent.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        let Some(last) = self.last_request else {
            return 0;
        };
        let elapsed = (now - last).num_milliseconds().max(0) as u128;
        let period = self.period.as_millis();
        if elapsed >= period {
            0
        } else {
            (period - elapsed).div_ceil(1000) as u64
        }
    }

    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) == 0
    }

    pub fn wait_message(&self, now: DateTime<Utc>) -> String {
        format!("Please wait {}.", format_time_left(self.remaining_secs(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn ready_before_first_request() {
        let cooldown = Cooldown::new(Duration::from_secs(180));
        assert!(cooldown.is_ready(t0()));
    }

    #[test]
    fn counts_down_and_rounds_up() {
        let mut cooldown = Cooldown::new(Duration::from_secs(180));
        cooldown.start(t0());
        assert_eq!(cooldown.remaining_secs(t0()), 180);
        assert_eq!(cooldown.remaining_secs(t0() + TimeDelta::milliseconds(500)), 180);
        assert_eq!(cooldown.remaining_secs(t0() + TimeDelta::milliseconds(1000)), 179);
        assert_eq!(cooldown.wait_message(t0() + TimeDelta::seconds(55)), "Please wait 2:05.");
        assert!(cooldown.is_ready(t0() + TimeDelta::seconds(180)));
    }

    #[test]
    fn clock_going_backwards_keeps_full_period() {
        let mut cooldown = Cooldown::new(Duration::from_secs(10));
        cooldown.start(t0());
        assert_eq!(cooldown.remaining_secs(t0() - TimeDelta::seconds(5)), 10);
    }
}

//! The round countdown.
//!
//! One reusable single-shot timer, decoupled from any display: callers pull
//! ticks and render them however they like, and completion is simply the
//! stream running dry. The countdown cannot be cancelled early.

use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

pub struct Countdown {
    remaining: u32,
    interval: Interval,
    started: bool,
}

impl Countdown {
    /// A countdown ticking once per second for the given number of seconds.
    pub fn new(seconds: u32) -> Self {
        Self::with_period(seconds, Duration::from_secs(1))
    }

    /// Same countdown with a custom tick period. Tests use a short period to
    /// avoid waiting out real seconds.
    pub fn with_period(seconds: u32, period: Duration) -> Self {
        let mut interval = interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Countdown {
            remaining: seconds,
            interval,
            started: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Waits one period and yields the seconds left afterwards; `None` once
    /// the countdown has expired. The final yielded value is 0.
    pub async fn tick(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        if !self.started {
            // The first interval tick fires immediately; swallow it so the
            // countdown runs for its full duration.
            self.interval.tick().await;
            self.started = true;
        }
        self.interval.tick().await;
        self.remaining -= 1;
        Some(self.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_ticks_count_down_to_zero() {
        let mut countdown = Countdown::with_period(3, Duration::from_millis(5));

        let mut seen = Vec::new();
        while let Some(remaining) = countdown.tick().await {
            seen.push(remaining);
        }
        assert_eq!(seen, vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn test_expired_countdown_stays_expired() {
        let mut countdown = Countdown::with_period(1, Duration::from_millis(5));
        assert_eq!(countdown.tick().await, Some(0));
        assert_eq!(countdown.tick().await, None);
        assert_eq!(countdown.tick().await, None);
    }

    #[tokio::test]
    async fn test_zero_second_countdown_completes_immediately() {
        let mut countdown = Countdown::new(0);
        assert_eq!(countdown.tick().await, None);
    }

    #[tokio::test]
    async fn test_countdown_takes_its_full_duration() {
        let period = Duration::from_millis(10);
        let mut countdown = Countdown::with_period(4, period);

        let start = Instant::now();
        while countdown.tick().await.is_some() {}
        assert!(start.elapsed() >= period * 4);
    }

    #[tokio::test]
    async fn test_remaining_tracks_progress() {
        let mut countdown = Countdown::with_period(2, Duration::from_millis(5));
        assert_eq!(countdown.remaining(), 2);
        countdown.tick().await;
        assert_eq!(countdown.remaining(), 1);
    }
}

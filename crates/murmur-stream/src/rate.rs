//! Decode throughput estimation from token arrival times.

use std::time::Instant;

/// Cumulative tokens-per-second estimate for the window currently being
/// decoded.
///
/// The first token of a window records the start timestamp; the rate stays
/// undefined until a second token arrives. From then on every token
/// recomputes `tokens_seen / elapsed_since_first_token`, a
/// cumulative-since-window-start figure rather than an instantaneous one.
/// Counters reset at each window-finalize.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenRateEstimator {
    window_start: Option<Instant>,
    tokens_seen: u64,
}

impl TokenRateEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one token arrival and returns the updated rate, or `None`
    /// while fewer than two tokens have arrived in the current window.
    pub fn record_token(&mut self, now: Instant) -> Option<f64> {
        match self.window_start {
            None => {
                self.window_start = Some(now);
                self.tokens_seen = 1;
                None
            }
            Some(start) => {
                self.tokens_seen += 1;
                let elapsed = now.duration_since(start).as_secs_f64();
                Some(self.tokens_seen as f64 / elapsed)
            }
        }
    }

    /// Clears the counters; the rate is undefined again until two tokens of
    /// the next window have arrived.
    pub fn reset(&mut self) {
        self.window_start = None;
        self.tokens_seen = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn rate_is_undefined_after_a_single_token() {
        let mut estimator = TokenRateEstimator::new();
        assert_eq!(estimator.record_token(Instant::now()), None);
    }

    #[test]
    fn rate_is_defined_and_positive_after_the_second_token() {
        let mut estimator = TokenRateEstimator::new();
        let start = Instant::now();

        assert_eq!(estimator.record_token(start), None);
        let rate = estimator
            .record_token(start + Duration::from_millis(500))
            .expect("rate should be defined after two tokens");
        assert_eq!(rate, 4.0);
    }

    #[test]
    fn rate_accumulates_over_the_whole_window() {
        let mut estimator = TokenRateEstimator::new();
        let start = Instant::now();

        estimator.record_token(start);
        estimator.record_token(start + Duration::from_secs(1));
        let rate = estimator
            .record_token(start + Duration::from_secs(2))
            .expect("rate should be defined");
        assert_eq!(rate, 1.5);
    }

    #[test]
    fn reset_makes_the_rate_undefined_again() {
        let mut estimator = TokenRateEstimator::new();
        let start = Instant::now();

        estimator.record_token(start);
        estimator.record_token(start + Duration::from_millis(100));
        estimator.reset();

        assert_eq!(estimator.record_token(Instant::now()), None);
    }
}

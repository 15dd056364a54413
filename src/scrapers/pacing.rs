//! Randomized pauses between interactive steps.
//!
//! The site stages its DOM and rate-limits aggressively; pacing every click like
//! a person keeps both working.

use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::trace;

/// Clones share one pause counter.
#[derive(Debug, Clone)]
pub struct Pacer {
    min: Duration,
    max: Duration,
    pauses: Arc<AtomicUsize>,
}

impl Pacer {
    pub fn new(min: Duration, max: Duration) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            pauses: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_secs(min_secs: f64, max_secs: f64) -> Self {
        Self::new(
            Duration::from_secs_f64(min_secs.max(0.0)),
            Duration::from_secs_f64(max_secs.max(0.0)),
        )
    }

    /// A pacer that never sleeps
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Pick the next pause length within the configured bounds
    pub fn next_delay(&self) -> Duration {
        if self.max.is_zero() || self.min == self.max {
            return self.min;
        }
        let secs = rand::thread_rng().gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Number of pauses taken so far, zero-length ones included
    pub fn pauses_taken(&self) -> usize {
        self.pauses.load(Ordering::Relaxed)
    }

    pub fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::Relaxed);
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        trace!("Pausing for {:.2}s", delay.as_secs_f64());
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_stay_within_bounds() {
        let pacer = Pacer::from_secs(2.0, 5.0);
        for _ in 0..200 {
            let delay = pacer.next_delay();
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_secs(5));
        }
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let pacer = Pacer::from_secs(3.0, 1.0);
        let delay = pacer.next_delay();
        assert!(delay >= Duration::from_secs(1) && delay <= Duration::from_secs(3));
    }

    #[test]
    fn disabled_pacer_never_waits() {
        assert_eq!(Pacer::disabled().next_delay(), Duration::ZERO);
    }

    #[test]
    fn clones_count_into_the_same_tally() {
        let pacer = Pacer::disabled();
        let handle = pacer.clone();
        pacer.pause();
        handle.pause();
        assert_eq!(pacer.pauses_taken(), 2);
        assert_eq!(handle.pauses_taken(), 2);
    }
}

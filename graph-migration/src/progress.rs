//! Interval-throttled progress reporting

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Tracks documents processed within one migration phase and reports the
/// running rate at a fixed interval.
pub struct PhaseProgress {
    phase: &'static str,
    total: Option<u64>,
    processed: AtomicU64,
    started: Instant,
    last_report: Mutex<Instant>,
    interval: Duration,
}

impl PhaseProgress {
    /// Create a tracker for one phase. `total` enables percentage
    /// reporting when the source could count its documents.
    #[must_use]
    pub fn new(phase: &'static str, total: Option<u64>, interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            phase,
            total,
            processed: AtomicU64::new(0),
            started: now,
            last_report: Mutex::new(now),
            interval,
        }
    }

    /// Add processed documents, emitting a report when the interval has
    /// elapsed.
    pub fn add(&self, count: u64) {
        self.processed.fetch_add(count, Ordering::Relaxed);
        let mut last = self.last_report.lock();
        if last.elapsed() >= self.interval {
            *last = Instant::now();
            drop(last);
            self.report();
        }
    }

    /// Documents processed so far.
    #[must_use]
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Wall time since the phase started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn report(&self) {
        let processed = self.processed();
        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            processed as f64 / elapsed
        } else {
            0.0
        };

        match self.total {
            Some(total) => {
                let percentage = if total > 0 {
                    processed as f64 / total as f64 * 100.0
                } else {
                    100.0
                };
                tracing::info!(
                    phase = self.phase,
                    processed,
                    total,
                    percentage = format!("{percentage:.1}%"),
                    rate = format!("{rate:.0}/s"),
                    "migration progress"
                );
            }
            None => {
                tracing::info!(
                    phase = self.phase,
                    processed,
                    rate = format!("{rate:.0}/s"),
                    "migration progress"
                );
            }
        }
    }
}

// Generation metrics module
//
// Counters describing how a production run went: how many events were
// requested, how many the generator delivered and where the time was spent.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Run-level generation metrics
///
/// Uses atomic counters so recording only needs `&self`; the driver and
/// the binary can share one instance without threading it mutably
/// through every call.
#[derive(Debug)]
pub struct GenerationMetrics {
    /// Iterations requested by the user
    pub events_requested: AtomicUsize,

    /// Generator calls made
    pub events_attempted: AtomicUsize,

    /// Events written to the sink
    pub events_produced: AtomicUsize,

    /// Iterations dropped because the generator returned nothing
    pub events_skipped: AtomicUsize,

    /// Time spent inside the generator, in microseconds
    pub generation_time_us: AtomicU64,

    /// Time spent converting and writing events, in microseconds
    pub write_time_us: AtomicU64,

    start_time: Instant,
}

impl GenerationMetrics {
    pub fn new() -> Self {
        Self {
            events_requested: AtomicUsize::new(0),
            events_attempted: AtomicUsize::new(0),
            events_produced: AtomicUsize::new(0),
            events_skipped: AtomicUsize::new(0),
            generation_time_us: AtomicU64::new(0),
            write_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_requested(&self, n: usize) {
        self.events_requested.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_attempt(&self, duration: Duration) {
        self.events_attempted.fetch_add(1, Ordering::Relaxed);
        self.generation_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_produced(&self, write_duration: Duration) {
        self.events_produced.fetch_add(1, Ordering::Relaxed);
        self.write_time_us
            .fetch_add(write_duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.events_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Fraction of attempts that produced an event (0 when nothing was attempted)
    pub fn efficiency(&self) -> f64 {
        let attempted = self.events_attempted.load(Ordering::Relaxed);
        if attempted > 0 {
            self.events_produced.load(Ordering::Relaxed) as f64 / attempted as f64
        } else {
            0.0
        }
    }

    /// Average generator time per attempt in milliseconds
    pub fn avg_generation_time_ms(&self) -> f64 {
        let total = self.generation_time_us.load(Ordering::Relaxed);
        let count = self.events_attempted.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64 / 1000.0
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Generation Summary ===");
        tracing::info!(
            "Events: {} requested, {} attempted, {} produced, {} skipped (efficiency {:.1}%)",
            self.events_requested.load(Ordering::Relaxed),
            self.events_attempted.load(Ordering::Relaxed),
            self.events_produced.load(Ordering::Relaxed),
            self.events_skipped.load(Ordering::Relaxed),
            100.0 * self.efficiency()
        );
        tracing::info!(
            "Time: {:.2}s total, {:.3}ms per generator call, {:.2}s writing",
            self.uptime().as_secs_f64(),
            self.avg_generation_time_ms(),
            self.write_time_us.load(Ordering::Relaxed) as f64 / 1e6
        );
    }
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

use crate::generator::EventGenerator;
use crate::metrics::GenerationMetrics;
use crate::services::sink::EventSink;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one generation loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub requested: usize,
    pub attempted: usize,
    pub produced: usize,
    pub skipped: usize,
}

impl RunSummary {
    /// Get a summary string of the run
    pub fn summary(&self) -> String {
        format!(
            "{} of {} events produced ({} skipped)",
            self.produced, self.requested, self.skipped
        )
    }
}

/// Runs the fixed-count event loop.
///
/// Each iteration asks the generator for exactly one event. A failed
/// attempt is skipped without retry, so a run may end with fewer events
/// than requested. Successful events are written immediately, in order.
pub struct GenerationDriver {
    metrics: Arc<GenerationMetrics>,
}

impl GenerationDriver {
    pub fn new(metrics: Arc<GenerationMetrics>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &GenerationMetrics {
        &self.metrics
    }

    /// Run `max_events` iterations and finalize the sink.
    ///
    /// # Arguments
    /// * `max_events` - Number of iterations, not a target event count
    /// * `generator` - Initialized event source
    /// * `sink` - Destination for produced events
    ///
    /// # Returns
    /// Counts of attempted, produced and skipped iterations. Any sink
    /// error aborts the run and is returned instead.
    pub fn run<G, S>(&self, max_events: usize, generator: &mut G, sink: &mut S) -> Result<RunSummary>
    where
        G: EventGenerator + ?Sized,
        S: EventSink + ?Sized,
    {
        let mut summary = RunSummary {
            requested: max_events,
            ..Default::default()
        };
        self.metrics.record_requested(max_events);

        for iteration in 0..max_events {
            let start = Instant::now();
            let event = generator.next_event();
            self.metrics.record_attempt(start.elapsed());
            summary.attempted += 1;

            let Some(event) = event else {
                summary.skipped += 1;
                self.metrics.record_skipped();
                continue;
            };

            let write_start = Instant::now();
            sink.write_event(&event)
                .with_context(|| format!("Failed to write event at iteration {}", iteration))?;
            self.metrics.record_produced(write_start.elapsed());
            summary.produced += 1;
        }

        sink.finish().context("Failed to finalize event output")?;

        let info = generator.info();
        tracing::info!(
            "Generation finished: {}; sigma = {:.4e} +- {:.2e} mb",
            summary.summary(),
            info.sigma_gen_mb,
            info.sigma_err_mb
        );

        Ok(summary)
    }
}

impl Default for GenerationDriver {
    fn default() -> Self {
        Self::new(Arc::new(GenerationMetrics::new()))
    }
}

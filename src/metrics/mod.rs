pub mod formulas;
pub mod sample;
pub mod window;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use sample::{PerformanceSample, SampleLog};
pub use window::ConsistencyWindow;

/// Live typing figures, always derived from the session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub wpm: u32,
    pub raw_wpm: u32,
    pub net_wpm: u32,
    pub accuracy: u32,
    pub errors: usize,
    pub consistency: u32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            wpm: 0,
            raw_wpm: 0,
            net_wpm: 0,
            accuracy: 100,
            errors: 0,
            consistency: 100,
        }
    }
}

/// Snapshot of a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub wpm: u32,
    pub accuracy: u32,
    /// elapsed seconds
    pub time: f64,
    pub errors: usize,
    pub raw_wpm: u32,
    pub net_wpm: u32,
    pub consistency: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Turns input snapshots and elapsed time into [`Metrics`] and a final [`TestResult`].
///
/// Live figures count whitespace tokens and subtract an error rate; the final
/// result uses a characters/5 estimate and scales by accuracy. The jump between
/// the two at finish is expected.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    metrics: Metrics,
    window: ConsistencyWindow,
    samples: SampleLog,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the initial figures for a freshly generated text
    pub fn reset(&mut self) {
        self.metrics = Metrics::default();
        self.window.clear();
        self.samples.clear();
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn samples(&self) -> &[PerformanceSample] {
        self.samples.as_slice()
    }

    /// Recompute the live figures for `input`, already truncated to the reference length
    pub fn on_input_changed(
        &mut self,
        input: &[char],
        reference: &[char],
        elapsed_secs: f64,
    ) -> Metrics {
        let raw_wpm = formulas::token_wpm(formulas::word_count(input), elapsed_secs);
        let errors = formulas::mismatches(input, reference);
        let accuracy = formulas::accuracy(input.len(), errors);
        let net_wpm = formulas::subtractive_net_wpm(raw_wpm, errors, elapsed_secs);

        self.window.push(raw_wpm);
        let consistency = self
            .window
            .consistency()
            .unwrap_or(self.metrics.consistency);

        self.metrics = Metrics {
            wpm: net_wpm,
            raw_wpm,
            net_wpm,
            accuracy,
            errors,
            consistency,
        };
        self.metrics
    }

    /// Take a performance sample from the typed length so far
    pub fn record_sample(
        &mut self,
        typed_chars: usize,
        elapsed_secs: f64,
    ) -> Option<PerformanceSample> {
        if typed_chars == 0 || elapsed_secs <= 0.0 {
            return None;
        }
        let wpm = formulas::char_wpm(typed_chars, elapsed_secs);
        if wpm == 0 {
            return None;
        }
        let sample = PerformanceSample::new(elapsed_secs, wpm);
        if self.samples.push(sample) {
            tracing::debug!(time = elapsed_secs, wpm, "performance sample");
            Some(sample)
        } else {
            None
        }
    }

    /// Compute the final result. Missing trailing characters count as errors and
    /// the consistency window is read as-is.
    pub fn finish(
        &mut self,
        input: &[char],
        reference: &[char],
        elapsed_secs: f64,
        timestamp: DateTime<Utc>,
    ) -> TestResult {
        let raw_wpm = formulas::char_wpm(input.len(), elapsed_secs);
        let missing = reference.len().saturating_sub(input.len());
        let errors = formulas::mismatches(input, reference) + missing;
        let accuracy = formulas::accuracy(input.len(), errors);
        let net_wpm = formulas::scaled_net_wpm(raw_wpm, accuracy);
        let consistency = self.window.consistency().unwrap_or(100);

        self.metrics = Metrics {
            wpm: net_wpm,
            raw_wpm,
            net_wpm,
            accuracy,
            errors,
            consistency,
        };

        TestResult {
            wpm: net_wpm,
            accuracy,
            time: elapsed_secs,
            errors,
            raw_wpm,
            net_wpm,
            consistency,
            timestamp,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Minimum spacing between two consecutive samples, in seconds
pub const MIN_SAMPLE_SPACING_SECS: f64 = 0.5;

/// Speed reading taken while a session is running
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub time_seconds: f64,
    pub wpm: u32,
}

impl PerformanceSample {
    pub fn new(time_seconds: f64, wpm: u32) -> Self {
        Self { time_seconds, wpm }
    }
}

impl From<PerformanceSample> for (f64, f64) {
    fn from(p: PerformanceSample) -> Self {
        (p.time_seconds, p.wpm as f64)
    }
}

/// Append-only sample sequence; drops readings too close to the previous one
#[derive(Debug, Clone, Default)]
pub struct SampleLog {
    samples: Vec<PerformanceSample>,
}

impl SampleLog {
    pub fn push(&mut self, sample: PerformanceSample) -> bool {
        let spaced = self.samples.last().map_or(true, |last| {
            (last.time_seconds - sample.time_seconds).abs() > MIN_SAMPLE_SPACING_SECS
        });
        if spaced {
            self.samples.push(sample);
        }
        spaced
    }

    pub fn as_slice(&self) -> &[PerformanceSample] {
        &self.samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

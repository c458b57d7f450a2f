use std::collections::VecDeque;

/// Number of raw speed readings kept for the consistency figure
pub const WINDOW_LEN: usize = 10;

fn mean(data: &VecDeque<f64>) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().sum::<f64>() / count as f64),
    }
}

/// Population standard deviation
fn std_dev(data: &VecDeque<f64>) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

/// Rolling window of the most recent non-zero raw speed readings
#[derive(Debug, Clone, Default)]
pub struct ConsistencyWindow {
    readings: VecDeque<f64>,
}

impl ConsistencyWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw speed reading. Zero readings are skipped.
    pub fn push(&mut self, raw_wpm: u32) {
        if raw_wpm == 0 {
            return;
        }
        self.readings.push_back(raw_wpm as f64);
        if self.readings.len() > WINDOW_LEN {
            self.readings.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// 100 minus the coefficient of variation, clamped to [0, 100].
    /// `None` until at least two readings exist.
    pub fn consistency(&self) -> Option<u32> {
        if self.readings.len() < 2 {
            return None;
        }
        let avg = mean(&self.readings)?;
        let sd = std_dev(&self.readings)?;
        let score = (100.0 - (sd / avg) * 100.0).clamp(0.0, 100.0);
        Some(score.round() as u32)
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Wall-clock cadence of one clock tick
pub const TICK_RATE_MS: u64 = 100;

/// Applied ticks between two performance sample ticks (one simulated second)
pub const TICKS_PER_SAMPLE: u64 = 10;

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

/// Identifies one run of a clock. Ticks scheduled for an older epoch are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Epoch(u64);

impl Epoch {
    fn fresh() -> Self {
        Epoch(NEXT_EPOCH.fetch_add(1, Ordering::Relaxed))
    }
}

/// What an applied tick amounts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Clock,
    /// a clock tick that also closes a sampling interval
    Sample,
}

/// Additive session clock advancing in fixed 0.1 s steps
#[derive(Debug, Default)]
pub struct SessionClock {
    ticks: u64,
    epoch: Option<Epoch>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_interval() -> Duration {
        Duration::from_millis(TICK_RATE_MS)
    }

    /// Start the clock under a new epoch. Starting a running clock is a no-op.
    pub fn start(&mut self) -> Epoch {
        *self.epoch.get_or_insert_with(Epoch::fresh)
    }

    /// Stop the clock; any tick arriving afterwards is ignored
    pub fn stop(&mut self) {
        self.epoch = None;
    }

    pub fn is_running(&self) -> bool {
        self.epoch.is_some()
    }

    pub fn epoch(&self) -> Option<Epoch> {
        self.epoch
    }

    /// Apply a tick scheduled for `epoch`. Returns `None` for stale ticks.
    pub fn on_tick(&mut self, epoch: Epoch) -> Option<TickKind> {
        if self.epoch != Some(epoch) {
            return None;
        }
        self.ticks += 1;
        if self.ticks % TICKS_PER_SAMPLE == 0 {
            Some(TickKind::Sample)
        } else {
            Some(TickKind::Clock)
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.ticks as f64 * TICK_RATE_MS as f64 / 1000.0
    }
}

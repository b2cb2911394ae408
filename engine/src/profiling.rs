use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickTimings {
    /// Time spent inside `GameLogic::step`.
    pub step: Duration,
    /// Wall time of the whole runner tick, bookkeeping included.
    pub total: Duration,
}

impl TickTimings {
    pub fn overhead(&self) -> Duration {
        self.total.saturating_sub(self.step)
    }
}

/// Hook for capturing per-tick timings from a `HeadlessRunner`.
///
/// Implementors only see frame numbers and durations, never game state, so one
/// profiler can be shared by the CLI, tests and any frontend.
pub trait Profiler {
    fn on_tick(&mut self, _frame: usize, _timings: TickTimings) {}
}

/// Running min/max/mean over observed tick durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickStats {
    pub ticks: usize,
    pub min: Duration,
    pub max: Duration,
    sum: Duration,
}

impl TickStats {
    pub fn mean(&self) -> Duration {
        if self.ticks == 0 {
            return Duration::ZERO;
        }
        self.sum / self.ticks as u32
    }
}

impl Profiler for TickStats {
    fn on_tick(&mut self, _frame: usize, timings: TickTimings) {
        let t = timings.total;
        if self.ticks == 0 {
            self.min = t;
            self.max = t;
        } else {
            self.min = self.min.min(t);
            self.max = self.max.max(t);
        }
        self.sum = self.sum.saturating_add(t);
        self.ticks += 1;
    }
}

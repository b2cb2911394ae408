use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub start_difficulty: u32,
    pub spawn_interval_ms: f64,
    pub min_spawn_interval_ms: f64,
    /// Interval multiplier applied after every minion spawn.
    pub spawn_interval_decay: f64,
    /// Spawn interval multiplier while a boss is on the field.
    pub boss_spawn_slowdown: f64,
    pub first_boss_score: u64,
    pub boss_score_step: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            start_difficulty: 1,
            spawn_interval_ms: 850.0,
            min_spawn_interval_ms: 420.0,
            spawn_interval_decay: 0.997,
            boss_spawn_slowdown: 1.8,
            first_boss_score: 250,
            boss_score_step: 250,
        }
    }
}

impl ProgressionConfig {
    pub fn sanitized(mut self) -> Self {
        self.min_spawn_interval_ms = self.min_spawn_interval_ms.max(1.0);
        self.spawn_interval_ms = self.spawn_interval_ms.max(self.min_spawn_interval_ms);
        self.spawn_interval_decay = self.spawn_interval_decay.clamp(0.0, 1.0);
        self.boss_spawn_slowdown = self.boss_spawn_slowdown.max(1.0);
        self.boss_score_step = self.boss_score_step.max(1);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub difficulty: u32,
    pub spawn_interval_ms: f64,
    pub last_spawn_ms: f64,
    pub next_boss_score: u64,
}

impl Progression {
    pub fn new(cfg: &ProgressionConfig, now_ms: f64) -> Self {
        Self {
            difficulty: cfg.start_difficulty,
            spawn_interval_ms: cfg.spawn_interval_ms,
            last_spawn_ms: now_ms,
            next_boss_score: cfg.first_boss_score,
        }
    }

    pub fn boss_due(&self, score: u64, boss_active: bool) -> bool {
        !boss_active && score >= self.next_boss_score
    }

    /// Restarts the minion cadence so the boss gets a clear entrance.
    pub fn on_boss_spawned(&mut self, now_ms: f64) {
        self.last_spawn_ms = now_ms;
    }

    pub fn effective_interval_ms(&self, boss_active: bool, cfg: &ProgressionConfig) -> f64 {
        if boss_active {
            self.spawn_interval_ms * cfg.boss_spawn_slowdown
        } else {
            self.spawn_interval_ms
        }
    }

    pub fn minion_due(&self, now_ms: f64, boss_active: bool, cfg: &ProgressionConfig) -> bool {
        now_ms - self.last_spawn_ms > self.effective_interval_ms(boss_active, cfg)
    }

    pub fn on_minion_spawned(&mut self, now_ms: f64, cfg: &ProgressionConfig) {
        self.last_spawn_ms = now_ms;
        let decayed = self.spawn_interval_ms * cfg.spawn_interval_decay;
        self.spawn_interval_ms = decayed.max(cfg.min_spawn_interval_ms);
    }

    pub fn on_boss_defeated(&mut self, cfg: &ProgressionConfig) {
        self.difficulty += 1;
        self.next_boss_score += cfg.boss_score_step;
    }
}

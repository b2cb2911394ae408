use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

pub type Color = [u8; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Minion,
    Boss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub pos: Vec3,
    pub radius: f32,
    pub hp: i32,
    pub speed_z: f32,
    pub wobble: f32,
}

impl Monster {
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossPhase {
    One = 1,
    Two = 2,
    Three = 3,
}

impl BossPhase {
    pub fn from_hp_ratio(ratio: f32) -> Self {
        if ratio < 0.34 {
            BossPhase::Three
        } else if ratio < 0.67 {
            BossPhase::Two
        } else {
            BossPhase::One
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub name: String,
    pub pos: Vec3,
    pub radius: f32,
    pub max_hp: i32,
    pub hp: i32,
    /// Seconds since spawn; drives the hover pattern.
    pub age: f32,
    pub speed_z: f32,
}

impl Boss {
    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        (self.hp as f32 / self.max_hp as f32).clamp(0.0, 1.0)
    }

    pub fn phase(&self) -> BossPhase {
        BossPhase::from_hp_ratio(self.hp as f32 / self.max_hp.max(1) as f32)
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

/// Visual record of a resolved cast. The hit is already settled when a beam exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub from: Vec3,
    pub to: Vec3,
    pub born_ms: f64,
    pub ttl_ms: f64,
}

impl Beam {
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.born_ms).max(0.0)
    }

    pub fn is_alive(&self, now_ms: f64) -> bool {
        now_ms - self.born_ms < self.ttl_ms
    }

    /// 1.0 at birth, fading linearly to 0.0 at expiry.
    pub fn alpha(&self, now_ms: f64) -> f32 {
        if self.ttl_ms <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age_ms(now_ms) / self.ttl_ms).clamp(0.0, 1.0) as f32
    }
}

/// Screen-space feedback particle (pixels, seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
    pub ttl: f32,
    pub radius: f32,
    pub color: Color,
    pub alpha0: f32,
    pub gravity: f32,
    /// Fraction of velocity kept after one second.
    pub drag: f32,
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.age < self.ttl
    }

    pub fn alpha(&self) -> f32 {
        if self.ttl <= 0.0 {
            return 0.0;
        }
        ((1.0 - self.age / self.ttl) * self.alpha0).clamp(0.0, 1.0)
    }

    pub fn advance(&mut self, dt: f32) {
        self.age += dt;
        self.vel.y += self.gravity * dt * 0.35;
        self.pos += self.vel * dt;
        self.vel *= self.drag.powf(dt);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub color: Color,
    pub weight: u32,
}

pub const PALETTE_PURPLE_GOLD: &[PaletteEntry] = &[
    PaletteEntry {
        color: [180, 120, 255, 255],
        weight: 3,
    },
    PaletteEntry {
        color: [215, 181, 109, 255],
        weight: 3,
    },
    PaletteEntry {
        color: [255, 245, 220, 255],
        weight: 1,
    },
];

pub const PALETTE_ASH: &[PaletteEntry] = &[
    PaletteEntry {
        color: [255, 80, 80, 255],
        weight: 2,
    },
    PaletteEntry {
        color: [40, 40, 40, 255],
        weight: 3,
    },
    PaletteEntry {
        color: [90, 90, 90, 255],
        weight: 2,
    },
    PaletteEntry {
        color: [0, 0, 0, 255],
        weight: 1,
    },
];

/// Weighted pick; `roll` is uniform in `[0, 1)`.
pub fn pick_color(palette: &[PaletteEntry], roll: f32) -> Color {
    let total: u32 = palette.iter().map(|p| p.weight.max(1)).sum();
    let mut r = roll * total as f32;
    for entry in palette {
        r -= entry.weight.max(1) as f32;
        if r <= 0.0 {
            return entry.color;
        }
    }
    let fallback = palette.last().map(|p| p.color);
    fallback.unwrap_or([255, 255, 255, 255])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstPreset {
    pub count: usize,
    pub palette: &'static [PaletteEntry],
    pub gravity: f32,
    pub drag: f32,
    pub ttl: (f32, f32),
    pub speed: (f32, f32),
    pub size: (f32, f32),
    pub alpha: (f32, f32),
}

impl BurstPreset {
    pub const DEFAULT: BurstPreset = BurstPreset {
        count: 22,
        palette: PALETTE_PURPLE_GOLD,
        gravity: 240.0,
        drag: 0.0015,
        ttl: (0.32, 0.60),
        speed: (60.0, 260.0),
        size: (1.2, 3.2),
        alpha: (0.35, 0.90),
    };

    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

/// Named feedback bursts requested by combat and boss resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstKind {
    /// Generic impact burst at every hit.
    Hit { boss: bool },
    /// Target died.
    KillSparks,
    /// Target survived.
    GrazeSparks,
    /// Boss defeated.
    BossAsh,
}

impl BurstKind {
    pub fn preset(self) -> BurstPreset {
        match self {
            BurstKind::Hit { boss: true } => BurstPreset::DEFAULT.with_count(34),
            BurstKind::Hit { boss: false } => BurstPreset::DEFAULT.with_count(24),
            BurstKind::KillSparks => BurstPreset {
                count: 46,
                palette: PALETTE_PURPLE_GOLD,
                gravity: 220.0,
                drag: 0.0012,
                ttl: (0.25, 0.55),
                speed: (110.0, 420.0),
                size: (1.2, 3.8),
                alpha: (0.35, 0.95),
            },
            BurstKind::GrazeSparks => BurstPreset {
                count: 18,
                ttl: (0.18, 0.35),
                speed: (80.0, 220.0),
                ..BurstPreset::DEFAULT
            },
            BurstKind::BossAsh => BurstPreset {
                count: 140,
                palette: PALETTE_ASH,
                gravity: 520.0,
                drag: 0.0022,
                ttl: (0.55, 1.25),
                speed: (40.0, 220.0),
                size: (1.6, 4.6),
                alpha: (0.18, 0.55),
            },
        }
    }

    /// Speed multiplier applied on top of the preset's range.
    pub fn power(self) -> f32 {
        match self {
            BurstKind::Hit { boss: true } => 1.2,
            BurstKind::Hit { boss: false } => 1.0,
            BurstKind::KillSparks => 1.0,
            BurstKind::GrazeSparks => 0.9,
            BurstKind::BossAsh => 1.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_phase_thresholds() {
        assert_eq!(BossPhase::from_hp_ratio(1.0), BossPhase::One);
        assert_eq!(BossPhase::from_hp_ratio(0.67), BossPhase::One);
        assert_eq!(BossPhase::from_hp_ratio(0.66), BossPhase::Two);
        assert_eq!(BossPhase::from_hp_ratio(0.34), BossPhase::Two);
        assert_eq!(BossPhase::from_hp_ratio(0.33), BossPhase::Three);
        assert_eq!(BossPhase::Three.number(), 3);
    }

    #[test]
    fn particle_drag_is_frame_rate_independent() {
        let base = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(100.0, 0.0),
            age: 0.0,
            ttl: 1.0,
            radius: 1.0,
            color: [255; 4],
            alpha0: 1.0,
            gravity: 0.0,
            drag: 0.5,
        };
        let mut coarse = base;
        coarse.advance(0.2);
        let mut fine = base;
        for _ in 0..4 {
            fine.advance(0.05);
        }
        assert!((coarse.vel.x - fine.vel.x).abs() < 1e-3);
    }

    #[test]
    fn particle_expires_at_ttl() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            age: 0.0,
            ttl: 0.3,
            radius: 1.0,
            color: [255; 4],
            alpha0: 0.8,
            gravity: 240.0,
            drag: 0.0015,
        };
        p.advance(0.1);
        assert!(p.is_alive());
        assert!(p.alpha() < 0.8);
        p.advance(0.25);
        assert!(!p.is_alive());
        assert_eq!(p.alpha(), 0.0);
    }

    #[test]
    fn beam_fades_and_expires() {
        let beam = Beam {
            from: Vec3::ZERO,
            to: Vec3::Z,
            born_ms: 1000.0,
            ttl_ms: 138.0,
        };
        assert_eq!(beam.alpha(1000.0), 1.0);
        assert!(beam.is_alive(1137.0));
        assert!(!beam.is_alive(1138.0));
        assert_eq!(beam.alpha(1200.0), 0.0);
    }

    #[test]
    fn weighted_pick_covers_palette_ends() {
        assert_eq!(pick_color(PALETTE_ASH, 0.0), [255, 80, 80, 255]);
        assert_eq!(pick_color(PALETTE_ASH, 0.99), [0, 0, 0, 255]);
    }
}

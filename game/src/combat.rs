//! Cast resolution and the score/streak/combo/hp bookkeeping.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entities::{Beam, BurstKind};
use crate::gesture::CastEvent;
use crate::simulation::{TargetRef, World};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub minion_hit_points: u32,
    pub boss_hit_points: u32,
    pub combo_step: f32,
    pub combo_max: f32,
    /// Combo starts decaying once this long has passed without a hit.
    pub combo_decay_after_ms: f64,
    /// Per-tick lerp factor toward 1.0 while decaying.
    pub combo_decay_rate: f32,
    pub combo_snap_below: f32,
    pub boss_defeat_points: u32,
    pub boss_defeat_streak: u32,
    pub boss_defeat_combo: f32,
    pub minion_breach_damage: i32,
    pub boss_melee_damage: i32,
    /// Where a cast with nothing to hit aims, relative to its origin.
    pub miss_offset: Vec3,
    /// Beam endpoint is pushed this far past the target center.
    pub beam_pierce: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            minion_hit_points: 10,
            boss_hit_points: 10,
            combo_step: 0.08,
            combo_max: 3.0,
            combo_decay_after_ms: 1400.0,
            combo_decay_rate: 0.06,
            combo_snap_below: 1.02,
            boss_defeat_points: 120,
            boss_defeat_streak: 2,
            boss_defeat_combo: 0.35,
            minion_breach_damage: 1,
            boss_melee_damage: 2,
            miss_offset: Vec3::new(0.0, -0.25, 1.8),
            beam_pierce: 0.08,
        }
    }
}

impl CombatConfig {
    pub fn sanitized(mut self) -> Self {
        self.combo_max = self.combo_max.max(1.0);
        self.combo_step = self.combo_step.max(0.0);
        self.boss_defeat_combo = self.boss_defeat_combo.max(0.0);
        self.combo_decay_rate = self.combo_decay_rate.clamp(0.0, 1.0);
        self.minion_breach_damage = self.minion_breach_damage.max(0);
        self.boss_melee_damage = self.boss_melee_damage.max(0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    pub score: u64,
    pub streak: u32,
    pub combo: f32,
    pub hp: i32,
    pub last_hit_ms: f64,
}

impl CombatState {
    pub fn new(start_hp: i32) -> Self {
        Self {
            score: 0,
            streak: 0,
            combo: 1.0,
            hp: start_hp,
            last_hit_ms: 0.0,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    pub fn combo_label(&self) -> String {
        format!("x{:.2}", self.combo)
    }

    fn scaled(&self, points: u32) -> u64 {
        (points as f32 * self.combo).floor().max(0.0) as u64
    }

    /// Scores one landed hit and returns the points awarded.
    pub fn register_hit(&mut self, points: u32, now_ms: f64, cfg: &CombatConfig) -> u64 {
        let awarded = self.scaled(points);
        self.score += awarded;
        self.streak += 1;
        self.combo = (self.combo + cfg.combo_step).min(cfg.combo_max);
        self.last_hit_ms = now_ms;
        awarded
    }

    /// Drops the streak and combo without touching hp.
    pub fn break_chain(&mut self) {
        self.streak = 0;
        self.combo = 1.0;
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp -= amount;
        self.break_chain();
    }

    pub fn award_boss_defeat(&mut self, cfg: &CombatConfig) -> u64 {
        let awarded = self.scaled(cfg.boss_defeat_points);
        self.score += awarded;
        self.streak += cfg.boss_defeat_streak;
        self.combo = (self.combo + cfg.boss_defeat_combo).min(cfg.combo_max);
        awarded
    }

    pub fn decay_combo(&mut self, now_ms: f64, cfg: &CombatConfig) {
        if now_ms - self.last_hit_ms <= cfg.combo_decay_after_ms {
            return;
        }
        self.combo += (1.0 - self.combo) * cfg.combo_decay_rate;
        if self.combo < cfg.combo_snap_below {
            self.combo = 1.0;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub target: TargetRef,
    /// Target center at the moment of impact.
    pub at: Vec3,
    pub lethal: bool,
    pub awarded: u64,
}

impl Strike {
    pub fn is_boss(&self) -> bool {
        self.target == TargetRef::Boss
    }

    /// Feedback bursts in spawn order.
    pub fn bursts(&self) -> [BurstKind; 2] {
        let spark = if self.lethal {
            BurstKind::KillSparks
        } else {
            BurstKind::GrazeSparks
        };
        let hit = BurstKind::Hit {
            boss: self.is_boss(),
        };
        [spark, hit]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastResolution {
    pub beam: Beam,
    /// `None` when nothing was alive to hit.
    pub strike: Option<Strike>,
}

/// Resolves one cast against the nearest live target.
///
/// Dead minions are left in place for the caller to prune, so every index in the
/// world stays valid until the whole frame's casts are resolved.
pub fn resolve_cast(
    world: &mut World,
    combat: &mut CombatState,
    cast: &CastEvent,
    beam_ttl_ms: f64,
    cfg: &CombatConfig,
) -> CastResolution {
    let now_ms = cast.at_ms;
    let beam = |to: Vec3| Beam {
        from: cast.origin,
        to,
        born_ms: now_ms,
        ttl_ms: beam_ttl_ms,
    };

    let Some((target, at)) = world.nearest_target(cast.origin) else {
        combat.break_chain();
        return CastResolution {
            beam: beam(cast.origin + cfg.miss_offset),
            strike: None,
        };
    };

    let (lethal, points) = match target {
        TargetRef::Minion(i) => {
            let monster = &mut world.monsters[i];
            monster.hp -= 1;
            (monster.is_dead(), cfg.minion_hit_points)
        }
        TargetRef::Boss => match world.boss.as_mut() {
            Some(boss) => {
                boss.hp -= 1;
                (boss.is_dead(), cfg.boss_hit_points)
            }
            None => (false, 0),
        },
    };
    let awarded = combat.register_hit(points, now_ms, cfg);

    CastResolution {
        beam: beam(at + Vec3::new(0.0, 0.0, cfg.beam_pierce)),
        strike: Some(Strike {
            target,
            at,
            lethal,
            awarded,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Monster;
    use crate::landmarks::HandLabel;

    fn cast_at(origin: Vec3, at_ms: f64) -> CastEvent {
        CastEvent {
            hand: HandLabel::Right,
            origin,
            at_ms,
        }
    }

    fn minion(z: f32) -> Monster {
        Monster {
            pos: Vec3::new(0.0, 0.0, z),
            radius: 0.15,
            hp: 1,
            speed_z: 1.0,
            wobble: 0.0,
        }
    }

    #[test]
    fn hit_at_combo_one_and_a_half() {
        let cfg = CombatConfig::default();
        let mut world = World {
            monsters: vec![minion(3.0)],
            ..World::default()
        };
        let mut combat = CombatState::new(10);
        combat.combo = 1.5;

        let cast = cast_at(Vec3::new(0.0, 0.0, 1.2), 500.0);
        let res = resolve_cast(&mut world, &mut combat, &cast, 138.0, &cfg);
        let strike = res.strike.expect("minion in play");
        assert_eq!(strike.awarded, 15);
        assert!(strike.lethal);
        assert_eq!(combat.score, 15);
        assert_eq!(combat.streak, 1);
        assert!((combat.combo - 1.58).abs() < 1e-5);
        assert_eq!(combat.last_hit_ms, 500.0);
        assert!((res.beam.to.z - 3.08).abs() < 1e-5);
        assert!(world.monsters[0].is_dead());
        assert_eq!(world.prune_dead_monsters(), 1);
    }

    #[test]
    fn miss_resets_chain_and_aims_forward() {
        let cfg = CombatConfig::default();
        let mut world = World::default();
        let mut combat = CombatState::new(10);
        combat.combo = 2.2;
        combat.streak = 7;
        combat.score = 90;

        let origin = Vec3::new(0.1, 0.0, 1.0);
        let cast = cast_at(origin, 10.0);
        let res = resolve_cast(&mut world, &mut combat, &cast, 138.0, &cfg);
        assert!(res.strike.is_none());
        assert_eq!(res.beam.to, origin + Vec3::new(0.0, -0.25, 1.8));
        assert_eq!(combat.combo, 1.0);
        assert_eq!(combat.streak, 0);
        assert_eq!(combat.score, 90);
    }

    #[test]
    fn combo_is_capped() {
        let cfg = CombatConfig::default();
        let mut combat = CombatState::new(10);
        for i in 0..60 {
            combat.register_hit(10, i as f64, &cfg);
        }
        assert_eq!(combat.combo, 3.0);
        combat.award_boss_defeat(&cfg);
        assert_eq!(combat.combo, 3.0);
    }

    #[test]
    fn boss_defeat_bonus_scales_with_combo() {
        let cfg = CombatConfig::default();
        let mut combat = CombatState::new(10);
        combat.combo = 2.0;
        combat.streak = 3;
        assert_eq!(combat.award_boss_defeat(&cfg), 240);
        assert_eq!(combat.streak, 5);
        assert!((combat.combo - 2.35).abs() < 1e-5);
    }

    #[test]
    fn damage_breaks_chain() {
        let mut combat = CombatState::new(10);
        combat.combo = 1.9;
        combat.streak = 4;
        combat.take_damage(2);
        assert_eq!(combat.hp, 8);
        assert_eq!(combat.combo, 1.0);
        assert_eq!(combat.streak, 0);
    }

    #[test]
    fn combo_decays_only_after_idle_window() {
        let cfg = CombatConfig::default();
        let mut combat = CombatState::new(10);
        combat.combo = 2.0;
        combat.last_hit_ms = 1000.0;

        combat.decay_combo(2400.0, &cfg);
        assert_eq!(combat.combo, 2.0);

        combat.decay_combo(2401.0, &cfg);
        assert!((combat.combo - 1.94).abs() < 1e-5);

        for _ in 0..200 {
            combat.decay_combo(5000.0, &cfg);
        }
        assert_eq!(combat.combo, 1.0);
    }

    #[test]
    fn boss_is_a_valid_target() {
        let cfg = CombatConfig::default();
        let mut world = World::default();
        world.spawn_boss(1, &crate::simulation::SimulationConfig::default());
        let mut combat = CombatState::new(10);

        let cast = cast_at(Vec3::ZERO, 1.0);
        let res = resolve_cast(&mut world, &mut combat, &cast, 138.0, &cfg);
        let strike = res.strike.expect("boss in play");
        assert!(strike.is_boss());
        assert!(!strike.lethal);
        assert_eq!(
            strike.bursts(),
            [BurstKind::GrazeSparks, BurstKind::Hit { boss: true }]
        );
        assert_eq!(world.boss.as_ref().map(|b| b.hp), Some(29));
    }

    #[test]
    fn combo_label_has_two_decimals() {
        let mut combat = CombatState::new(10);
        combat.combo = 1.58;
        assert_eq!(combat.combo_label(), "x1.58");
    }
}

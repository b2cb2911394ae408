//! Entity motion: minions, the boss, beams and particles.
//!
//! Nothing here touches score or hp. Advancing returns what happened (breaches,
//! melee hits) and the session applies the consequences.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entities::{Beam, Boss, BurstKind, Monster, Particle, pick_color};

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Uniform in `[-1, 1)`.
fn signed_unit<R: Rng>(rng: &mut R) -> f32 {
    rng.random::<f32>() * 2.0 - 1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub spawn_x_extent: f32,
    pub spawn_y_extent: f32,
    pub spawn_y_offset: f32,
    pub spawn_z_min: f32,
    pub spawn_z_span: f32,
    pub minion_speed: (f32, f32),
    pub minion_radius: (f32, f32),
    /// Speed gain per difficulty level.
    pub speed_per_difficulty: f32,
    pub wobble_rate: f32,
    pub wobble_rate_per_difficulty: f32,
    /// Minions closer than this have reached the player.
    pub near_plane_z: f32,
    pub boss_name: String,
    pub boss_spawn: Vec3,
    pub boss_radius: f32,
    pub boss_base_hp: i32,
    pub boss_hp_per_difficulty: i32,
    pub boss_speed: f32,
    pub boss_hover_z: f32,
    pub boss_melee_z: f32,
    pub boss_pushback_z: f32,
    pub beam_ttl_ms: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spawn_x_extent: 0.85,
            spawn_y_extent: 0.20,
            spawn_y_offset: -0.12,
            spawn_z_min: 4.8,
            spawn_z_span: 0.9,
            minion_speed: (0.65, 1.15),
            minion_radius: (0.12, 0.18),
            speed_per_difficulty: 0.08,
            wobble_rate: 2.2,
            wobble_rate_per_difficulty: 0.2,
            near_plane_z: 0.55,
            boss_name: "Wyrm of Ash".to_string(),
            boss_spawn: Vec3::new(0.0, -0.16, 5.2),
            boss_radius: 0.42,
            boss_base_hp: 28,
            boss_hp_per_difficulty: 2,
            boss_speed: 0.22,
            boss_hover_z: 2.4,
            boss_melee_z: 1.05,
            boss_pushback_z: 2.2,
            beam_ttl_ms: 138.0,
        }
    }
}

impl SimulationConfig {
    pub fn sanitized(mut self) -> Self {
        self.spawn_z_min = self.spawn_z_min.max(self.near_plane_z + 0.1);
        self.spawn_z_span = self.spawn_z_span.max(0.0);
        self.boss_base_hp = self.boss_base_hp.max(1);
        self.boss_hp_per_difficulty = self.boss_hp_per_difficulty.max(0);
        self.beam_ttl_ms = self.beam_ttl_ms.max(0.0);
        self
    }

    pub fn boss_hp_for(&self, difficulty: u32) -> i32 {
        self.boss_base_hp + self.boss_hp_per_difficulty * difficulty as i32
    }
}

/// Something that can be targeted by a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRef {
    Minion(usize),
    Boss,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub monsters: Vec<Monster>,
    pub boss: Option<Boss>,
    pub beams: Vec<Beam>,
    pub particles: Vec<Particle>,
}

impl World {
    pub fn spawn_monster<R: Rng>(
        &mut self,
        rng: &mut R,
        difficulty: u32,
        cfg: &SimulationConfig,
    ) -> &Monster {
        let x = signed_unit(rng) * cfg.spawn_x_extent;
        let y = signed_unit(rng) * cfg.spawn_y_extent + cfg.spawn_y_offset;
        let z = cfg.spawn_z_min + rng.random::<f32>() * cfg.spawn_z_span;
        let speed_z = lerp(cfg.minion_speed.0, cfg.minion_speed.1, rng.random())
            * (1.0 + difficulty as f32 * cfg.speed_per_difficulty);
        let wobble = rng.random::<f32>() * TAU;
        let radius = lerp(cfg.minion_radius.0, cfg.minion_radius.1, rng.random());

        self.monsters.push(Monster {
            pos: Vec3::new(x, y, z),
            radius,
            hp: 1,
            speed_z,
            wobble,
        });
        let spawned = &self.monsters[self.monsters.len() - 1];
        log::debug!(
            "minion spawned at {} speed={:.2}",
            spawned.pos,
            spawned.speed_z
        );
        spawned
    }

    pub fn spawn_boss(&mut self, difficulty: u32, cfg: &SimulationConfig) -> &Boss {
        let hp = cfg.boss_hp_for(difficulty);
        self.boss.insert(Boss {
            name: cfg.boss_name.clone(),
            pos: cfg.boss_spawn,
            radius: cfg.boss_radius,
            max_hp: hp,
            hp,
            age: 0.0,
            speed_z: cfg.boss_speed,
        })
    }

    /// Moves every minion toward the camera. Minions crossing the near plane are
    /// removed; the return value is how many did.
    pub fn advance_monsters(&mut self, dt: f32, difficulty: u32, cfg: &SimulationConfig) -> u32 {
        let wobble_rate = cfg.wobble_rate + difficulty as f32 * cfg.wobble_rate_per_difficulty;
        let mut breaches = 0;
        self.monsters.retain_mut(|m| {
            m.wobble += dt * wobble_rate;
            m.pos.z -= m.speed_z * dt;
            m.pos.x += m.wobble.sin() * dt * 0.10;
            m.pos.y += (m.wobble * 0.9).cos() * dt * 0.05;

            if m.pos.z < cfg.near_plane_z {
                breaches += 1;
                false
            } else {
                true
            }
        });
        breaches
    }

    /// Approach, then hover. Returns `true` if the boss got into melee range this
    /// tick; it is then knocked back, never removed.
    pub fn advance_boss(&mut self, dt: f32, cfg: &SimulationConfig) -> bool {
        let Some(boss) = self.boss.as_mut() else {
            return false;
        };

        boss.age += dt;
        if boss.pos.z > cfg.boss_hover_z {
            boss.pos.z -= boss.speed_z * dt;
        }
        boss.pos.x = (boss.age * 0.9).sin() * 0.35;
        boss.pos.y = -0.12 + (boss.age * 0.7).cos() * 0.10;

        if boss.pos.z < cfg.boss_melee_z {
            boss.pos.z = cfg.boss_pushback_z;
            return true;
        }
        false
    }

    pub fn expire_beams(&mut self, now_ms: f64) {
        self.beams.retain(|b| b.is_alive(now_ms));
    }

    pub fn advance_particles(&mut self, dt: f32) {
        self.particles.retain_mut(|p| {
            p.advance(dt);
            p.is_alive()
        });
    }

    pub fn spawn_burst<R: Rng>(&mut self, rng: &mut R, at: Vec2, kind: BurstKind) {
        let preset = kind.preset();
        let power = kind.power();
        self.particles.reserve(preset.count);
        for _ in 0..preset.count {
            let angle = rng.random::<f32>() * TAU;
            let speed = lerp(preset.speed.0, preset.speed.1, rng.random()) * power;
            self.particles.push(Particle {
                pos: at,
                vel: Vec2::from_angle(angle) * speed,
                age: 0.0,
                ttl: lerp(preset.ttl.0, preset.ttl.1, rng.random()),
                radius: lerp(preset.size.0, preset.size.1, rng.random()),
                color: pick_color(preset.palette, rng.random()),
                alpha0: lerp(preset.alpha.0, preset.alpha.1, rng.random()),
                gravity: preset.gravity,
                drag: preset.drag,
            });
        }
    }

    /// Nearest live target to `from`, with no range limit.
    pub fn nearest_target(&self, from: Vec3) -> Option<(TargetRef, Vec3)> {
        let minions = self
            .monsters
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_dead())
            .map(|(i, m)| (TargetRef::Minion(i), m.pos));
        let boss = self
            .boss
            .as_ref()
            .filter(|b| !b.is_dead())
            .map(|b| (TargetRef::Boss, b.pos));

        minions
            .chain(boss)
            .min_by(|a, b| from.distance(a.1).total_cmp(&from.distance(b.1)))
    }

    pub fn prune_dead_monsters(&mut self) -> usize {
        let before = self.monsters.len();
        self.monsters.retain(|m| !m.is_dead());
        before - self.monsters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn monster_at(z: f32) -> Monster {
        Monster {
            pos: Vec3::new(0.0, 0.0, z),
            radius: 0.15,
            hp: 1,
            speed_z: 1.0,
            wobble: 0.0,
        }
    }

    #[test]
    fn spawned_minions_stay_in_bands() {
        let cfg = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut world = World::default();
        for _ in 0..200 {
            world.spawn_monster(&mut rng, 1, &cfg);
        }
        for m in &world.monsters {
            assert!(m.pos.x.abs() <= 0.85);
            assert!(m.pos.y >= -0.32 && m.pos.y <= 0.08);
            assert!(m.pos.z >= 4.8 && m.pos.z <= 5.7);
            assert!(m.radius >= 0.12 && m.radius <= 0.18);
            let (slowest, fastest) = (0.65 * 1.08, 1.15 * 1.08);
            assert!(m.speed_z >= slowest - 1e-4 && m.speed_z <= fastest + 1e-4);
            assert_eq!(m.hp, 1);
        }
    }

    #[test]
    fn minions_crossing_near_plane_are_removed_and_counted() {
        let cfg = SimulationConfig::default();
        let mut world = World {
            monsters: vec![monster_at(0.56), monster_at(3.0)],
            ..World::default()
        };
        let breaches = world.advance_monsters(0.1, 1, &cfg);
        assert_eq!(breaches, 1);
        assert_eq!(world.monsters.len(), 1);
        assert!((world.monsters[0].pos.z - 2.9).abs() < 1e-5);
    }

    #[test]
    fn boss_hp_scales_with_difficulty() {
        let cfg = SimulationConfig::default();
        let mut world = World::default();
        let boss = world.spawn_boss(3, &cfg);
        assert_eq!(boss.max_hp, 34);
        assert_eq!(boss.hp, 34);
        assert_eq!(boss.name, "Wyrm of Ash");
    }

    #[test]
    fn boss_approaches_then_hovers() {
        let cfg = SimulationConfig::default();
        let mut world = World::default();
        world.spawn_boss(1, &cfg);
        for _ in 0..2000 {
            assert!(!world.advance_boss(1.0 / 60.0, &cfg));
        }
        let boss = world.boss.as_ref().expect("boss stays");
        assert!(boss.pos.z <= 2.4 && boss.pos.z > 2.3);
        assert!(boss.pos.x.abs() <= 0.35);
    }

    #[test]
    fn boss_in_melee_range_is_pushed_back() {
        let cfg = SimulationConfig::default();
        let mut world = World::default();
        world.spawn_boss(1, &cfg);
        if let Some(b) = world.boss.as_mut() {
            b.pos.z = 1.0;
        }
        assert!(world.advance_boss(0.016, &cfg));
        assert_eq!(world.boss.as_ref().map(|b| b.pos.z), Some(2.2));
    }

    #[test]
    fn nearest_target_prefers_closest_including_boss() {
        let cfg = SimulationConfig::default();
        let mut world = World {
            monsters: vec![monster_at(4.0), monster_at(2.0)],
            ..World::default()
        };
        let from = Vec3::new(0.0, 0.0, 1.0);
        let target = world.nearest_target(from).map(|t| t.0);
        assert_eq!(target, Some(TargetRef::Minion(1)));

        world.spawn_boss(1, &cfg);
        if let Some(b) = world.boss.as_mut() {
            b.pos = Vec3::new(0.0, 0.0, 1.5);
        }
        let target = world.nearest_target(from).map(|t| t.0);
        assert_eq!(target, Some(TargetRef::Boss));
    }

    #[test]
    fn empty_world_has_no_target() {
        assert!(World::default().nearest_target(Vec3::ONE).is_none());
    }

    #[test]
    fn bursts_spawn_preset_count_and_expire() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut world = World::default();
        world.spawn_burst(&mut rng, Vec2::new(100.0, 100.0), BurstKind::BossAsh);
        assert_eq!(world.particles.len(), 140);
        world.spawn_burst(&mut rng, Vec2::ZERO, BurstKind::Hit { boss: false });
        assert_eq!(world.particles.len(), 164);

        for _ in 0..100 {
            world.advance_particles(1.0 / 60.0);
        }
        assert!(world.particles.is_empty());
    }
}

//! One run of the game: every piece of mutable play state, advanced by `advance`.

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{CombatState, resolve_cast};
use crate::entities::{Beam, Boss, BurstKind, EntityKind, Monster};
use crate::gesture::{CastEvent, GestureRecognizer};
use crate::landmarks::{FrameDetections, HandLabel};
use crate::progression::Progression;
use crate::projection::{ScreenPoint, Viewport, project};
use crate::settings::GameConfig;
use crate::sfx::AudioCue;
use crate::simulation::{TargetRef, World};

/// Something that happened during a tick. Frontends map these to sound and UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Cast {
        hand: HandLabel,
        /// `None` when the cast found nothing to hit.
        target: Option<EntityKind>,
    },
    Hit {
        kind: EntityKind,
        lethal: bool,
        awarded: u64,
    },
    MinionBreached,
    BossStruck,
    BossSpawned {
        max_hp: i32,
    },
    BossDefeated {
        awarded: u64,
    },
    GameOver {
        score: u64,
    },
}

impl GameEvent {
    pub fn cue(&self) -> Option<AudioCue> {
        match self {
            GameEvent::Cast { .. } => Some(AudioCue::Cast),
            GameEvent::Hit {
                kind: EntityKind::Minion,
                ..
            } => Some(AudioCue::Hit),
            GameEvent::Hit {
                kind: EntityKind::Boss,
                ..
            } => Some(AudioCue::BossHit),
            GameEvent::BossSpawned { .. } => Some(AudioCue::BossSpawn),
            GameEvent::GameOver { .. } => Some(AudioCue::GameOver),
            GameEvent::MinionBreached | GameEvent::BossStruck | GameEvent::BossDefeated { .. } => {
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    pub casts: Vec<CastEvent>,
}

impl TickReport {
    pub fn cues(&self) -> impl Iterator<Item = AudioCue> + '_ {
        self.events.iter().filter_map(GameEvent::cue)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.casts.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    config: GameConfig,
    pub combat: CombatState,
    pub progression: Progression,
    pub world: World,
    recognizer: GestureRecognizer,
    rng: ChaCha8Rng,
    viewport: Viewport,
    last_frame_ms: Option<f64>,
    now_ms: f64,
}

impl Session {
    pub fn new(config: GameConfig, now_ms: f64) -> Self {
        let config = config.sanitized();
        Self {
            combat: CombatState::new(config.session.start_hp),
            progression: Progression::new(&config.progression, now_ms),
            world: World::default(),
            recognizer: GestureRecognizer::new(config.gesture),
            rng: ChaCha8Rng::seed_from_u64(config.session.seed),
            viewport: config.session.viewport,
            last_frame_ms: None,
            now_ms,
            config,
        }
    }

    /// Back to a fresh run, keeping config and viewport. The rng is reseeded so a
    /// reset run replays identically to the first.
    pub fn reset(&mut self, now_ms: f64) {
        let viewport = self.viewport;
        *self = Self::new(self.config.clone(), now_ms);
        self.viewport = viewport;
        log::info!("session reset");
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Viewport::new(viewport.width.max(1), viewport.height.max(1));
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// The next tick uses the first-tick step instead of the wall-clock gap.
    pub fn restart_clock(&mut self) {
        self.last_frame_ms = None;
    }

    pub fn project(&self, p: Vec3) -> ScreenPoint {
        project(&self.config.camera, self.viewport, p)
    }

    fn frame_dt(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_frame_ms {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
            None => self.config.session.first_tick_dt_s,
        };
        self.last_frame_ms = Some(now_ms);
        self.now_ms = now_ms;
        dt
    }

    fn burst_at(&mut self, at: Vec3, kind: BurstKind) {
        let screen: Vec2 = self.project(at).xy();
        self.world.spawn_burst(&mut self.rng, screen, kind);
    }

    fn run_spawn_policy(&mut self, now_ms: f64, events: &mut Vec<GameEvent>) {
        let progression_cfg = self.config.progression;
        let boss_active = self.world.boss.is_some();

        if self.progression.boss_due(self.combat.score, boss_active) {
            let max_hp = self
                .world
                .spawn_boss(self.progression.difficulty, &self.config.simulation)
                .max_hp;
            self.progression.on_boss_spawned(now_ms);
            log::info!(
                "boss spawned: {} hp={max_hp} difficulty={}",
                self.config.simulation.boss_name,
                self.progression.difficulty
            );
            events.push(GameEvent::BossSpawned { max_hp });
        }

        let boss_active = self.world.boss.is_some();
        if self.progression.minion_due(now_ms, boss_active, &progression_cfg) {
            let difficulty = self.progression.difficulty;
            let sim = &self.config.simulation;
            self.world.spawn_monster(&mut self.rng, difficulty, sim);
            self.progression.on_minion_spawned(now_ms, &progression_cfg);
        }
    }

    fn advance_entities(&mut self, dt: f32, now_ms: f64, events: &mut Vec<GameEvent>) {
        let combat_cfg = self.config.combat;

        let breaches =
            self.world
                .advance_monsters(dt, self.progression.difficulty, &self.config.simulation);
        for _ in 0..breaches {
            self.combat.take_damage(combat_cfg.minion_breach_damage);
            events.push(GameEvent::MinionBreached);
        }

        if self.world.advance_boss(dt, &self.config.simulation) {
            self.combat.take_damage(combat_cfg.boss_melee_damage);
            events.push(GameEvent::BossStruck);
        }

        self.world.expire_beams(now_ms);
        self.world.advance_particles(dt);
    }

    fn resolve(&mut self, cast: &CastEvent, events: &mut Vec<GameEvent>) {
        let combat_cfg = self.config.combat;
        let resolution = resolve_cast(
            &mut self.world,
            &mut self.combat,
            cast,
            self.config.simulation.beam_ttl_ms,
            &combat_cfg,
        );
        self.world.beams.push(resolution.beam);

        let Some(strike) = resolution.strike else {
            events.push(GameEvent::Cast {
                hand: cast.hand,
                target: None,
            });
            return;
        };

        let kind = match strike.target {
            TargetRef::Minion(_) => EntityKind::Minion,
            TargetRef::Boss => EntityKind::Boss,
        };
        for burst in strike.bursts() {
            self.burst_at(strike.at, burst);
        }
        events.push(GameEvent::Cast {
            hand: cast.hand,
            target: Some(kind),
        });
        events.push(GameEvent::Hit {
            kind,
            lethal: strike.lethal,
            awarded: strike.awarded,
        });
    }

    fn settle_boss(&mut self, events: &mut Vec<GameEvent>) {
        let Some(boss) = self.world.boss.take_if(|b| b.is_dead()) else {
            return;
        };

        let awarded = self.combat.award_boss_defeat(&self.config.combat);
        self.progression.on_boss_defeated(&self.config.progression);
        self.burst_at(boss.pos, BurstKind::BossAsh);
        log::info!(
            "boss defeated: {} +{awarded} score={} difficulty={} next boss at {}",
            boss.name,
            self.combat.score,
            self.progression.difficulty,
            self.progression.next_boss_score
        );
        events.push(GameEvent::BossDefeated { awarded });
    }

    /// One simulation step at `now_ms`. `detections` is `None` when the tracker had
    /// nothing for this frame; recognition is then skipped.
    pub fn advance(&mut self, now_ms: f64, detections: Option<&FrameDetections>) -> TickReport {
        let mut report = TickReport::default();
        let dt = self.frame_dt(now_ms);

        self.run_spawn_policy(now_ms, &mut report.events);
        self.advance_entities(dt, now_ms, &mut report.events);

        if let Some(frame) = detections {
            for hand in &frame.hands {
                if let Some(cast) = self.recognizer.observe(hand, now_ms) {
                    report.casts.push(cast);
                }
            }
        }
        for cast in &report.casts {
            self.resolve(cast, &mut report.events);
        }
        self.world.prune_dead_monsters();
        self.settle_boss(&mut report.events);

        self.combat.decay_combo(now_ms, &self.config.combat);
        report
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            now_ms: self.now_ms,
            combat: self.combat,
            progression: self.progression,
            monsters: self.world.monsters.clone(),
            boss: self.world.boss.clone(),
            beams: self.world.beams.clone(),
            particle_count: self.world.particles.len(),
        }
    }
}

/// Serializable view of a session, used for digests and `--json` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub now_ms: f64,
    pub combat: CombatState,
    pub progression: Progression,
    pub monsters: Vec<Monster>,
    pub boss: Option<Boss>,
    pub beams: Vec<Beam>,
    pub particle_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_uses_fixed_step() {
        let mut session = Session::new(GameConfig::default(), 0.0);
        assert!((session.frame_dt(5000.0) - 1.0 / 60.0).abs() < 1e-6);
        assert!((session.frame_dt(5100.0) - 0.1).abs() < 1e-6);
        session.restart_clock();
        assert!((session.frame_dt(9000.0) - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn minions_spawn_on_cadence() {
        let mut session = Session::new(GameConfig::default(), 0.0);
        session.advance(800.0, None);
        assert!(session.world.monsters.is_empty());
        session.advance(851.0, None);
        assert_eq!(session.world.monsters.len(), 1);
        assert_eq!(session.progression.last_spawn_ms, 851.0);
    }

    #[test]
    fn reset_replays_the_same_spawns() {
        let mut session = Session::new(GameConfig::default().with_seed(11), 0.0);
        session.advance(900.0, None);
        let first = session.world.monsters.clone();

        session.combat.score = 500;
        session.reset(0.0);
        assert_eq!(session.combat.score, 0);
        session.advance(900.0, None);
        assert_eq!(session.world.monsters, first);
    }

    #[test]
    fn event_cues_follow_target_kind() {
        let boss_hit = GameEvent::Hit {
            kind: EntityKind::Boss,
            lethal: false,
            awarded: 10,
        };
        assert_eq!(boss_hit.cue(), Some(AudioCue::BossHit));
        assert_eq!(GameEvent::MinionBreached.cue(), None);
    }

    #[test]
    fn viewport_never_collapses() {
        let mut session = Session::new(GameConfig::default(), 0.0);
        session.set_viewport(Viewport::new(0, 0));
        assert_eq!(session.viewport(), Viewport::new(1, 1));
    }
}

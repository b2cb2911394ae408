//! Draw lists handed to an external renderer.
//!
//! Everything here is already projected; a renderer only needs pixels.

use serde::{Deserialize, Serialize};

use crate::entities::{EntityKind, Particle};
use crate::phase::GamePhase;
use crate::projection::{Camera, ScreenPoint, Viewport};
use crate::session::Session;

/// Bosses read bigger than their hit radius.
const BOSS_SPRITE_SCALE: f32 = 1.35;
/// Beams never get thinner than this fraction of their near width.
const MIN_BEAM_SCALE: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySprite {
    pub kind: EntityKind,
    pub at: ScreenPoint,
    pub radius_px: f32,
    /// Boss only; 1.0 for minions.
    pub hp_ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSprite {
    pub from: ScreenPoint,
    pub to: ScreenPoint,
    pub alpha: f32,
    pub width_scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame<'a> {
    pub now_ms: f64,
    pub phase: GamePhase,
    pub camera: Camera,
    pub viewport: Viewport,
    /// Far to near.
    pub enemies: Vec<EnemySprite>,
    pub beams: Vec<BeamSprite>,
    pub particles: &'a [Particle],
}

impl<'a> RenderFrame<'a> {
    pub fn build(session: &'a Session, phase: GamePhase) -> Self {
        let viewport = session.viewport();
        let base = viewport.width.min(viewport.height) as f32;
        let now_ms = session.now_ms();

        let minions = session.world.monsters.iter().map(|m| {
            let at = session.project(m.pos);
            EnemySprite {
                kind: EntityKind::Minion,
                at,
                radius_px: m.radius * base * at.scale,
                hp_ratio: 1.0,
            }
        });
        let boss = session.world.boss.iter().map(|b| {
            let at = session.project(b.pos);
            EnemySprite {
                kind: EntityKind::Boss,
                at,
                radius_px: b.radius * base * at.scale * BOSS_SPRITE_SCALE,
                hp_ratio: b.hp_ratio(),
            }
        });
        let mut enemies: Vec<EnemySprite> = minions.chain(boss).collect();
        enemies.sort_by(|a, b| b.at.z.total_cmp(&a.at.z));

        let beams = session
            .world
            .beams
            .iter()
            .map(|beam| {
                let from = session.project(beam.from);
                BeamSprite {
                    from,
                    to: session.project(beam.to),
                    alpha: beam.alpha(now_ms),
                    width_scale: from.scale.max(MIN_BEAM_SCALE),
                }
            })
            .collect();

        Self {
            now_ms,
            phase,
            camera: session.config().camera,
            viewport,
            enemies,
            beams,
            particles: &session.world.particles,
        }
    }
}

/// The external drawing surface. Called once per published frame.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame<'_>);
}

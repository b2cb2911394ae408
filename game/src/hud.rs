use serde::{Deserialize, Serialize};

use crate::entities::BossPhase;
use crate::phase::GamePhase;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hint {
    Ready,
    AcquisitionFailed,
    Playing,
    Paused,
    Fallen,
}

impl Hint {
    pub fn for_phase(phase: GamePhase, acquisition_failed: bool) -> Self {
        match phase {
            GamePhase::Idle if acquisition_failed => Hint::AcquisitionFailed,
            GamePhase::Idle => Hint::Ready,
            GamePhase::Running { paused: false } => Hint::Playing,
            GamePhase::Running { paused: true } => Hint::Paused,
            GamePhase::Ended => Hint::Fallen,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Hint::Ready => {
                "Ready. Press Start, raise a hand to the camera and push forward to cast."
            }
            Hint::AcquisitionFailed => {
                "Could not start: allow camera access and serve the page over https or localhost."
            }
            Hint::Playing => "Push toward the camera while your hand grows in view to cast.",
            Hint::Paused => "Paused. Resume when ready.",
            Hint::Fallen => "You have fallen. Press Reset to try again.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossHud {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub hp_ratio: f32,
    pub phase: BossPhase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub streak: u32,
    pub hp: i32,
    pub combo: f32,
    pub combo_label: String,
    pub difficulty: u32,
    pub boss: Option<BossHud>,
    pub hint: Hint,
}

impl HudSnapshot {
    pub fn build(session: &Session, phase: GamePhase, acquisition_failed: bool) -> Self {
        let combat = &session.combat;
        Self {
            phase,
            score: combat.score,
            streak: combat.streak,
            hp: combat.hp,
            combo: combat.combo,
            combo_label: combat.combo_label(),
            difficulty: session.progression.difficulty,
            boss: session.world.boss.as_ref().map(|b| BossHud {
                name: b.name.clone(),
                hp: b.hp,
                max_hp: b.max_hp,
                hp_ratio: b.hp_ratio(),
                phase: b.phase(),
            }),
            hint: Hint::for_phase(phase, acquisition_failed),
        }
    }

    pub fn hint_text(&self) -> &'static str {
        self.hint.text()
    }

    /// One status line, as the headless binary prints it.
    pub fn status_line(&self) -> String {
        let mut line = format!(
            "[{}] score {} | streak {} | hp {} | combo {}",
            self.phase.label(),
            self.score,
            self.streak,
            self.hp,
            self.combo_label
        );
        if let Some(boss) = &self.boss {
            line.push_str(&format!(
                " | {} {}/{} (phase {})",
                boss.name,
                boss.hp,
                boss.max_hp,
                boss.phase.number()
            ));
        }
        line
    }
}

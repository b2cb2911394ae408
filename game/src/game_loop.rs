use engine::GameLogic;

use crate::error::AcquisitionError;
use crate::hud::HudSnapshot;
use crate::landmarks::{FrameDetections, LandmarkSource};
use crate::phase::{GamePhase, PhaseEffect, PhaseEvent};
use crate::render::{RenderFrame, Renderer};
use crate::session::{GameEvent, Session, TickReport};
use crate::settings::GameConfig;
use crate::sfx::AudioFeedback;

/// The phase machine wrapped around a session. This is the whole control surface:
/// start, pause, reset and one `tick` per frame.
#[derive(Debug, Clone)]
pub struct Game {
    phase: GamePhase,
    session: Session,
    acquisition_failed: bool,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            phase: GamePhase::default(),
            session: Session::new(config, 0.0),
            acquisition_failed: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn apply(&mut self, event: PhaseEvent, now_ms: f64) {
        let (next, effect) = self.phase.handle(event);
        if next != self.phase {
            let (from, to) = (self.phase.label(), next.label());
            log::info!("phase {from} -> {to} ({event:?})");
        }
        self.phase = next;
        match effect {
            PhaseEffect::None => {}
            PhaseEffect::ResetSession => self.session.reset(now_ms),
            PhaseEffect::RestartClock => self.session.restart_clock(),
        }
    }

    /// Enters play once the camera and tracker are up. A failed acquisition keeps
    /// the game idle; calling `start` again retries.
    pub fn start(
        &mut self,
        now_ms: f64,
        acquisition: Result<(), AcquisitionError>,
    ) -> Result<(), AcquisitionError> {
        if let Err(err) = acquisition {
            log::warn!("start failed: {err}");
            self.acquisition_failed = true;
            return Err(err);
        }
        self.acquisition_failed = false;
        self.apply(PhaseEvent::Started, now_ms);
        Ok(())
    }

    pub fn toggle_pause(&mut self) {
        let now_ms = self.session.now_ms();
        self.apply(PhaseEvent::TogglePause, now_ms);
    }

    pub fn reset(&mut self, now_ms: f64) {
        self.apply(PhaseEvent::Reset, now_ms);
    }

    /// Advances one frame. Does nothing unless the game is running and unpaused.
    pub fn tick(&mut self, now_ms: f64, detections: Option<&FrameDetections>) -> TickReport {
        if !self.phase.is_playing() {
            return TickReport::default();
        }

        let mut report = self.session.advance(now_ms, detections);
        if self.session.combat.is_defeated() {
            let score = self.session.combat.score;
            log::info!("game over: score={score}");
            report.events.push(GameEvent::GameOver { score });
            self.apply(PhaseEvent::PlayerDefeated, now_ms);
        }
        report
    }

    /// Like [`Game::tick`], pulling this frame's detections from `source`. The
    /// source is not consulted while paused or ended.
    pub fn tick_from<S: LandmarkSource + ?Sized>(
        &mut self,
        now_ms: f64,
        source: &mut S,
    ) -> TickReport {
        if !self.phase.is_playing() {
            return TickReport::default();
        }
        let detections = source.detect(now_ms);
        self.tick(now_ms, detections.as_ref())
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::build(&self.session, self.phase, self.acquisition_failed)
    }

    pub fn render_frame(&self) -> RenderFrame<'_> {
        RenderFrame::build(&self.session, self.phase)
    }

    /// Hands the current frame to the renderer and the tick's cues to the audio sink.
    pub fn publish<R, A>(&self, report: &TickReport, renderer: &mut R, audio: &mut A)
    where
        R: Renderer + ?Sized,
        A: AudioFeedback + ?Sized,
    {
        renderer.render(&self.render_frame());
        for cue in report.cues() {
            audio.play(cue);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpellInput {
    Start {
        now_ms: f64,
        acquisition: Result<(), AcquisitionError>,
    },
    TogglePause,
    Reset {
        now_ms: f64,
    },
    Frame {
        now_ms: f64,
        detections: Option<FrameDetections>,
    },
}

impl SpellInput {
    pub fn frame(now_ms: f64, detections: Option<FrameDetections>) -> Self {
        SpellInput::Frame { now_ms, detections }
    }
}

/// Frame-stepped adapter so the engine's headless runner can drive a [`Game`].
#[derive(Debug, Clone, Default)]
pub struct SpellcastLogic {
    config: GameConfig,
}

impl SpellcastLogic {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

impl GameLogic for SpellcastLogic {
    type State = Game;
    type Input = SpellInput;
    type Output = TickReport;

    fn initial_state(&self) -> Self::State {
        Game::new(self.config.clone())
    }

    fn step(&self, state: &mut Self::State, input: Self::Input) -> Self::Output {
        match input {
            SpellInput::Start {
                now_ms,
                acquisition,
            } => {
                if let Err(err) = state.start(now_ms, acquisition) {
                    log::debug!(
                        "runner start at {now_ms:.0}ms rejected: {err}; phase stays {}",
                        state.phase().label()
                    );
                }
                TickReport::default()
            }
            SpellInput::TogglePause => {
                state.toggle_pause();
                TickReport::default()
            }
            SpellInput::Reset { now_ms } => {
                state.reset(now_ms);
                TickReport::default()
            }
            SpellInput::Frame { now_ms, detections } => state.tick(now_ms, detections.as_ref()),
        }
    }
}

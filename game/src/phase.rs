use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the camera and tracker to come up.
    #[default]
    Idle,
    Running {
        paused: bool,
    },
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// Input acquisition succeeded.
    Started,
    TogglePause,
    PlayerDefeated,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEffect {
    None,
    ResetSession,
    /// The next tick must not integrate the time spent paused.
    RestartClock,
}

impl GamePhase {
    /// Pure transition function for the phase state machine.
    ///
    /// Session side-effects are reported via `PhaseEffect` so callers stay
    /// deterministic and easy to test.
    pub fn handle(self, event: PhaseEvent) -> (GamePhase, PhaseEffect) {
        match (self, event) {
            (GamePhase::Idle, PhaseEvent::Started) => (
                GamePhase::Running { paused: false },
                PhaseEffect::ResetSession,
            ),

            (GamePhase::Running { paused: true }, PhaseEvent::TogglePause) => (
                GamePhase::Running { paused: false },
                PhaseEffect::RestartClock,
            ),
            (GamePhase::Running { paused: false }, PhaseEvent::TogglePause) => {
                (GamePhase::Running { paused: true }, PhaseEffect::None)
            }
            (GamePhase::Running { .. }, PhaseEvent::PlayerDefeated) => {
                (GamePhase::Ended, PhaseEffect::None)
            }

            (GamePhase::Running { .. } | GamePhase::Ended, PhaseEvent::Reset) => (
                GamePhase::Running { paused: false },
                PhaseEffect::ResetSession,
            ),

            (state, _) => (state, PhaseEffect::None),
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, GamePhase::Running { .. })
    }

    pub fn is_playing(self) -> bool {
        matches!(self, GamePhase::Running { paused: false })
    }

    pub fn is_paused(self) -> bool {
        matches!(self, GamePhase::Running { paused: true })
    }

    pub fn label(self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running { paused: false } => "running",
            GamePhase::Running { paused: true } => "paused",
            GamePhase::Ended => "ended",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phase_is_idle() {
        assert_eq!(GamePhase::default(), GamePhase::Idle);
    }

    #[test]
    fn start_from_idle_runs_fresh_session() {
        assert_eq!(
            GamePhase::Idle.handle(PhaseEvent::Started),
            (GamePhase::Running { paused: false }, PhaseEffect::ResetSession)
        );
    }

    #[test]
    fn pause_round_trip_restarts_clock_on_resume() {
        let (paused, effect) = GamePhase::Running { paused: false }.handle(PhaseEvent::TogglePause);
        assert_eq!(paused, GamePhase::Running { paused: true });
        assert_eq!(effect, PhaseEffect::None);
        assert_eq!(
            paused.handle(PhaseEvent::TogglePause),
            (GamePhase::Running { paused: false }, PhaseEffect::RestartClock)
        );
    }

    #[test]
    fn defeat_ends_the_run_even_while_paused() {
        for paused in [false, true] {
            assert_eq!(
                GamePhase::Running { paused }.handle(PhaseEvent::PlayerDefeated),
                (GamePhase::Ended, PhaseEffect::None)
            );
        }
    }

    #[test]
    fn pause_is_ignored_outside_running() {
        for phase in [GamePhase::Idle, GamePhase::Ended] {
            assert_eq!(
                phase.handle(PhaseEvent::TogglePause),
                (phase, PhaseEffect::None)
            );
        }
    }

    #[test]
    fn reset_restarts_running_and_ended() {
        for phase in [
            GamePhase::Running { paused: true },
            GamePhase::Running { paused: false },
            GamePhase::Ended,
        ] {
            assert_eq!(
                phase.handle(PhaseEvent::Reset),
                (GamePhase::Running { paused: false }, PhaseEffect::ResetSession)
            );
        }
    }

    #[test]
    fn idle_ignores_reset_and_repeated_start_is_ignored() {
        assert_eq!(
            GamePhase::Idle.handle(PhaseEvent::Reset),
            (GamePhase::Idle, PhaseEffect::None)
        );
        let running = GamePhase::Running { paused: false };
        assert_eq!(
            running.handle(PhaseEvent::Started),
            (running, PhaseEffect::None)
        );
        assert_eq!(
            GamePhase::Ended.handle(PhaseEvent::Started),
            (GamePhase::Ended, PhaseEffect::None)
        );
    }
}

//! Audio cues and the tone recipes an external synthesizer plays for them.

use serde::{Deserialize, Serialize};

/// Per-cue output gains (0.0..=1.0), before the player's master volume.
pub const CAST_SFX_GAIN: f32 = 0.07;
pub const HIT_SFX_GAIN: f32 = 0.08;
pub const BOSS_HIT_SFX_GAIN: f32 = 0.09;
pub const BOSS_SPAWN_SFX_GAIN: f32 = 0.10;
pub const GAME_OVER_SFX_GAIN: f32 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    Cast,
    Hit,
    BossHit,
    BossSpawn,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayer {
    pub duration_s: f32,
    pub gain: f32,
}

/// One oscillator sweep with an optional noise burst on top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    pub waveform: Waveform,
    pub start_hz: f32,
    /// Exponential sweep target.
    pub end_hz: f32,
    pub duration_s: f32,
    pub gain: f32,
    pub noise: Option<NoiseLayer>,
}

impl AudioCue {
    pub const ALL: [AudioCue; 5] = [
        AudioCue::Cast,
        AudioCue::Hit,
        AudioCue::BossHit,
        AudioCue::BossSpawn,
        AudioCue::GameOver,
    ];

    pub fn gain(self) -> f32 {
        match self {
            AudioCue::Cast => CAST_SFX_GAIN,
            AudioCue::Hit => HIT_SFX_GAIN,
            AudioCue::BossHit => BOSS_HIT_SFX_GAIN,
            AudioCue::BossSpawn => BOSS_SPAWN_SFX_GAIN,
            AudioCue::GameOver => GAME_OVER_SFX_GAIN,
        }
    }

    pub fn tone(self) -> ToneSpec {
        let (waveform, start_hz, end_hz, duration_s, noise) = match self {
            AudioCue::Cast => (Waveform::Triangle, 520.0, 1100.0, 0.07, None),
            AudioCue::Hit => (
                Waveform::Sine,
                720.0,
                520.0,
                0.08,
                Some(NoiseLayer {
                    duration_s: 0.06,
                    gain: 0.05,
                }),
            ),
            AudioCue::BossHit => (Waveform::Square, 180.0, 130.0, 0.12, None),
            AudioCue::BossSpawn => (Waveform::Sawtooth, 90.0, 240.0, 0.22, None),
            AudioCue::GameOver => (
                Waveform::Sawtooth,
                220.0,
                70.0,
                0.35,
                Some(NoiseLayer {
                    duration_s: 0.18,
                    gain: 0.08,
                }),
            ),
        };
        ToneSpec {
            waveform,
            start_hz,
            end_hz,
            duration_s,
            gain: self.gain(),
            noise,
        }
    }
}

/// Fire-and-forget audio sink. Implementations must not block the tick.
pub trait AudioFeedback {
    fn play(&mut self, cue: AudioCue);
}

/// Collects cues in order; used by the headless binary and tests.
impl AudioFeedback for Vec<AudioCue> {
    fn play(&mut self, cue: AudioCue) {
        self.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gains_are_in_unit_range_and_rise_with_severity() {
        for cue in AudioCue::ALL {
            let gain = cue.gain();
            assert!((0.0..=1.0).contains(&gain), "{cue:?} gain {gain}");
            assert_eq!(cue.tone().gain, gain);
        }
        assert!(CAST_SFX_GAIN < GAME_OVER_SFX_GAIN);
    }

    #[test]
    fn boss_spawn_sweeps_up_and_game_over_sweeps_down() {
        let spawn = AudioCue::BossSpawn.tone();
        assert!(spawn.end_hz > spawn.start_hz);
        let over = AudioCue::GameOver.tone();
        assert!(over.end_hz < over.start_hz);
        assert_eq!(over.noise.map(|n| n.duration_s), Some(0.18));
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink: Vec<AudioCue> = Vec::new();
        sink.play(AudioCue::Cast);
        sink.play(AudioCue::Hit);
        assert_eq!(sink, vec![AudioCue::Cast, AudioCue::Hit]);
    }
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::combat::CombatConfig;
use crate::gesture::GestureConfig;
use crate::progression::ProgressionConfig;
use crate::projection::{Camera, Viewport};
use crate::simulation::SimulationConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub mute_all: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            mute_all: false,
        }
    }
}

impl AudioSettings {
    pub fn clamp(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self
    }

    /// Final gain for a cue whose own gain is `cue_gain`.
    pub fn effective_gain(self, cue_gain: f32) -> f32 {
        if self.mute_all {
            0.0
        } else {
            self.master_volume * cue_gain
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    pub start_hp: i32,
    /// Seed for spawn positions and particle jitter.
    pub seed: u64,
    pub viewport: Viewport,
    /// Step used for the first tick after start, reset or resume.
    pub first_tick_dt_s: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            start_hp: 10,
            seed: 0x5eed_ca57,
            viewport: Viewport::default(),
            first_tick_dt_s: 1.0 / 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub combat: CombatConfig,
    #[serde(default)]
    pub progression: ProgressionConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub camera: Camera,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub audio: AudioSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            gesture: GestureConfig::default(),
            combat: CombatConfig::default(),
            progression: ProgressionConfig::default(),
            simulation: SimulationConfig::default(),
            camera: Camera::default(),
            session: SessionSettings::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl GameConfig {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.gesture = self.gesture.sanitized();
        self.combat = self.combat.sanitized();
        self.progression = self.progression.sanitized();
        self.simulation = self.simulation.sanitized();
        self.camera = self.camera.sanitized();
        self.audio = self.audio.clamp();
        self.session.start_hp = self.session.start_hp.max(1);
        self.session.viewport.width = self.session.viewport.width.max(1);
        self.session.viewport.height = self.session.viewport.height.max(1);
        self.session.first_tick_dt_s = self.session.first_tick_dt_s.clamp(0.0, 1.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.session.seed = seed;
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("SPELLCAST_CONFIG_PATH") {
            return Self::new(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("spellcast");
        path.push("config.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield defaults; a broken config never blocks play.
    pub fn load(&self) -> GameConfig {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    log::warn!("config {}: {err}; using defaults", self.path.display());
                }
                return GameConfig::default();
            }
        };
        match serde_json::from_slice::<GameConfig>(&bytes) {
            Ok(config) => config.sanitized(),
            Err(err) => {
                log::warn!(
                    "config {} is invalid: {err}; using defaults",
                    self.path.display()
                );
                GameConfig::default()
            }
        }
    }

    pub fn save(&self, config: &GameConfig) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_config_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("spellcast_{tag}_{nanos}"))
            .join("config.json")
    }

    #[test]
    fn audio_gain_respects_mute_and_master() {
        let mut audio = AudioSettings {
            master_volume: 0.5,
            mute_all: false,
        };
        assert!((audio.effective_gain(0.08) - 0.04).abs() < 1e-6);
        audio.mute_all = true;
        assert_eq!(audio.effective_gain(0.08), 0.0);
    }

    #[test]
    fn sanitized_clamps_expected_fields() {
        let mut config = GameConfig {
            version: 99,
            ..GameConfig::default()
        };
        config.audio.master_volume = 3.0;
        config.session.start_hp = -4;
        config.combat.combo_max = 0.5;
        config.progression.min_spawn_interval_ms = 900.0;
        let config = config.sanitized();

        assert_eq!(config.version, 1);
        assert_eq!(config.audio.master_volume, 1.0);
        assert_eq!(config.session.start_hp, 1);
        assert_eq!(config.combat.combo_max, 1.0);
        assert_eq!(config.progression.spawn_interval_ms, 900.0);
    }

    #[test]
    fn serde_defaults_fill_missing_sections_and_fields() {
        let json = r#"{"version":1,"gesture":{"cooldown_ms":300.0},"session":{"seed":42}}"#;
        let parsed: GameConfig = serde_json::from_str(json).expect("parse config");
        assert_eq!(parsed.gesture.cooldown_ms, 300.0);
        assert_eq!(parsed.gesture.area_jump, GestureConfig::default().area_jump);
        assert_eq!(parsed.session.seed, 42);
        assert_eq!(parsed.session.start_hp, 10);
        assert_eq!(parsed.combat, CombatConfig::default());
        assert_eq!(parsed.camera, Camera::default());
    }

    #[test]
    fn store_round_trips_and_falls_back_on_garbage() {
        let path = temp_config_path("store");
        let store = ConfigStore::new(&path);
        assert_eq!(store.load(), GameConfig::default());

        let config = GameConfig::default().with_seed(7);
        store.save(&config).expect("save config");
        assert_eq!(store.load(), config);

        fs::write(&path, b"{not json").expect("overwrite");
        assert_eq!(store.load(), GameConfig::default());

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }
}

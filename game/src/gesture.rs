//! Push-gesture recognition.
//!
//! A cast fires when the palm moves fast along the depth axis *and* its 2D
//! footprint grows at the same time. The velocity test accepts either sign
//! because the tracker's depth convention is not pinned down; the area jump is
//! what confirms the hand actually moved toward the camera.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::landmarks::{HandDetection, HandLabel};

/// Minimum elapsed time between two samples, in seconds.
const MIN_SAMPLE_DT_S: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub cooldown_ms: f64,
    /// |z velocity| above this is strong regardless of sign (world units / s).
    pub z_vel_abs: f32,
    /// Signed z velocity beyond ±this is strong.
    pub z_vel_signed: f32,
    /// Palm area ratio (current / previous) that confirms an approach.
    pub area_jump: f32,
    /// World-to-scene lateral/vertical gain.
    pub scene_gain: f32,
    pub scene_z_base: f32,
    pub scene_z_gain: f32,
    pub scene_z_min: f32,
    pub scene_z_max: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 280.0,
            z_vel_abs: 1.0,
            z_vel_signed: 0.55,
            area_jump: 1.14,
            scene_gain: 2.2,
            scene_z_base: 1.2,
            scene_z_gain: 2.0,
            scene_z_min: 0.35,
            scene_z_max: 3.2,
        }
    }
}

impl GestureConfig {
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.cooldown_ms.is_finite() && self.cooldown_ms >= 0.0) {
            self.cooldown_ms = defaults.cooldown_ms;
        }
        self.z_vel_abs = self.z_vel_abs.abs();
        self.z_vel_signed = self.z_vel_signed.abs();
        self.area_jump = self.area_jump.max(1.0);
        if self.scene_z_min > self.scene_z_max {
            std::mem::swap(&mut self.scene_z_min, &mut self.scene_z_max);
        }
        self
    }

    /// Either-sign velocity test. With `z_vel_signed < z_vel_abs` the signed
    /// clauses decide; the absolute clause only matters if tuning inverts that.
    pub fn is_strong_z_velocity(&self, z_vel: f32) -> bool {
        z_vel.abs() > self.z_vel_abs || z_vel < -self.z_vel_signed || z_vel > self.z_vel_signed
    }

    /// Maps a world-space palm center into scene space. The feed is mirrored, so x
    /// flips; y flips so up is negative; depth is remapped into a comfortable band.
    pub fn world_to_scene(&self, palm: Vec3) -> Vec3 {
        let depth = self.scene_z_base + self.scene_z_gain * -palm.z;
        Vec3::new(
            -palm.x * self.scene_gain,
            -palm.y * self.scene_gain,
            depth.clamp(self.scene_z_min, self.scene_z_max),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CastEvent {
    pub hand: HandLabel,
    /// Scene-space origin of the beam.
    pub origin: Vec3,
    pub at_ms: f64,
}

/// Per-hand tracking memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HandState {
    pub last_cast_ms: f64,
    /// `None` until the hand has produced a baseline sample.
    pub last_z: Option<f32>,
    pub last_ts_ms: f64,
    pub last_area: f32,
}

impl HandState {
    pub fn has_baseline(&self) -> bool {
        self.last_z.is_some()
    }

    fn record(&mut self, z: f32, now_ms: f64, area: f32) {
        self.last_z = Some(z);
        self.last_ts_ms = now_ms;
        self.last_area = area;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureRecognizer {
    config: GestureConfig,
    left: HandState,
    right: HandState,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            left: HandState::default(),
            right: HandState::default(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn hand(&self, label: HandLabel) -> &HandState {
        match label {
            HandLabel::Left => &self.left,
            HandLabel::Right => &self.right,
        }
    }

    fn hand_mut(&mut self, label: HandLabel) -> &mut HandState {
        match label {
            HandLabel::Left => &mut self.left,
            HandLabel::Right => &mut self.right,
        }
    }

    pub fn reset(&mut self) {
        self.left = HandState::default();
        self.right = HandState::default();
    }

    /// Feeds one frame of one hand. Returns a cast at most once per call.
    pub fn observe(&mut self, detection: &HandDetection, now_ms: f64) -> Option<CastEvent> {
        let config = self.config;
        let area = detection.palm_area_2d();
        // No depth, no gesture.
        let palm = detection.palm_world_center()?;
        let z = palm.z;

        let state = self.hand_mut(detection.label);
        let Some(last_z) = state.last_z else {
            state.last_cast_ms = 0.0;
            state.record(z, now_ms, area);
            return None;
        };

        let elapsed_s = ((now_ms - state.last_ts_ms) / 1000.0) as f32;
        let dt = elapsed_s.max(MIN_SAMPLE_DT_S);
        let z_vel = (z - last_z) / dt;
        let area_ratio = if state.last_area > 0.0 {
            area / state.last_area
        } else {
            1.0
        };

        let cooldown_ok = now_ms - state.last_cast_ms > config.cooldown_ms;
        let fired = cooldown_ok
            && config.is_strong_z_velocity(z_vel)
            && area_ratio > config.area_jump;

        let cast = if fired {
            state.last_cast_ms = now_ms;
            Some(CastEvent {
                hand: detection.label,
                origin: config.world_to_scene(palm),
                at_ms: now_ms,
            })
        } else {
            None
        };

        state.record(z, now_ms, area);
        if let Some(cast) = &cast {
            log::debug!(
                "cast: hand={} z_vel={z_vel:.2} area_ratio={area_ratio:.2} origin={}",
                cast.hand.name(),
                cast.origin
            );
        }
        cast
    }
}

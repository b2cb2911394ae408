//! Pseudo-3D camera: scene space (z grows away from the player) to screen pixels.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective falloff per scene unit of depth.
const DEPTH_SPREAD: f32 = 260.0;
const LATERAL_SPAN: f32 = 0.55;
const VERTICAL_SPAN: f32 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Bigger values flatten the perspective.
    pub fov: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Vertical anchor of the vanishing point, as a fraction of screen height.
    pub horizon: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 520.0,
            z_near: 0.25,
            z_far: 6.0,
            horizon: 0.55,
        }
    }
}

impl Camera {
    pub fn sanitized(mut self) -> Self {
        if !(self.fov.is_finite() && self.fov > 1.0) {
            self.fov = 520.0;
        }
        self.z_near = self.z_near.max(0.01);
        self.z_far = self.z_far.max(self.z_near + 0.01);
        self.horizon = self.horizon.clamp(0.0, 1.0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    /// Perspective scale in `(0, 1]`; multiply scene radii by it.
    pub scale: f32,
    /// Depth after near-plane clamping.
    pub z: f32,
}

impl ScreenPoint {
    pub fn xy(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

pub fn project(camera: &Camera, viewport: Viewport, p: Vec3) -> ScreenPoint {
    let w = viewport.width as f32;
    let h = viewport.height as f32;
    let z = p.z.max(camera.z_near);
    let s = camera.fov / (camera.fov + z * DEPTH_SPREAD);

    ScreenPoint {
        x: w * 0.5 + p.x * w * LATERAL_SPAN * s,
        y: h * camera.horizon + p.y * h * VERTICAL_SPAN * s,
        scale: s,
        z,
    }
}

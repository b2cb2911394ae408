//! Synthetic hands for tests and the headless demo.

use glam::{Vec2, Vec3};

use crate::game_loop::SpellInput;
use crate::landmarks::{
    FrameDetections, HandDetection, HandLabel, INDEX_MCP, LANDMARK_COUNT, MIDDLE_MCP, PINKY_MCP,
    RING_MCP, RecordedSource, WRIST,
};

/// Palm depth while resting.
pub const REST_Z: f32 = 0.0;
/// Depth and apparent size change of one push; fast enough and big enough to cast
/// at 60 fps.
pub const PUSH_DZ: f32 = -0.05;
pub const PUSH_SCALE: f32 = 1.2;

/// A hand centered in the image with the given palm scale and world palm center.
pub fn hand_pose(label: HandLabel, scale: f32, palm: Vec3) -> HandDetection {
    let center = Vec2::new(0.5, 0.5);
    let mut landmarks = [center; LANDMARK_COUNT];
    landmarks[WRIST] = center + Vec2::new(0.0, 0.10 * scale);
    landmarks[INDEX_MCP] = center + Vec2::new(-0.05 * scale, 0.0);
    landmarks[MIDDLE_MCP] = center;
    landmarks[RING_MCP] = center + Vec2::new(0.025 * scale, 0.0);
    landmarks[PINKY_MCP] = center + Vec2::new(0.05 * scale, 0.0);

    HandDetection::new(label, landmarks, Some([palm; LANDMARK_COUNT]))
}

pub fn resting_hand(label: HandLabel, lateral: Vec2) -> HandDetection {
    hand_pose(label, 1.0, lateral.extend(REST_Z))
}

pub fn pushed_hand(label: HandLabel, lateral: Vec2) -> HandDetection {
    hand_pose(label, PUSH_SCALE, lateral.extend(REST_Z + PUSH_DZ))
}

/// Frame timing and push cadence for a scripted run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushScript {
    pub label: HandLabel,
    pub lateral: Vec2,
    pub frame_ms: f64,
    /// A push happens on the first frame at or after each multiple of this.
    pub push_every_ms: f64,
}

impl Default for PushScript {
    fn default() -> Self {
        Self {
            label: HandLabel::Right,
            lateral: Vec2::ZERO,
            frame_ms: 1000.0 / 60.0,
            push_every_ms: 400.0,
        }
    }
}

impl PushScript {
    /// Detections for `frames` frames starting at `start_ms`. The hand rests
    /// between pushes, so every push sees a fresh baseline.
    pub fn frames(&self, start_ms: f64, frames: usize) -> Vec<(f64, FrameDetections)> {
        let mut next_push = start_ms + self.push_every_ms;
        let mut out = Vec::with_capacity(frames);
        for i in 0..frames {
            let now_ms = start_ms + (i + 1) as f64 * self.frame_ms;
            let hand = if now_ms >= next_push {
                next_push += self.push_every_ms;
                pushed_hand(self.label, self.lateral)
            } else {
                resting_hand(self.label, self.lateral)
            };
            out.push((now_ms, FrameDetections::new(vec![hand])));
        }
        out
    }

    pub fn source(&self, start_ms: f64, frames: usize) -> RecordedSource {
        RecordedSource::from_frames(self.frames(start_ms, frames))
    }

    /// Start followed by one frame input per scripted frame.
    pub fn inputs(&self, frames: usize) -> Vec<SpellInput> {
        let mut inputs = vec![SpellInput::Start {
            now_ms: 0.0,
            acquisition: Ok(()),
        }];
        inputs.extend(
            self.frames(0.0, frames)
                .into_iter()
                .map(|(now_ms, hands)| SpellInput::frame(now_ms, Some(hands))),
        );
        inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureRecognizer;

    #[test]
    fn scripted_pushes_cast_once_per_push() {
        let script = PushScript::default();
        let mut recognizer = GestureRecognizer::default();
        let casts: Vec<f64> = script
            .frames(0.0, 110)
            .iter()
            .filter_map(|(t, frame)| recognizer.observe(&frame.hands[0], *t))
            .map(|cast| cast.at_ms)
            .collect();
        // About 1.8 s at one push per 400 ms.
        assert_eq!(casts.len(), 4);
        assert!(casts.windows(2).all(|w| w[1] - w[0] > 280.0));
    }

    #[test]
    fn pushed_pose_grows_and_moves_closer() {
        let rest = resting_hand(HandLabel::Left, Vec2::ZERO);
        let push = pushed_hand(HandLabel::Left, Vec2::ZERO);
        assert!(push.palm_area_2d() / rest.palm_area_2d() > 1.14);
        assert!(push.palm_world_z() < rest.palm_world_z());
    }
}

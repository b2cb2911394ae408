//! Hand-tracker input model.
//!
//! A tracker reports, per detected hand, 21 normalized image-space landmarks and
//! (optionally) 21 metric world-space landmarks. Only the wrist and the four
//! finger-base joints matter to the gesture logic.

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{LandmarkError, RecordingError};

pub const LANDMARK_COUNT: usize = 21;
/// Values per landmark in flat tracker buffers (x, y, z).
pub const LANDMARK_STRIDE: usize = 3;

pub const WRIST: usize = 0;
pub const INDEX_MCP: usize = 5;
pub const MIDDLE_MCP: usize = 9;
pub const RING_MCP: usize = 13;
pub const PINKY_MCP: usize = 17;

/// Wrist plus the four finger-base joints.
pub const PALM_ANCHORS: [usize; 5] = [WRIST, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandLabel {
    Left,
    Right,
}

impl HandLabel {
    /// Maps a tracker handedness category. Anything unrecognized counts as the right hand.
    pub fn from_category(name: &str) -> Self {
        if name.eq_ignore_ascii_case("left") {
            HandLabel::Left
        } else {
            HandLabel::Right
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HandLabel::Left => "Left",
            HandLabel::Right => "Right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandDetection {
    pub label: HandLabel,
    pub landmarks: [Vec2; LANDMARK_COUNT],
    #[serde(default)]
    pub world: Option<[Vec3; LANDMARK_COUNT]>,
}

impl HandDetection {
    pub fn new(
        label: HandLabel,
        landmarks: [Vec2; LANDMARK_COUNT],
        world: Option<[Vec3; LANDMARK_COUNT]>,
    ) -> Self {
        Self {
            label,
            landmarks,
            world,
        }
    }

    /// Builds a detection from flat `[x, y, z, x, y, z, ...]` buffers as handed over by a
    /// tracker. The image-space z is ignored.
    pub fn from_flat(
        label: HandLabel,
        image: &[f32],
        world: Option<&[f32]>,
    ) -> Result<Self, LandmarkError> {
        let image = read_points(image)?;
        let landmarks = image.map(|p| p.truncate());
        let world = world.map(read_points).transpose()?;
        Ok(Self::new(label, landmarks, world))
    }

    /// Palm span times palm height in normalized image units.
    ///
    /// Grows as the hand approaches the camera, independently of the depth estimate.
    pub fn palm_area_2d(&self) -> f32 {
        let lm = &self.landmarks;
        let span = lm[INDEX_MCP].distance(lm[PINKY_MCP]);
        let height = lm[WRIST].distance(lm[MIDDLE_MCP]);
        span * height
    }

    /// Mean world position of the palm anchors, if world landmarks were reported.
    pub fn palm_world_center(&self) -> Option<Vec3> {
        let world = self.world.as_ref()?;
        let sum: Vec3 = PALM_ANCHORS.iter().map(|&i| world[i]).sum();
        Some(sum / PALM_ANCHORS.len() as f32)
    }

    pub fn palm_world_z(&self) -> Option<f32> {
        self.palm_world_center().map(|c| c.z)
    }
}

fn read_points(flat: &[f32]) -> Result<[Vec3; LANDMARK_COUNT], LandmarkError> {
    let expected = LANDMARK_COUNT * LANDMARK_STRIDE;
    if flat.len() != expected {
        return Err(LandmarkError::WrongLength {
            expected,
            got: flat.len(),
        });
    }
    if let Some(index) = flat.iter().position(|v| !v.is_finite()) {
        return Err(LandmarkError::NonFinite { index });
    }

    let mut out = [Vec3::ZERO; LANDMARK_COUNT];
    for (dst, chunk) in out.iter_mut().zip(flat.chunks_exact(LANDMARK_STRIDE)) {
        *dst = Vec3::new(chunk[0], chunk[1], chunk[2]);
    }
    Ok(out)
}

/// Everything the tracker reported for one video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDetections {
    pub hands: Vec<HandDetection>,
}

impl FrameDetections {
    pub fn new(hands: Vec<HandDetection>) -> Self {
        Self { hands }
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

/// The external hand tracker.
///
/// Called synchronously once per tick. `None` means nothing is available for this
/// frame and gesture recognition is skipped.
pub trait LandmarkSource {
    fn detect(&mut self, now_ms: f64) -> Option<FrameDetections>;
}

impl LandmarkSource for Option<FrameDetections> {
    fn detect(&mut self, _now_ms: f64) -> Option<FrameDetections> {
        self.take()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedHand {
    pub label: String,
    pub landmarks: Vec<f32>,
    #[serde(default)]
    pub world: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub t_ms: f64,
    #[serde(default)]
    pub hands: Vec<RecordedHand>,
}

/// On-disk tracker capture: timestamped frames with flat landmark buffers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkRecording {
    #[serde(default)]
    pub frames: Vec<RecordedFrame>,
}

impl LandmarkRecording {
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, RecordingError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn into_source(self) -> Result<RecordedSource, RecordingError> {
        let mut frames = Vec::with_capacity(self.frames.len());
        for (frame, recorded) in self.frames.into_iter().enumerate() {
            let hands = recorded
                .hands
                .iter()
                .map(|h| {
                    HandDetection::from_flat(
                        HandLabel::from_category(&h.label),
                        &h.landmarks,
                        h.world.as_deref(),
                    )
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| RecordingError::Landmarks { frame, source })?;
            frames.push((recorded.t_ms, FrameDetections::new(hands)));
        }
        frames.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(RecordedSource { frames, cursor: 0 })
    }
}

/// Replays captured detections against the game clock.
///
/// Each call yields the newest not-yet-consumed frame stamped at or before `now_ms`;
/// older skipped frames are dropped, as a live tracker would drop them.
#[derive(Debug, Clone, Default)]
pub struct RecordedSource {
    frames: Vec<(f64, FrameDetections)>,
    cursor: usize,
}

impl RecordedSource {
    pub fn from_frames(mut frames: Vec<(f64, FrameDetections)>) -> Self {
        frames.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { frames, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len() - self.cursor
    }
}

impl LandmarkSource for RecordedSource {
    fn detect(&mut self, now_ms: f64) -> Option<FrameDetections> {
        let mut latest = None;
        while let Some((t, _)) = self.frames.get(self.cursor) {
            if *t > now_ms {
                break;
            }
            latest = Some(self.cursor);
            self.cursor += 1;
        }
        latest.map(|i| self.frames[i].1.clone())
    }
}

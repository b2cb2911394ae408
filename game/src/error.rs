use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("expected {expected} landmark values, got {got}")]
    WrongLength { expected: usize, got: usize },
    #[error("landmark value at index {index} is not finite")]
    NonFinite { index: usize },
}

/// One-time setup of the camera and hand tracker failed. `start` stays retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("camera unavailable: {0}")]
    Camera(String),
    #[error("hand tracker unavailable: {0}")]
    Tracker(String),
}

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("failed reading landmark recording: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed parsing landmark recording: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("frame {frame}: {source}")]
    Landmarks {
        frame: usize,
        #[source]
        source: LandmarkError,
    },
}

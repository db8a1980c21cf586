pub mod producer;
pub mod runner;
pub mod session;
pub mod uploader;

pub use runner::run_capture;

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};

use crate::FacemarkError;

/// Status text shown after the recognition endpoint confirms a match.
pub const MARKED_MESSAGE: &str = "Attendance marked successfully!";
/// Default status text for a valid response that is not a positive match.
pub const NOT_RECOGNIZED_MESSAGE: &str = "Not recognized yet...";
/// Status text for a submission that never reached the endpoint.
pub const TRANSPORT_ERROR_MESSAGE: &str = "Error connecting to server";
/// Status text shown once the camera feed is live.
pub const CAMERA_STARTED_MESSAGE: &str = "Camera started. Looking for face...";

/// A single captured image from the live feed, held in the session's
/// off-screen buffer between ticks.
#[derive(Clone, Debug)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode the frame as a JPEG at the given quality (0-100).
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, FacemarkError> {
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
        encoder
            .encode_image(&self.image)
            .map_err(|e| FacemarkError::FrameEncodingError { source: e })?;
        Ok(bytes)
    }
}

/// Visual tone of a status message; the UI maps this to a color.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Positive,
    Negative,
}

/// The text shown in the status indicator. Last write wins, no history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusMessage {
    pub fn camera_started() -> Self {
        Self {
            text: CAMERA_STARTED_MESSAGE.to_string(),
            tone: StatusTone::Info,
        }
    }

    pub fn camera_error(detail: &str) -> Self {
        Self {
            text: format!("Camera error: {}", detail),
            tone: StatusTone::Negative,
        }
    }

    pub fn from_outcome(outcome: &SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Recognized { .. } => Self {
                text: MARKED_MESSAGE.to_string(),
                tone: StatusTone::Positive,
            },
            SubmissionOutcome::NotRecognized { message } => Self {
                text: message
                    .clone()
                    .unwrap_or_else(|| NOT_RECOGNIZED_MESSAGE.to_string()),
                tone: StatusTone::Negative,
            },
            SubmissionOutcome::TransportFailure { .. } => Self {
                text: TRANSPORT_ERROR_MESSAGE.to_string(),
                tone: StatusTone::Negative,
            },
        }
    }
}

/// How a single frame submission settled.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum SubmissionOutcome {
    /// The endpoint recognized the face and marked attendance.
    Recognized { message: Option<String> },
    /// The endpoint answered but did not mark attendance.
    NotRecognized { message: Option<String> },
    /// The request never produced a valid response.
    TransportFailure { detail: String },
}

/// Envelope broadcast from the capture loop to the UI and the optional
/// event log writer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CaptureEvent {
    Status(StatusMessage),
    Submission {
        tick_no: u64,
        outcome: SubmissionOutcome,
    },
}

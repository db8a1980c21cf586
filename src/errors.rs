// Error types for facemark

use crate::capture::CaptureEvent;
use snafu::Snafu;
use std::{io, sync::mpsc::SendError};

#[derive(Debug, Snafu)]
pub enum FacemarkError {
    // Errors for the camera feed
    #[snafu(display("Could not acquire camera feed: {description}"))]
    CameraAcquisitionError { description: String },
    #[snafu(display("Frame producer error: {description}"))]
    FrameProducerError { description: String },
    #[snafu(display("Error encoding frame as JPEG"))]
    FrameEncodingError { source: image::ImageError },

    // Errors while submitting frames to the recognition endpoint
    #[snafu(display("Error sending frame to recognition endpoint"))]
    UploadTransportError { source: reqwest::Error },
    #[snafu(display("Recognition endpoint returned an error ({status})"))]
    RecognitionEndpointError { status: u16, body: String },
    #[snafu(display("Could not start upload runtime"))]
    UploadRuntimeError { source: io::Error },

    // Errors while broadcasting capture events
    #[snafu(display("Error broadcasting capture event"))]
    EventBroadcastError {
        source: Box<SendError<CaptureEvent>>,
    },

    // Errors for the event log writer
    #[snafu(display("Error writing capture event log"))]
    WriterError { source: io::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Attendance chart data errors
    #[snafu(display("Could not parse attendance data"))]
    ChartDataParseError { source: serde_json::Error },
    #[snafu(display("Invalid attendance data: {reason}"))]
    ChartDataShapeError { reason: String },
    #[snafu(display("Invalid attendance file: {path}"))]
    InvalidAttendanceFile { path: String },
    #[snafu(display("Error loading attendance file"))]
    AttendanceLoaderError { source: io::Error },
}

impl From<SendError<CaptureEvent>> for FacemarkError {
    fn from(value: SendError<CaptureEvent>) -> Self {
        FacemarkError::EventBroadcastError {
            source: Box::new(value),
        }
    }
}

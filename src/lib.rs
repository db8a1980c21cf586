// Library interface for facemark
// This allows integration tests to access internal modules

pub mod capture;
pub mod chart;
pub mod config;
pub mod errors;
pub mod ui;
pub mod writer;

// Re-export commonly used types
pub use capture::{CaptureEvent, StatusMessage, StatusTone, SubmissionOutcome};
pub use chart::{AttendanceChart, AttendanceSeries};
pub use errors::FacemarkError;

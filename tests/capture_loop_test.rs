// Integration tests for the capture loop
//
// These run the full loop end to end: a frame producer, the tick-driven
// session, worker-thread submissions against a scripted recognizer, and
// the event broadcast to both the UI channel and the session log writer.

use std::{
    sync::{
        Arc, mpsc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use facemark::capture::{
    CaptureEvent, MARKED_MESSAGE, StatusTone, SubmissionOutcome,
    producer::{DirectoryFrameProducer, MockFrameProducer},
    run_capture,
    runner::CaptureConfig,
    uploader::{MarkResponse, MockRecognizer, Recognizer},
};
use facemark::errors::FacemarkError;
use facemark::writer::write_events;

fn deterministic_config() -> CaptureConfig {
    CaptureConfig {
        refresh_rate_ms: 1,
        // every eligible tick samples, so the submission sequence is fixed
        sample_probability: 1.0,
        stop_on_success: true,
        ..Default::default()
    }
}

/// A recognizer that tracks how many submissions are in flight at once.
struct ConcurrencyProbe {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ConcurrencyProbe {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl Recognizer for ConcurrencyProbe {
    fn mark_attendance(&self, _jpeg: Vec<u8>) -> Result<MarkResponse, FacemarkError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // hold the flight open across several ticks
        thread::sleep(Duration::from_millis(20));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(MarkResponse {
            success: false,
            message: None,
        })
    }
}

#[test]
fn full_session_marks_attendance_and_logs_events() {
    // a real frame directory stands in for the camera device
    let frames_dir = tempfile::tempdir().unwrap();
    for i in 0..3 {
        image::RgbImage::new(16, 12)
            .save(frames_dir.path().join(format!("frame-{:03}.png", i)))
            .unwrap();
    }

    let log_dir = tempfile::tempdir().unwrap();
    let log_path = log_dir.path().join("session.jsonl");
    let (writer_tx, writer_rx) = mpsc::channel();
    let writer_log_path = log_path.clone();
    let writer_handle = thread::spawn(move || write_events(&writer_log_path, writer_rx));

    let recognizer = MockRecognizer::with_script(vec![
        Ok(MarkResponse {
            success: false,
            message: Some("No face detected".to_string()),
        }),
        Ok(MarkResponse {
            success: true,
            message: Some("Attendance marked at 09:15 AM".to_string()),
        }),
    ]);

    let (event_tx, event_rx) = mpsc::channel();
    let result = run_capture(
        DirectoryFrameProducer::new(frames_dir.path().to_path_buf(), true),
        Arc::new(recognizer),
        event_tx,
        Some(writer_tx),
        deterministic_config(),
    );
    assert!(result.is_ok());

    let events: Vec<CaptureEvent> = event_rx.iter().collect();

    // camera started, then (submission, status) per settled flight
    assert_eq!(events.len(), 5);
    assert!(matches!(&events[0], CaptureEvent::Status(s) if s.tone == StatusTone::Info));
    assert!(matches!(
        &events[1],
        CaptureEvent::Submission {
            outcome: SubmissionOutcome::NotRecognized { .. },
            ..
        }
    ));
    assert!(
        matches!(&events[2], CaptureEvent::Status(s) if s.text == "No face detected" && s.tone == StatusTone::Negative)
    );
    assert!(matches!(
        &events[3],
        CaptureEvent::Submission {
            outcome: SubmissionOutcome::Recognized { .. },
            ..
        }
    ));
    assert!(
        matches!(&events[4], CaptureEvent::Status(s) if s.text == MARKED_MESSAGE && s.tone == StatusTone::Positive)
    );

    // the session log saw the same stream
    writer_handle.join().unwrap().unwrap();
    let logged = serde_jsonlines::json_lines::<CaptureEvent, _>(&log_path)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(logged.len(), events.len());
}

#[test]
fn at_most_one_submission_in_flight_across_the_whole_run() {
    let probe = Arc::new(ConcurrencyProbe::new());

    let config = CaptureConfig {
        refresh_rate_ms: 1,
        sample_probability: 1.0,
        stop_on_success: false,
        ..Default::default()
    };

    let (event_tx, event_rx) = mpsc::channel();
    // finite frames without cycling: the run ends when the feed is exhausted
    let result = run_capture(
        MockFrameProducer::with_blank_frames(4, 8, 8),
        Arc::clone(&probe) as Arc<dyn Recognizer>,
        event_tx,
        None,
        config,
    );
    assert!(matches!(
        result,
        Err(FacemarkError::FrameProducerError { .. })
    ));

    assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);

    // every settled submission reset processing, so several flights happened
    let submissions = event_rx
        .iter()
        .filter(|event| matches!(event, CaptureEvent::Submission { .. }))
        .count();
    assert!(submissions >= 2, "expected several flights, got {}", submissions);
}

#[test]
fn unavailable_feed_reports_acquisition_failure() {
    let (event_tx, event_rx) = mpsc::channel();
    let result = run_capture(
        DirectoryFrameProducer::new("/nonexistent/frames".into(), false),
        Arc::new(MockRecognizer::always(MarkResponse {
            success: true,
            message: None,
        })),
        event_tx,
        None,
        deterministic_config(),
    );

    assert!(matches!(
        result,
        Err(FacemarkError::CameraAcquisitionError { .. })
    ));
    let events: Vec<CaptureEvent> = event_rx.iter().collect();
    assert_eq!(events.len(), 1);
    assert!(
        matches!(&events[0], CaptureEvent::Status(s) if s.text.starts_with("Camera error:") && s.tone == StatusTone::Negative)
    );
}

use std::{
    sync::{Arc, mpsc, mpsc::Sender},
    thread,
    time::Duration,
};

use log::{error, info};

use crate::FacemarkError;

use super::{
    CaptureEvent, StatusMessage, SubmissionOutcome,
    producer::FrameProducer,
    session::{CaptureSession, DEFAULT_JPEG_QUALITY, DEFAULT_SAMPLE_PROBABILITY, TickOutcome},
    uploader::Recognizer,
};

const REFRESH_RATE_MS: u64 = 100;

/// Tuning knobs for the capture loop.
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    /// Tick cadence of the loop.
    pub refresh_rate_ms: u64,
    /// Probability that an eligible tick submits a frame.
    pub sample_probability: f64,
    /// JPEG quality for submitted frames (0-100).
    pub jpeg_quality: u8,
    /// Stop the feed once attendance is marked. Off by default: the
    /// original behavior keeps the camera running after a match.
    pub stop_on_success: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: REFRESH_RATE_MS,
            sample_probability: DEFAULT_SAMPLE_PROBABILITY,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            stop_on_success: false,
        }
    }
}

fn broadcast(
    event_sender: &Sender<CaptureEvent>,
    writer_sender: &Option<Sender<CaptureEvent>>,
    event: CaptureEvent,
) -> Result<(), FacemarkError> {
    if let Some(writer_sender) = writer_sender {
        // the writer is best-effort; a dead writer must not kill the loop
        if let Err(e) = writer_sender.send(event.clone()) {
            error!("Could not send capture event to writer: {}", e);
        }
    }
    event_sender.send(event).map_err(|e| {
        error!("Could not send capture event: {}", e);
        FacemarkError::from(e)
    })
}

/// Run the capture loop until the session stops streaming or the feed dies.
///
/// Acquires the feed, then ticks at the configured cadence. Each tick first
/// settles any submission outcomes that arrived since the last tick, then
/// lets the session decide whether to sample. Sampled frames are uploaded
/// from short-lived worker threads so the loop itself never blocks on the
/// endpoint; only the next sampling decision is gated while a submission is
/// in flight.
///
/// # Errors
///
/// Returns `CameraAcquisitionError` if the feed cannot be acquired (terminal,
/// surfaced to the status indicator first), or a producer error if the feed
/// dies mid-session. Per-submission failures are not errors here; they are
/// reported as negative status events and the loop keeps going.
pub fn run_capture(
    mut producer: impl FrameProducer,
    recognizer: Arc<dyn Recognizer>,
    event_sender: Sender<CaptureEvent>,
    writer_sender: Option<Sender<CaptureEvent>>,
    config: CaptureConfig,
) -> Result<(), FacemarkError> {
    if let Err(e) = producer.start() {
        let _ = broadcast(
            &event_sender,
            &writer_sender,
            CaptureEvent::Status(StatusMessage::camera_error(&e.to_string())),
        );
        return Err(e);
    }
    let (width, height) = producer.resolution()?;
    info!("capture feed ready at {}x{}", width, height);

    let mut session = CaptureSession::new(config.sample_probability, config.jpeg_quality);
    session.begin_streaming();
    broadcast(
        &event_sender,
        &writer_sender,
        CaptureEvent::Status(StatusMessage::camera_started()),
    )?;

    let (outcome_tx, outcome_rx) = mpsc::channel::<(u64, SubmissionOutcome)>();
    let mut rng = rand::thread_rng();
    let mut tick_no: u64 = 0;

    while session.is_streaming() {
        thread::sleep(Duration::from_millis(config.refresh_rate_ms));
        tick_no += 1;

        // settle submissions that resolved since the last tick, however many
        // ticks ago they were issued
        while let Ok((submitted_tick, outcome)) = outcome_rx.try_recv() {
            session.complete_submission();
            let status = StatusMessage::from_outcome(&outcome);
            let recognized = matches!(outcome, SubmissionOutcome::Recognized { .. });
            broadcast(
                &event_sender,
                &writer_sender,
                CaptureEvent::Submission {
                    tick_no: submitted_tick,
                    outcome,
                },
            )?;
            broadcast(&event_sender, &writer_sender, CaptureEvent::Status(status))?;
            if recognized && config.stop_on_success {
                info!("attendance marked, stopping capture feed");
                session.stop_streaming();
            }
        }
        if !session.is_streaming() {
            break;
        }

        match session.tick(&mut producer, &mut rng)? {
            TickOutcome::Sampled(jpeg) => {
                let recognizer = Arc::clone(&recognizer);
                let outcome_tx = outcome_tx.clone();
                let submitted_tick = tick_no;
                thread::spawn(move || {
                    let outcome = match recognizer.mark_attendance(jpeg) {
                        Ok(response) if response.success => SubmissionOutcome::Recognized {
                            message: response.message,
                        },
                        Ok(response) => SubmissionOutcome::NotRecognized {
                            message: response.message,
                        },
                        Err(e) => SubmissionOutcome::TransportFailure {
                            detail: e.to_string(),
                        },
                    };
                    // the loop may have exited while this flight was pending
                    let _ = outcome_tx.send((submitted_tick, outcome));
                });
            }
            TickOutcome::Busy | TickOutcome::Buffered | TickOutcome::Idle => {}
        }
    }

    Ok(())
}

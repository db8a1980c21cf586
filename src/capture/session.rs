use rand::Rng;

use crate::FacemarkError;

use super::{Frame, producer::FrameProducer};

/// Probability that an eligible tick also submits a frame. A geometric
/// inter-submission gap that averages roughly one submission every three
/// ticks, jittering tick to tick.
pub const DEFAULT_SAMPLE_PROBABILITY: f64 = 0.35;
/// JPEG quality for submitted frames.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// What a single tick of the capture loop did.
#[derive(Debug, PartialEq)]
pub enum TickOutcome {
    /// Not streaming yet (or stopped); nothing happened.
    Idle,
    /// A submission is in flight; the tick was a no-op.
    Busy,
    /// The frame buffer was refreshed but this tick was not selected for
    /// submission.
    Buffered,
    /// The frame buffer was refreshed, encoded, and these bytes should be
    /// submitted. `processing` is set until the submission settles.
    Sampled(Vec<u8>),
}

/// Per-session capture state: the two gating flags and the off-screen
/// frame buffer.
///
/// The session is driven by a single loop thread, so the flags are plain
/// bools rather than atomics; `processing` is advisory exclusion against
/// overlapping submissions, not a lock.
pub struct CaptureSession {
    streaming: bool,
    processing: bool,
    sample_probability: f64,
    jpeg_quality: u8,
    buffer: Option<Frame>,
}

impl CaptureSession {
    pub fn new(sample_probability: f64, jpeg_quality: u8) -> Self {
        Self {
            streaming: false,
            processing: false,
            sample_probability: sample_probability.clamp(0., 1.),
            jpeg_quality,
            buffer: None,
        }
    }

    /// Enter the streaming state. Called once camera acquisition succeeds
    /// and the feed resolution is known.
    pub fn begin_streaming(&mut self) {
        self.streaming = true;
    }

    /// Leave the streaming state; the loop's stop condition.
    pub fn stop_streaming(&mut self) {
        self.streaming = false;
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// The freshest captured frame, if any tick has buffered one yet.
    pub fn buffered_frame(&self) -> Option<&Frame> {
        self.buffer.as_ref()
    }

    /// Run one tick of the capture loop.
    ///
    /// A tick while not streaming or while a submission is in flight is a
    /// no-op. Otherwise the current frame is pulled into the buffer
    /// unconditionally, and with `sample_probability` the tick is also
    /// selected for submission: the buffer is encoded as JPEG and
    /// `processing` is set until [`CaptureSession::complete_submission`]
    /// is called.
    pub fn tick<R: Rng>(
        &mut self,
        producer: &mut impl FrameProducer,
        rng: &mut R,
    ) -> Result<TickOutcome, FacemarkError> {
        if !self.streaming {
            return Ok(TickOutcome::Idle);
        }
        if self.processing {
            return Ok(TickOutcome::Busy);
        }

        self.buffer = Some(producer.frame()?);

        if !rng.gen_bool(self.sample_probability) {
            return Ok(TickOutcome::Buffered);
        }

        let frame = self
            .buffer
            .as_ref()
            .ok_or_else(|| FacemarkError::FrameProducerError {
                description: "Frame buffer empty on a sampled tick".to_string(),
            })?;
        let jpeg = frame.encode_jpeg(self.jpeg_quality)?;
        self.processing = true;
        Ok(TickOutcome::Sampled(jpeg))
    }

    /// Clear the in-flight flag once a submission settles, re-enabling
    /// sampling on the next tick. Called for every outcome, success or not.
    pub fn complete_submission(&mut self) {
        self.processing = false;
    }
}

use std::path::PathBuf;

use image::RgbImage;
use log::info;

use crate::FacemarkError;

use super::Frame;

/// A trait for producing frames from a camera-style feed.
///
/// This trait is the seam where the platform camera API sits. The capture
/// loop only ever talks to a `FrameProducer`, so the same loop runs against
/// a live device, a directory of replay images, or programmatic test frames.
///
/// # Lifecycle
///
/// 1. Call `is_available()` to probe whether the feed can be acquired at all
/// 2. Call `start()` to acquire the feed (the camera-permission moment)
/// 3. Call `resolution()` once started to size downstream buffers
/// 4. Call `frame()` repeatedly to get the current frame
pub trait FrameProducer {
    /// Probe whether this producer can acquire its feed. When this returns
    /// false the capture loop is not started automatically and the UI
    /// reveals a manual start control instead.
    fn is_available(&self) -> bool {
        true
    }

    /// Acquire the feed.
    ///
    /// # Errors
    ///
    /// Returns `CameraAcquisitionError` if the feed cannot be acquired.
    /// Acquisition failure is terminal for the capture session.
    fn start(&mut self) -> Result<(), FacemarkError>;

    /// Feed dimensions in pixels, known once the producer is started.
    fn resolution(&self) -> Result<(u32, u32), FacemarkError>;

    /// Get the current frame from the feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the producer is not started or if the feed has
    /// died or been exhausted.
    fn frame(&mut self) -> Result<Frame, FacemarkError>;
}

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A frame producer that replays image files from a directory in sorted
/// order, standing in for a live camera device.
///
/// With `cycle` set the replay wraps around indefinitely (a kiosk feed);
/// without it the producer errors once the files run out, which ends the
/// capture loop.
pub struct DirectoryFrameProducer {
    dir: PathBuf,
    files: Vec<PathBuf>,
    cur_file: usize,
    resolution: Option<(u32, u32)>,
    cycle: bool,
}

impl DirectoryFrameProducer {
    pub fn new(dir: PathBuf, cycle: bool) -> Self {
        Self {
            dir,
            files: Vec::new(),
            cur_file: 0,
            resolution: None,
            cycle,
        }
    }
}

impl FrameProducer for DirectoryFrameProducer {
    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }

    fn start(&mut self) -> Result<(), FacemarkError> {
        let entries =
            std::fs::read_dir(&self.dir).map_err(|e| FacemarkError::CameraAcquisitionError {
                description: format!("could not open frame directory {:?}: {}", self.dir, e),
            })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(FacemarkError::CameraAcquisitionError {
                description: format!("no frame images in {:?}", self.dir),
            });
        }

        // Decode the first frame up front so the resolution is known as soon
        // as the feed is considered live.
        let first = image::open(&files[0])
            .map_err(|e| FacemarkError::CameraAcquisitionError {
                description: format!("could not decode first frame {:?}: {}", files[0], e),
            })?
            .to_rgb8();
        self.resolution = Some((first.width(), first.height()));
        info!(
            "frame feed acquired from {:?}: {} frames at {}x{}",
            self.dir,
            files.len(),
            first.width(),
            first.height()
        );

        self.files = files;
        self.cur_file = 0;
        Ok(())
    }

    fn resolution(&self) -> Result<(u32, u32), FacemarkError> {
        self.resolution
            .ok_or_else(|| FacemarkError::FrameProducerError {
                description: "The frame feed is not acquired, call start() first.".to_string(),
            })
    }

    fn frame(&mut self) -> Result<Frame, FacemarkError> {
        if self.files.is_empty() {
            return Err(FacemarkError::FrameProducerError {
                description: "The frame feed is not acquired, call start() first.".to_string(),
            });
        }

        if self.cur_file >= self.files.len() {
            if self.cycle {
                self.cur_file = 0;
            } else {
                return Err(FacemarkError::FrameProducerError {
                    description: "Frame feed exhausted".to_string(),
                });
            }
        }

        let path = &self.files[self.cur_file];
        self.cur_file += 1;

        let image = image::open(path)
            .map_err(|e| FacemarkError::FrameProducerError {
                description: format!("could not decode frame {:?}: {}", path, e),
            })?
            .to_rgb8();
        Ok(Frame::new(image))
    }
}

/// A mock frame producer for testing.
///
/// MockFrameProducer replays programmatic frames without any device or
/// filesystem access, which enables:
/// - Unit testing of the capture session without a camera
/// - Reproducible tick sequences for loop invariant checks
pub struct MockFrameProducer {
    cur_frame: usize,
    frames: Vec<Frame>,
    started: bool,
    available: bool,
    fail_start: Option<String>,
}

impl Default for MockFrameProducer {
    fn default() -> Self {
        Self {
            cur_frame: 0,
            frames: Vec::new(),
            started: false,
            available: true,
            fail_start: None,
        }
    }
}

impl MockFrameProducer {
    /// Create a producer that serves `count` identical blank frames.
    pub fn with_blank_frames(count: usize, width: u32, height: u32) -> Self {
        let frames = (0..count)
            .map(|_| Frame::new(RgbImage::new(width, height)))
            .collect();
        Self {
            frames,
            ..Default::default()
        }
    }

    /// Make `start()` fail with the given reason, simulating a rejected
    /// camera acquisition.
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_start: Some(reason.to_string()),
            ..Default::default()
        }
    }

    /// Make `is_available()` report false, simulating a host without any
    /// capture capability.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

impl FrameProducer for MockFrameProducer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&mut self) -> Result<(), FacemarkError> {
        if let Some(reason) = &self.fail_start {
            return Err(FacemarkError::CameraAcquisitionError {
                description: reason.clone(),
            });
        }
        self.started = true;
        Ok(())
    }

    fn resolution(&self) -> Result<(u32, u32), FacemarkError> {
        if !self.started {
            return Err(FacemarkError::FrameProducerError {
                description: "The frame feed is not acquired, call start() first.".to_string(),
            });
        }
        let (width, height) = self
            .frames
            .first()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0));
        Ok((width, height))
    }

    fn frame(&mut self) -> Result<Frame, FacemarkError> {
        if self.cur_frame >= self.frames.len() {
            return Err(FacemarkError::FrameProducerError {
                description: "End of frames vec".to_string(),
            });
        }

        let frame = self.frames[self.cur_frame].clone();
        self.cur_frame += 1;

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_producer_serves_frames_in_order() {
        let mut producer = MockFrameProducer::with_blank_frames(2, 4, 4);
        assert!(producer.start().is_ok());
        assert_eq!(producer.resolution().unwrap(), (4, 4));
        assert!(producer.frame().is_ok());
        assert!(producer.frame().is_ok());
        assert!(producer.frame().is_err());
    }

    #[test]
    fn failing_mock_reports_acquisition_error() {
        let mut producer = MockFrameProducer::failing("permission denied");
        let err = producer.start().unwrap_err();
        assert!(matches!(
            err,
            FacemarkError::CameraAcquisitionError { .. }
        ));
    }

    #[test]
    fn directory_producer_unavailable_for_missing_dir() {
        let producer = DirectoryFrameProducer::new(PathBuf::from("/nonexistent/frames"), false);
        assert!(!producer.is_available());
    }

    #[test]
    fn directory_producer_fails_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut producer = DirectoryFrameProducer::new(dir.path().to_path_buf(), false);
        assert!(producer.is_available());
        assert!(matches!(
            producer.start(),
            Err(FacemarkError::CameraAcquisitionError { .. })
        ));
    }

    #[test]
    fn directory_producer_replays_and_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame-000.png");
        RgbImage::new(6, 4).save(&path).unwrap();

        let mut producer = DirectoryFrameProducer::new(dir.path().to_path_buf(), true);
        producer.start().unwrap();
        assert_eq!(producer.resolution().unwrap(), (6, 4));

        // cycles past the single file
        let first = producer.frame().unwrap();
        let second = producer.frame().unwrap();
        assert_eq!(first.width(), 6);
        assert_eq!(second.height(), 4);
    }
}

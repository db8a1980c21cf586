use std::{fs::File, io::BufWriter, path::PathBuf, sync::mpsc::Receiver};

use log::error;
use serde_jsonlines::JsonLinesWriter;

use crate::{FacemarkError, capture::CaptureEvent};

/// Append every capture event to a JSON Lines session log until the
/// sending side of the channel hangs up.
pub fn write_events(
    file: &PathBuf,
    event_receiver: Receiver<CaptureEvent>,
) -> Result<(), FacemarkError> {
    let log_file = File::create(file).map_err(|e| FacemarkError::WriterError { source: e })?;
    let mut log_writer = JsonLinesWriter::new(BufWriter::new(log_file));
    for event in &event_receiver {
        if let Err(e) = log_writer.write(&event) {
            error!("Error while writing capture event to output file: {}", e);
        }
    }
    log_writer
        .flush()
        .map_err(|e| FacemarkError::WriterError { source: e })?;
    Ok(())
}

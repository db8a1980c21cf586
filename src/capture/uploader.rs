use serde::Deserialize;

use crate::FacemarkError;

/// Reply shape of the attendance-marking endpoint.
///
/// `success=true` means the face was recognized and attendance was marked;
/// otherwise `message` carries the reason, when the server provides one.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// A trait for submitting an encoded frame to the recognition endpoint.
///
/// The capture loop calls this from short-lived worker threads, one
/// submission at a time; implementations must be safe to share across
/// those threads.
pub trait Recognizer: Send + Sync {
    /// Submit a JPEG frame and wait for the endpoint to settle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request never produced a valid response
    /// (network failure, error status, unparseable body). These are
    /// non-fatal for the session: the loop maps them to a connectivity
    /// status and keeps sampling.
    fn mark_attendance(&self, jpeg: Vec<u8>) -> Result<MarkResponse, FacemarkError>;
}

/// HTTP client for the attendance-marking endpoint.
///
/// POSTs a multipart form with a single `image` field containing the JPEG
/// frame, and parses the JSON reply. No timeout or cancellation is applied
/// beyond the transport's own behavior.
pub struct RecognitionClient {
    client: reqwest::Client,
    mark_url: String,
}

impl RecognitionClient {
    /// * `mark_url` - Full endpoint URL, e.g. `http://host:5000/mark_attendance`.
    pub fn new(mark_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            mark_url,
        }
    }
}

impl Recognizer for RecognitionClient {
    fn mark_attendance(&self, jpeg: Vec<u8>) -> Result<MarkResponse, FacemarkError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FacemarkError::UploadRuntimeError { source: e })?;

        runtime.block_on(async {
            let part = reqwest::multipart::Part::bytes(jpeg)
                .file_name("frame.jpg")
                .mime_str("image/jpeg")
                .map_err(|e| FacemarkError::UploadTransportError { source: e })?;
            let form = reqwest::multipart::Form::new().part("image", part);

            let response = self
                .client
                .post(&self.mark_url)
                .multipart(form)
                .send()
                .await
                .map_err(|e| FacemarkError::UploadTransportError { source: e })?;

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<unreadable body>".to_string());
                return Err(FacemarkError::RecognitionEndpointError {
                    status: status.as_u16(),
                    body,
                });
            }

            response
                .json::<MarkResponse>()
                .await
                .map_err(|e| FacemarkError::UploadTransportError { source: e })
        })
    }
}

/// A mock recognizer for testing: replays a scripted sequence of results,
/// then keeps repeating the last one.
pub struct MockRecognizer {
    script: std::sync::Mutex<Vec<Result<MarkResponse, String>>>,
}

impl MockRecognizer {
    pub fn with_script(script: Vec<Result<MarkResponse, String>>) -> Self {
        let mut reversed = script;
        reversed.reverse();
        Self {
            script: std::sync::Mutex::new(reversed),
        }
    }

    /// A recognizer that always answers with the given response.
    pub fn always(response: MarkResponse) -> Self {
        Self::with_script(vec![Ok(response)])
    }
}

impl Recognizer for MockRecognizer {
    fn mark_attendance(&self, _jpeg: Vec<u8>) -> Result<MarkResponse, FacemarkError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| FacemarkError::RecognitionEndpointError {
                status: 0,
                body: "mock recognizer script poisoned".to_string(),
            })?;
        let next = if script.len() > 1 {
            script.pop()
        } else {
            script.last().cloned()
        };
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(detail)) => Err(FacemarkError::RecognitionEndpointError {
                status: 0,
                body: detail,
            }),
            None => Err(FacemarkError::RecognitionEndpointError {
                status: 0,
                body: "mock recognizer script empty".to_string(),
            }),
        }
    }
}

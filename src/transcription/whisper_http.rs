use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{
    Body,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{AudioClip, Transcriber, TranscriptionError};

const TRANSCRIPTIONS_PATH: &str = "/v1/audio/transcriptions";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Sends audio to an OpenAI-compatible `/v1/audio/transcriptions` endpoint.
#[derive(Debug, Clone)]
pub struct WhisperHttpTranscriber {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl WhisperHttpTranscriber {
    pub fn new(base_url: &str, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), TRANSCRIPTIONS_PATH),
            model: model.into(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transcriber for WhisperHttpTranscriber {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, TranscriptionError> {
        let byte_count = clip.bytes.len();
        let part = audio_part(clip.bytes, &clip.file_name, clip.content_type.as_deref());

        let form = Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(api_key) = self.api_key.as_deref() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|err| {
            error!(endpoint = %self.endpoint, error = %err, "transcription request failed");
            TranscriptionError::Transport(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(endpoint = %self.endpoint, status = status.as_u16(), "transcriber rejected audio");
            return Err(TranscriptionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response
            .json::<TranscriptionResponse>()
            .await
            .map_err(|err| TranscriptionError::Decode(err.to_string()))?;

        info!(
            file_name = %clip.file_name,
            byte_count,
            text_len = payload.text.len(),
            "audio transcribed"
        );
        Ok(payload.text)
    }
}

// Client-supplied content types that do not parse are dropped; the backend
// sniffs the format from the file name and bytes.
fn audio_part(bytes: Vec<u8>, file_name: &str, content_type: Option<&str>) -> Part {
    let bytes = Bytes::from(bytes);
    let length = bytes.len() as u64;
    let part = |bytes: Bytes| {
        Part::stream_with_length(Body::from(bytes), length).file_name(file_name.to_string())
    };

    let Some(content_type) = content_type else {
        return part(bytes);
    };

    match part(bytes.clone()).mime_str(content_type) {
        Ok(typed) => typed,
        Err(err) => {
            warn!(content_type, error = %err, "ignoring unparsable upload content type");
            part(bytes)
        }
    }
}

//! Audio-to-text collaborator.
//!
//! The service only needs "bytes in, text out"; [`Transcriber`] is that seam.
//! [`WhisperHttpTranscriber`] talks to an OpenAI-compatible transcription
//! endpoint, and [`UploadSpool`] keeps a copy of each upload on disk.

use async_trait::async_trait;
use thiserror::Error;

pub mod spool;
pub mod whisper_http;

pub use spool::UploadSpool;
pub use whisper_http::WhisperHttpTranscriber;

/// An uploaded audio file.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("transcriber unreachable: {0}")]
    Transport(String),
    #[error("transcriber rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("transcriber returned an unreadable response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, TranscriptionError>;
}

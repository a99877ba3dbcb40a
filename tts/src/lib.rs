//! Turn short strings into speech.
//!
//! A [`Tts`] engine renders text into WAV bytes. [`OpenJtalk`] drives the
//! `open_jtalk` command with an HTS voice, [`CoquiTts`] asks a Coqui TTS
//! server. A [`Voice`] wraps an engine with `talk`/`retalk`/`stop` and
//! publishes each finished [`Utterance`].

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

pub mod coqui;
pub mod open_jtalk;
pub mod params;
pub mod voice;

pub use coqui::CoquiTts;
pub use open_jtalk::OpenJtalk;
pub use params::{VoiceParams, DEFAULT_FPERIOD};
pub use voice::{Utterance, Voice};

#[derive(Debug, Error)]
pub enum TTSError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid url {0}")]
    InvalidUrl(String),
    #[error("{0} is not a directory")]
    MissingDir(PathBuf),
    #[error("speech engine exited with {status}: {stderr}")]
    Engine { status: ExitStatus, stderr: String },
    #[error("nothing has been spoken yet")]
    NothingSpoken,
}

/// Convenience result type used throughout this crate.
pub type Result<T> = std::result::Result<T, TTSError>;

/// Text-to-speech engine interface.
#[async_trait]
pub trait Tts: Send + Sync {
    /// Render `text` at frame period `fperiod` and return WAV bytes.
    async fn synthesize(&self, text: &str, fperiod: u32) -> Result<Vec<u8>>;
}

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::info;

use crate::{Result, TTSError, Tts};

/// Client for a Coqui TTS server.
#[derive(Clone)]
pub struct CoquiTts {
    url: String,
    client: Client,
    speaker_id: Option<String>,
    /// Optional language code passed as the `language_id` query parameter
    language_id: Option<String>,
}

impl CoquiTts {
    /// Create a new client targeting `url` (e.g. `http://localhost:5002/api/tts`).
    ///
    /// Optional `speaker_id` selects the voice and `language_id` the
    /// language of multilingual models.
    pub fn new(
        url: impl Into<String>,
        speaker_id: Option<String>,
        language_id: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
            speaker_id,
            language_id,
        }
    }
}

#[async_trait]
impl Tts for CoquiTts {
    /// Coqui has no pitch control, so `fperiod` is ignored.
    async fn synthesize(&self, text: &str, _fperiod: u32) -> Result<Vec<u8>> {
        let mut url = Url::parse(&self.url).map_err(|e| TTSError::InvalidUrl(format!("{}: {e}", self.url)))?;
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("text", text);
            qp.append_pair("speaker_id", self.speaker_id.as_deref().unwrap_or("p123"));
            qp.append_pair("style_wav", "");
            qp.append_pair("language_id", self.language_id.as_deref().unwrap_or(""));
        }
        info!(%url, "requesting TTS");
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}

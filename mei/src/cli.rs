use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use net::{Credentials, Endpoint};
use std::{path::PathBuf, sync::Arc};
use tts::{CoquiTts, DEFAULT_FPERIOD, OpenJtalk, Tts, VoiceParams};

use crate::Field;

/// Speech engine used to read events aloud.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Engine {
    OpenJtalk,
    Coqui,
    /// Print events without speaking.
    Silent,
}

/// Listen to a status stream and read out who is posting.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Streaming API host
    #[arg(long, env = "STREAM_HOST", default_value = "stream.twitter.com")]
    pub host: String,

    #[arg(long, env = "STREAM_PORT", default_value_t = 443)]
    pub port: u16,

    #[arg(long, env = "STREAM_PATH", default_value = "/1/statuses/filter.json")]
    pub path: String,

    /// Keyword to track. Repeat for several.
    #[arg(long, default_values_t = [String::from("初音ミク")])]
    pub track: Vec<String>,

    #[arg(long, env = "STREAM_USER")]
    pub user: Option<String>,

    #[arg(long, env = "STREAM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, env = "STREAM_BEARER_TOKEN", hide_env_values = true, conflicts_with = "user")]
    pub bearer_token: Option<String>,

    /// Part of each event to read aloud
    #[arg(long, value_enum, default_value_t = Field::Actor)]
    pub speak: Field,

    #[arg(long, value_enum, env = "TTS_ENGINE", default_value_t = Engine::OpenJtalk)]
    pub engine: Engine,

    /// HTS voice directory for open_jtalk
    #[arg(long, env = "VOICE_DIR", default_value = "data/mei_normal")]
    pub voice_dir: PathBuf,

    /// MeCab dictionary directory for open_jtalk
    #[arg(long, env = "DIC_DIR", default_value = "openjtalk/open_jtalk_dic_utf_8-1.05")]
    pub dic_dir: PathBuf,

    #[arg(long, env = "OPEN_JTALK", default_value = "open_jtalk")]
    pub open_jtalk: PathBuf,

    #[arg(long, env = "COQUI_URL", default_value = "http://localhost:5002/api/tts")]
    pub coqui_url: String,

    #[arg(long, env = "SPEAKER")]
    pub speaker_id: Option<String>,

    #[arg(long)]
    pub alpha: Option<f64>,

    #[arg(long)]
    pub beta: Option<f64>,

    #[arg(long)]
    pub uv_threshold: Option<f64>,

    /// Frame period; lower values raise the pitch
    #[arg(long, default_value_t = DEFAULT_FPERIOD)]
    pub fperiod: u32,

    /// Give up when a single record grows past this many bytes
    #[arg(long, default_value_t = net::DEFAULT_MAX_PENDING)]
    pub max_record_bytes: usize,
}

impl Cli {
    /// Stream endpoint with tracked keywords and credentials applied.
    pub fn endpoint(&self) -> Result<Endpoint> {
        let mut endpoint = Endpoint::new(&self.host, self.port, &self.path)?;
        if !self.track.is_empty() {
            endpoint = endpoint.with_query("track", &self.track.join(","));
        }
        if let Some(credentials) = self.credentials()? {
            endpoint = endpoint.with_credentials(credentials);
        }
        Ok(endpoint)
    }

    fn credentials(&self) -> Result<Option<Credentials>> {
        match (&self.user, &self.password, &self.bearer_token) {
            (_, _, Some(token)) => Ok(Some(Credentials::Bearer(token.clone()))),
            (Some(user), Some(password), None) => Ok(Some(Credentials::Basic {
                user: user.clone(),
                password: password.clone(),
            })),
            (Some(_), None, None) => bail!("--user requires --password"),
            _ => Ok(None),
        }
    }

    pub fn voice_params(&self) -> VoiceParams {
        let mut params = VoiceParams::default();
        if let Some(alpha) = self.alpha {
            params.alpha = alpha;
        }
        if let Some(beta) = self.beta {
            params.beta = beta;
        }
        if let Some(uv) = self.uv_threshold {
            params.uv_threshold = uv;
        }
        params
    }

    /// Build the selected speech engine; `None` when silent.
    pub fn tts(&self) -> Result<Option<Arc<dyn Tts>>> {
        let tts: Arc<dyn Tts> = match self.engine {
            Engine::OpenJtalk => Arc::new(
                OpenJtalk::new(&self.voice_dir, &self.dic_dir, self.voice_params())?
                    .with_program(&self.open_jtalk),
            ),
            Engine::Coqui => Arc::new(CoquiTts::new(
                self.coqui_url.clone(),
                self.speaker_id.clone(),
                None,
            )),
            Engine::Silent => return Ok(None),
        };
        Ok(Some(tts))
    }
}

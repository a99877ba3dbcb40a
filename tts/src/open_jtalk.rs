//! Japanese speech through the `open_jtalk` command.
//!
//! The voice directory holds an HTS model split into separate files
//! (`dur.pdf`, `tree-mgc.inf`, `lf0.win1`, ...), as shipped with the
//! `mei_normal` voice. Text is written to the command's stdin and the WAV
//! is read back from its stdout.

use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::{Result, TTSError, Tts, VoiceParams};

/// Where `open_jtalk` writes the rendered audio.
const WAV_OUT: &str = "/dev/stdout";

/// [`Tts`] engine backed by the `open_jtalk` executable.
#[derive(Clone, Debug)]
pub struct OpenJtalk {
    program: PathBuf,
    voice_dir: PathBuf,
    dic_dir: PathBuf,
    params: VoiceParams,
}

impl OpenJtalk {
    /// Prepare an engine using the voice in `voice_dir` and the MeCab
    /// dictionary in `dic_dir`. Both must exist.
    pub fn new(
        voice_dir: impl Into<PathBuf>,
        dic_dir: impl Into<PathBuf>,
        params: VoiceParams,
    ) -> Result<Self> {
        let voice_dir = voice_dir.into();
        let dic_dir = dic_dir.into();
        for dir in [&voice_dir, &dic_dir] {
            if !dir.is_dir() {
                return Err(TTSError::MissingDir(dir.clone()));
            }
        }
        Ok(Self {
            program: PathBuf::from("open_jtalk"),
            voice_dir,
            dic_dir,
            params,
        })
    }

    /// Use a specific executable instead of `open_jtalk` from `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    /// Command line arguments for one synthesis at `fperiod`.
    pub fn args(&self, fperiod: u32) -> Vec<OsString> {
        let voice = |file: &str| self.voice_dir.join(file).into_os_string();
        let p = &self.params;
        let mut args: Vec<OsString> = vec!["-x".into(), self.dic_dir.clone().into_os_string()];
        for (flag, file) in [
            ("-td", "tree-dur.inf"),
            ("-tm", "tree-mgc.inf"),
            ("-tf", "tree-lf0.inf"),
            ("-md", "dur.pdf"),
            ("-mm", "mgc.pdf"),
            ("-mf", "lf0.pdf"),
            ("-dm", "mgc.win1"),
            ("-dm", "mgc.win2"),
            ("-dm", "mgc.win3"),
            ("-df", "lf0.win1"),
            ("-df", "lf0.win2"),
            ("-df", "lf0.win3"),
            ("-em", "tree-gv-mgc.inf"),
            ("-ef", "tree-gv-lf0.inf"),
            ("-cm", "gv-mgc.pdf"),
            ("-cf", "gv-lf0.pdf"),
            ("-k", "gv-switch.inf"),
        ] {
            args.push(flag.into());
            args.push(voice(file));
        }
        for (flag, value) in [
            ("-s", p.sampling_rate.to_string()),
            ("-p", fperiod.to_string()),
            ("-a", p.alpha.to_string()),
            ("-g", p.stage.to_string()),
            ("-b", p.beta.to_string()),
            ("-u", p.uv_threshold.to_string()),
            ("-jm", p.gv_weight_mgc.to_string()),
            ("-jf", p.gv_weight_lf0.to_string()),
            ("-jl", p.gv_weight_lpf.to_string()),
            ("-z", p.audio_buff_size.to_string()),
            ("-ow", WAV_OUT.to_string()),
        ] {
            args.push(flag.into());
            args.push(value.into());
        }
        args
    }
}

#[async_trait]
impl Tts for OpenJtalk {
    async fn synthesize(&self, text: &str, fperiod: u32) -> Result<Vec<u8>> {
        debug!(program = %self.program.display(), fperiod, "running open_jtalk");
        let mut child = Command::new(&self.program)
            .args(self.args(fperiod))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            let line = format!("{text}\n");
            match stdin.write_all(line.as_bytes()).await {
                // the exit status below says whether it mattered
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                other => other?,
            }
        }
        let out = child.wait_with_output().await?;
        if !out.status.success() {
            return Err(TTSError::Engine {
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(out.stdout)
    }
}

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use tokio::sync::{broadcast, Notify};
use tracing::{debug, info};

use crate::{Result, TTSError, Tts, DEFAULT_FPERIOD};

/// Audio rendered for one piece of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    /// WAV bytes.
    pub audio: Vec<u8>,
}

/// A speaking voice built on a [`Tts`] engine.
///
/// Finished utterances are broadcast to receivers obtained from
/// [`subscribe`](Voice::subscribe); playing them is up to the receiver.
pub struct Voice {
    tts: Arc<dyn Tts>,
    fperiod: u32,
    last: Mutex<Option<(String, u32)>>,
    turn: AtomicU64,
    speaking: AtomicBool,
    interrupted: Notify,
    utterances: broadcast::Sender<Utterance>,
}

impl Voice {
    /// Default broadcast capacity for utterances.
    pub const DEFAULT_CAPACITY: usize = 16;

    pub fn new(tts: Arc<dyn Tts>) -> Self {
        let (utterances, _) = broadcast::channel(Self::DEFAULT_CAPACITY);
        Self {
            tts,
            fperiod: DEFAULT_FPERIOD,
            last: Mutex::new(None),
            turn: AtomicU64::new(0),
            speaking: AtomicBool::new(false),
            interrupted: Notify::new(),
            utterances,
        }
    }

    /// Set the frame period used by [`talk`](Self::talk).
    pub fn with_fperiod(mut self, fperiod: u32) -> Self {
        self.fperiod = fperiod;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Utterance> {
        self.utterances.subscribe()
    }

    /// Say `text` at the default frame period.
    pub async fn talk(&self, text: &str) -> Result<()> {
        self.talk_at(text, self.fperiod).await
    }

    /// Say `text` at `fperiod` and remember both for [`retalk`](Self::retalk).
    pub async fn talk_at(&self, text: &str, fperiod: u32) -> Result<()> {
        *self.last.lock().unwrap() = Some((text.to_string(), fperiod));
        self.say(text, fperiod).await
    }

    /// Say the previous text again.
    pub async fn retalk(&self) -> Result<()> {
        let (text, fperiod) = self
            .last
            .lock()
            .unwrap()
            .clone()
            .ok_or(TTSError::NothingSpoken)?;
        self.say(&text, fperiod).await
    }

    /// Interrupt the utterance in progress.
    ///
    /// A synthesis still running is abandoned and the pending
    /// [`talk`](Self::talk) returns `Ok` without publishing anything.
    pub fn stop(&self) {
        self.turn.fetch_add(1, Ordering::SeqCst);
        self.speaking.store(false, Ordering::SeqCst);
        self.interrupted.notify_waiters();
        debug!("voice interrupted");
    }

    pub fn speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    async fn say(&self, text: &str, fperiod: u32) -> Result<()> {
        let turn = self.turn.fetch_add(1, Ordering::SeqCst) + 1;
        self.speaking.store(true, Ordering::SeqCst);
        info!(%text, fperiod, "talking");
        let audio = tokio::select! {
            audio = self.tts.synthesize(text, fperiod) => audio,
            _ = self.interrupted.notified() => return Ok(()),
        };
        if self.turn.load(Ordering::SeqCst) != turn {
            return Ok(());
        }
        self.speaking.store(false, Ordering::SeqCst);
        let audio = audio?;
        let _ = self.utterances.send(Utterance {
            text: text.to_string(),
            audio,
        });
        Ok(())
    }
}

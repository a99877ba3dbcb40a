use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tts::{TTSError, Tts, Utterance, Voice, DEFAULT_FPERIOD};

#[derive(Default)]
struct DummyTts {
    calls: Mutex<Vec<(String, u32)>>,
}

#[async_trait]
impl Tts for DummyTts {
    async fn synthesize(&self, text: &str, fperiod: u32) -> tts::Result<Vec<u8>> {
        self.calls.lock().unwrap().push((text.to_string(), fperiod));
        Ok(vec![0u8; 4])
    }
}

#[tokio::test]
async fn talk_publishes_utterance() {
    let tts = Arc::new(DummyTts::default());
    let voice = Voice::new(tts.clone());
    let mut rx = voice.subscribe();

    voice.talk("初音ミク").await.unwrap();
    let utterance = rx.recv().await.unwrap();
    assert_eq!(
        utterance,
        Utterance {
            text: "初音ミク".into(),
            audio: vec![0u8; 4]
        }
    );
    assert_eq!(
        *tts.calls.lock().unwrap(),
        [("初音ミク".to_string(), DEFAULT_FPERIOD)]
    );
    assert!(!voice.speaking());
}

#[tokio::test]
async fn retalk_repeats_last_text_and_pitch() {
    let tts = Arc::new(DummyTts::default());
    let voice = Voice::new(tts.clone()).with_fperiod(200);

    voice.talk("one").await.unwrap();
    voice.talk_at("two", 180).await.unwrap();
    voice.retalk().await.unwrap();

    let calls = tts.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        [
            ("one".to_string(), 200),
            ("two".to_string(), 180),
            ("two".to_string(), 180)
        ]
    );
}

#[tokio::test]
async fn retalk_before_talk_fails() {
    let voice = Voice::new(Arc::new(DummyTts::default()));
    assert!(matches!(voice.retalk().await, Err(TTSError::NothingSpoken)));
}

struct SlowTts {
    started: Notify,
}

#[async_trait]
impl Tts for SlowTts {
    async fn synthesize(&self, _text: &str, _fperiod: u32) -> tts::Result<Vec<u8>> {
        self.started.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(vec![1, 2, 3])
    }
}

#[tokio::test]
async fn stop_discards_pending_audio() {
    let tts = Arc::new(SlowTts {
        started: Notify::new(),
    });
    let voice = Arc::new(Voice::new(tts.clone()));
    let mut rx = voice.subscribe();

    let speaker = voice.clone();
    let task = tokio::spawn(async move { speaker.talk("long sentence").await });
    tts.started.notified().await;
    assert!(voice.speaking());
    voice.stop();
    assert!(!voice.speaking());

    task.await.unwrap().unwrap();
    assert!(rx.try_recv().is_err());
}

struct BrokenTts;

#[async_trait]
impl Tts for BrokenTts {
    async fn synthesize(&self, _text: &str, _fperiod: u32) -> tts::Result<Vec<u8>> {
        Err(TTSError::NothingSpoken)
    }
}

#[tokio::test]
async fn engine_errors_surface() {
    let voice = Voice::new(Arc::new(BrokenTts));
    assert!(voice.talk("hi").await.is_err());
    assert!(!voice.speaking());
}

struct HangingTts {
    started: Notify,
}

#[async_trait]
impl Tts for HangingTts {
    async fn synthesize(&self, _text: &str, _fperiod: u32) -> tts::Result<Vec<u8>> {
        self.started.notify_one();
        std::future::pending().await
    }
}

#[tokio::test]
async fn stop_abandons_a_synthesis_that_never_ends() {
    let tts = Arc::new(HangingTts {
        started: Notify::new(),
    });
    let voice = Arc::new(Voice::new(tts.clone()));
    let mut rx = voice.subscribe();

    let speaker = voice.clone();
    let task = tokio::spawn(async move { speaker.talk("endless").await });
    tts.started.notified().await;
    voice.stop();

    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("talk returns after stop")
        .unwrap()
        .unwrap();
    assert!(!voice.speaking());
    assert!(rx.try_recv().is_err());
}

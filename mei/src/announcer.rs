use async_trait::async_trait;
use clap::ValueEnum;
use net::{Event, Handler};
use std::sync::Arc;
use tts::Voice;

/// Which part of an event is read aloud.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Field {
    Actor,
    Body,
}

/// [`Handler`] that prints each event and speaks one of its fields.
pub struct Announcer {
    voice: Option<Arc<Voice>>,
    field: Field,
}

impl Announcer {
    /// Without a `voice` events are only printed.
    pub fn new(voice: Option<Arc<Voice>>, field: Field) -> Self {
        Self { voice, field }
    }

    /// `[actor]` on the first line, the body below.
    pub fn headline(event: &Event) -> String {
        format!("[{}]\n{}", event.actor, event.body)
    }

    pub fn spoken<'a>(&self, event: &'a Event) -> &'a str {
        match self.field {
            Field::Actor => &event.actor,
            Field::Body => &event.body,
        }
    }
}

#[async_trait]
impl Handler for Announcer {
    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        println!("{}", Self::headline(event));
        if let Some(voice) = &self.voice {
            voice.talk(self.spoken(event)).await?;
        }
        Ok(())
    }
}

use clap::Parser;
use dotenvy::dotenv;
use mei::{Announcer, Cli, init_logging};
use net::{Connection, HttpTransport};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tts::Voice;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    let endpoint = cli.endpoint()?;
    let voice = cli
        .tts()?
        .map(|tts| Arc::new(Voice::new(tts).with_fperiod(cli.fperiod)));

    if let Some(voice) = &voice {
        let mut utterances = voice.subscribe();
        tokio::spawn(async move {
            loop {
                match utterances.recv().await {
                    Ok(u) => info!(text = %u.text, bytes = u.audio.len(), "utterance ready"),
                    Err(RecvError::Lagged(n)) => warn!(dropped = n, "utterances lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    let announcer = Arc::new(Announcer::new(voice.clone(), cli.speak));
    let connection = Connection::new(Arc::new(HttpTransport::new()), announcer)
        .with_max_pending(cli.max_record_bytes);

    let stop = connection.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, closing stream");
            stop.stop();
            if let Some(voice) = voice {
                voice.stop();
            }
        }
    });

    let summary = connection.start(endpoint).await?;
    info!(
        events = summary.events,
        skipped = summary.skipped,
        handler_failures = summary.handler_failures,
        "stream closed"
    );
    Ok(())
}

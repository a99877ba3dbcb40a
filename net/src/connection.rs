//! Lifecycle of one streaming session.
//!
//! A [`Connection`] starts `Idle`, moves to `Connecting` when
//! [`start`](Connection::start) is called and to `Streaming` once the
//! transport confirms the response. It ends either `Closed` (stop requested
//! or the remote side finished the body) or `Failed` (transport error or a
//! record stream that can no longer make progress). Both are terminal: a
//! new session needs a new `Connection`.
//!
//! Chunk arrival, decoding and dispatch all happen inside the task awaiting
//! `start`, one step at a time, so events reach the handler in the order
//! their bytes arrived.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    ChunkBuffer, ChunkStream, DecodeError, Decoder, Dispatcher, Endpoint, Handler, ReaderError,
    Transport,
};

/// Where a [`Connection`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Connecting,
    Streaming,
    Closed,
    Failed,
}

impl State {
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Closed | State::Failed)
    }
}

/// What a session processed before it closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Events handed to the handler, whether or not it succeeded.
    pub events: u64,
    /// Records dropped by the decoder.
    pub skipped: u64,
    /// Handler invocations that returned an error or panicked.
    pub handler_failures: u64,
}

/// Requests that a [`Connection`] stop.
#[derive(Clone, Debug)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Stop processing. Idempotent; records already buffered are dropped.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// One streaming session: transport, pending bytes, decoder and handler.
pub struct Connection {
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
    decoder: Decoder,
    buffer: ChunkBuffer,
    skipped: u64,
    state: watch::Sender<State>,
    stop: StopHandle,
}

impl Connection {
    pub fn new(transport: Arc<dyn Transport>, handler: Arc<dyn Handler>) -> Self {
        let (state, _) = watch::channel(State::Idle);
        let (stop, _) = watch::channel(false);
        Self {
            transport,
            dispatcher: Dispatcher::new(handler),
            decoder: Decoder::default(),
            buffer: ChunkBuffer::new(),
            skipped: 0,
            state,
            stop: StopHandle { tx: Arc::new(stop) },
        }
    }

    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Bound the bytes held while waiting for a record to complete.
    pub fn with_max_pending(mut self, limit: usize) -> Self {
        self.buffer = ChunkBuffer::with_max_pending(limit);
        self
    }

    pub fn state(&self) -> State {
        *self.state.borrow()
    }

    /// Observe state transitions.
    pub fn watch_state(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Connect to `endpoint` and feed every event to the handler until the
    /// session ends.
    ///
    /// Returns the session [`Summary`] when it ends `Closed` and the cause
    /// when it ends `Failed`.
    pub async fn start(mut self, endpoint: Endpoint) -> Result<Summary, ReaderError> {
        let mut stop = self.stop.tx.subscribe();
        self.set_state(State::Connecting);
        info!(url = %endpoint.url(), "connecting");

        let transport = self.transport.clone();
        let connected = tokio::select! {
            biased;
            _ = stop_requested(&mut stop) => None,
            res = transport.connect(&endpoint) => Some(res),
        };
        let chunks = match connected {
            None => return Ok(self.close()),
            Some(Ok(chunks)) => chunks,
            Some(Err(e)) => return Err(self.fail(e.into())),
        };

        self.set_state(State::Streaming);
        match self.stream(chunks, &mut stop).await {
            Ok(()) => Ok(self.close()),
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn stream(
        &mut self,
        mut chunks: ChunkStream,
        stop: &mut watch::Receiver<bool>,
    ) -> Result<(), ReaderError> {
        loop {
            let next = tokio::select! {
                biased;
                _ = stop_requested(stop) => return Ok(()),
                next = chunks.next() => next,
            };
            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => return Err(e.into()),
                None => {
                    info!("remote closed the stream");
                    return Ok(());
                }
            };

            for record in self.buffer.append(&chunk) {
                let stopped = *stop.borrow();
                if stopped {
                    return Ok(());
                }
                let event = match record.and_then(|r| self.decoder.decode(r.as_bytes())) {
                    Ok(event) => event,
                    Err(e) if e.is_fatal() => return Err(e.into()),
                    Err(e) => {
                        self.skipped += 1;
                        log_skipped(&e);
                        continue;
                    }
                };
                self.dispatcher.dispatch(&event).await;
            }
        }
    }

    fn set_state(&self, next: State) {
        let prev = self.state.send_replace(next);
        debug!(from = ?prev, to = ?next, "connection state");
    }

    fn close(mut self) -> Summary {
        self.buffer.clear();
        self.set_state(State::Closed);
        let stats = self.dispatcher.stats();
        let summary = Summary {
            events: stats.delivered + stats.failed,
            skipped: self.skipped,
            handler_failures: stats.failed,
        };
        info!(?summary, "connection closed");
        summary
    }

    fn fail(mut self, err: ReaderError) -> ReaderError {
        self.buffer.clear();
        self.set_state(State::Failed);
        error!(error = %err, "connection failed");
        err
    }
}

fn log_skipped(err: &DecodeError) {
    match err {
        DecodeError::MissingField(field) => debug!(%field, "record skipped"),
        other => warn!(error = %other, "record skipped"),
    }
}

async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    loop {
        let stopped = *stop.borrow_and_update();
        if stopped || stop.changed().await.is_err() {
            return;
        }
    }
}

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::Event;

/// Something to do with each decoded [`Event`].
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, event: &Event) -> anyhow::Result<()>;
}

#[async_trait]
impl<F> Handler for F
where
    F: Fn(&Event) -> anyhow::Result<()> + Send + Sync,
{
    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        self(event)
    }
}

/// Counters kept by a [`Dispatcher`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Delivers events to a [`Handler`], isolating its failures.
pub struct Dispatcher {
    handler: Arc<dyn Handler>,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            handler,
            stats: DispatchStats::default(),
        }
    }

    /// Hand `event` to the handler.
    ///
    /// Errors and panics raised by the handler are logged and counted here;
    /// they never reach the caller.
    pub async fn dispatch(&mut self, event: &Event) {
        let outcome = AssertUnwindSafe(self.handler.handle(event))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(())) => {
                self.stats.delivered += 1;
                debug!(actor = %event.actor, "event delivered");
            }
            Ok(Err(e)) => {
                self.stats.failed += 1;
                warn!(actor = %event.actor, error = ?e, "handler failed");
            }
            Err(panic) => {
                self.stats.failed += 1;
                warn!(actor = %event.actor, panic = panic_message(panic.as_ref()), "handler panicked");
            }
        }
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}

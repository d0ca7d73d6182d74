//! In-process connection backed by channels.
//!
//! [`memory_connection`] returns a [`MemoryConnection`] to hand to the bot
//! engine and a [`MemoryRemote`] playing the platform's side: it injects
//! inbound events and observes everything the bot sends.
//!
//! ```rust,ignore
//! let (connection, mut remote) = memory_connection();
//! remote.send(Event::connected("U1", "bot"))?;
//! remote.send(Event::message("C1", "U2", "hello"))?;
//! remote.close();
//!
//! bot.run().await?;
//! assert_eq!(remote.drain().len(), 1);
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::connection::{Connection, PostContent, PostParams, PostResponse};
use crate::error::{ApiError, ApiResult};
use crate::event::Event;

/// Everything a bot sent through a [`MemoryConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Message {
        channel: String,
        text: String,
    },
    Typing {
        channel: String,
    },
    Post {
        channel: String,
        content: PostContent,
        params: PostParams,
    },
}

impl Outbound {
    /// Returns the channel this item was sent to.
    pub fn channel(&self) -> &str {
        match self {
            Self::Message { channel, .. } | Self::Typing { channel } | Self::Post { channel, .. } => {
                channel
            }
        }
    }
}

/// A [`Connection`] whose platform side is a [`MemoryRemote`].
pub struct MemoryConnection {
    inbound: Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
    outbound: mpsc::UnboundedSender<Outbound>,
    failure: Mutex<Option<ApiError>>,
    posted: Mutex<u64>,
}

/// The platform side of a [`MemoryConnection`].
pub struct MemoryRemote {
    events: Option<mpsc::UnboundedSender<Event>>,
    outbound: mpsc::UnboundedReceiver<Outbound>,
}

/// A clonable handle that injects inbound events, detached from a
/// [`MemoryRemote`].
///
/// The inbound stream stays open while any injector is alive.
#[derive(Debug, Clone)]
pub struct EventInjector {
    events: mpsc::UnboundedSender<Event>,
}

impl EventInjector {
    pub fn send(&self, event: impl Into<Event>) -> ApiResult<()> {
        self.events.send(event.into()).map_err(|_| ApiError::Closed)
    }
}

/// Creates a connected pair of in-memory endpoints.
pub fn memory_connection() -> (MemoryConnection, MemoryRemote) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let connection = MemoryConnection {
        inbound: Mutex::new(Some(events_rx)),
        outbound: outbound_tx,
        failure: Mutex::new(None),
        posted: Mutex::new(0),
    };
    let remote = MemoryRemote {
        events: Some(events_tx),
        outbound: outbound_rx,
    };

    (connection, remote)
}

impl MemoryConnection {
    /// Makes every subsequent send fail with `error`.
    pub fn fail_sends(&self, error: ApiError) {
        *self.failure.lock() = Some(error);
    }

    /// Lets sends succeed again.
    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    fn record(&self, item: Outbound) -> ApiResult<()> {
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        self.outbound.send(item).map_err(|_| ApiError::Closed)
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn manage(&self, events: mpsc::Sender<Event>) {
        let Some(mut inbound) = self.inbound.lock().take() else {
            warn!("Memory connection is already managed, ignoring second manage call");
            return;
        };

        while let Some(event) = inbound.recv().await {
            if events.send(event).await.is_err() {
                debug!("Event receiver dropped, stopping memory connection");
                return;
            }
        }
        debug!("Memory remote closed the inbound stream");
    }

    async fn send_message(&self, channel: &str, text: &str) -> ApiResult<()> {
        self.record(Outbound::Message {
            channel: channel.to_string(),
            text: text.to_string(),
        })
    }

    async fn send_typing(&self, channel: &str) -> ApiResult<()> {
        self.record(Outbound::Typing {
            channel: channel.to_string(),
        })
    }

    async fn post_message(
        &self,
        channel: &str,
        content: PostContent,
        params: PostParams,
    ) -> ApiResult<PostResponse> {
        self.record(Outbound::Post {
            channel: channel.to_string(),
            content,
            params,
        })?;

        let mut posted = self.posted.lock();
        *posted += 1;
        Ok(PostResponse {
            channel: channel.to_string(),
            timestamp: format!("{}.000000", *posted),
        })
    }
}

impl MemoryRemote {
    /// Injects an inbound event.
    pub fn send(&self, event: impl Into<Event>) -> ApiResult<()> {
        let events = self.events.as_ref().ok_or(ApiError::Closed)?;
        events.send(event.into()).map_err(|_| ApiError::Closed)
    }

    /// Returns an injector for use on another task, or `None` once closed.
    pub fn injector(&self) -> Option<EventInjector> {
        self.events.clone().map(|events| EventInjector { events })
    }

    /// Ends the inbound stream unless injectors are still alive. Outbound
    /// traffic is still observable.
    pub fn close(&mut self) {
        self.events = None;
    }

    /// Waits for the next outbound item.
    pub async fn recv(&mut self) -> Option<Outbound> {
        self.outbound.recv().await
    }

    /// Returns the next outbound item if one is already queued.
    pub fn try_recv(&mut self) -> Option<Outbound> {
        self.outbound.try_recv().ok()
    }

    /// Returns every queued outbound item.
    pub fn drain(&mut self) -> Vec<Outbound> {
        let mut items = Vec::new();
        while let Ok(item) = self.outbound.try_recv() {
            items.push(item);
        }
        items
    }
}

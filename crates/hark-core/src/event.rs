//! Event system for Hark.
//!
//! This module provides the inbound event model consumed by the bot engine:
//!
//! - [`Event`] - One unit of the real-time stream, as delivered by a connection
//! - [`EventKind`] - Classification used by routes to filter events
//! - [`ConnectedEvent`], [`MessageEvent`], [`ErrorEvent`], [`OtherEvent`] - Payloads
//!
//! Only [`Event::Message`] carries text, so it is the only kind a pattern can
//! ever match. The remaining kinds drive the engine's own state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Event Kind Classification
// ============================================================================

/// Classification of inbound events.
///
/// Routes carry an `EventKind` and are only considered for events of the
/// same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The connection was (re-)established and the bot identity is known.
    Connected,
    /// A chat message posted in a channel.
    #[default]
    Message,
    /// The platform rejected the bot's credentials.
    InvalidAuth,
    /// A transport-level failure surfaced as an event.
    TransportError,
    /// Anything the dispatcher does not care about.
    Other,
}

impl EventKind {
    /// Returns the lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Message => "message",
            Self::InvalidAuth => "invalid_auth",
            Self::TransportError => "transport_error",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind '{0}'")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Connected,
            Self::Message,
            Self::InvalidAuth,
            Self::TransportError,
            Self::Other,
        ]
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

// ============================================================================
// Event Payloads
// ============================================================================

/// Sent once per successful connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedEvent {
    /// Platform user ID assigned to the bot.
    pub user_id: String,
    /// Platform user name of the bot.
    pub user_name: String,
    /// How many times the connection has been established so far.
    #[serde(default)]
    pub connection_count: u32,
}

/// A message posted in a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Channel the message was posted in; replies go back here.
    pub channel: String,
    /// Sender identity. Some platforms report a user name instead of an ID.
    pub user: String,
    /// Message body.
    pub text: String,
    /// The undecoded platform payload.
    #[serde(default)]
    pub raw: Value,
}

impl MessageEvent {
    /// Creates a message event without a raw payload.
    pub fn new(
        channel: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            user: user.into(),
            text: text.into(),
            raw: Value::Null,
        }
    }

    /// Attaches the raw platform payload.
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = raw;
        self
    }
}

/// A transport failure reported through the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Short label for the failure, e.g. `ack`, `rate_limited`, `disconnected`.
    pub kind: String,
    /// Human readable description.
    pub message: String,
}

impl ErrorEvent {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Any platform event the dispatcher ignores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherEvent {
    /// Platform event name (e.g. `presence_change`).
    pub name: String,
    #[serde(default)]
    pub raw: Value,
}

// ============================================================================
// Event
// ============================================================================

/// One unit of the inbound real-time stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Connected(ConnectedEvent),
    Message(MessageEvent),
    InvalidAuth,
    TransportError(ErrorEvent),
    Other(OtherEvent),
}

impl Event {
    /// Returns the classification of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connected(_) => EventKind::Connected,
            Self::Message(_) => EventKind::Message,
            Self::InvalidAuth => EventKind::InvalidAuth,
            Self::TransportError(_) => EventKind::TransportError,
            Self::Other(_) => EventKind::Other,
        }
    }

    /// Returns the text routes are matched against, if this event has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Message(msg) => Some(&msg.text),
            _ => None,
        }
    }

    /// Returns the message payload if this is a message event.
    pub fn as_message(&self) -> Option<&MessageEvent> {
        match self {
            Self::Message(msg) => Some(msg),
            _ => None,
        }
    }

    /// Shorthand for building a message event.
    pub fn message(
        channel: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::Message(MessageEvent::new(channel, user, text))
    }

    /// Shorthand for building a connected event.
    pub fn connected(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self::Connected(ConnectedEvent {
            user_id: user_id.into(),
            user_name: user_name.into(),
            connection_count: 1,
        })
    }
}

impl From<MessageEvent> for Event {
    fn from(msg: MessageEvent) -> Self {
        Self::Message(msg)
    }
}

impl From<ErrorEvent> for Event {
    fn from(err: ErrorEvent) -> Self {
        Self::TransportError(err)
    }
}

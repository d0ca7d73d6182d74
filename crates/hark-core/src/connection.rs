//! Connection trait and outbound message types.
//!
//! A [`Connection`] is the platform client the bot engine talks to. It owns
//! everything platform specific: authentication, the socket, keepalive and
//! reconnection, and the wire format. The engine only sees decoded
//! [`Event`]s coming in and the three send operations going out.
//!
//! ```text
//! ┌────────────┐  Event (mpsc)   ┌────────────┐
//! │ Connection │────────────────▶│ Bot engine │
//! │  (manage)  │◀────────────────│  (replies) │
//! └────────────┘ send/typing/post└────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::attachment::Attachment;
use crate::error::ApiResult;
use crate::event::Event;

/// Parameters for API-style posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostParams {
    /// Post as the authenticated bot user rather than as an app.
    pub as_user: bool,
    /// Name the post is attributed to.
    pub username: String,
    /// Expand `@name` and `#channel` references into links.
    pub link_names: bool,
    pub unfurl_links: bool,
    pub unfurl_media: bool,
}

/// Body of an API-style post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum PostContent {
    Text(String),
    Attachments(Vec<Attachment>),
}

/// What the platform reports back for a successful post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    pub channel: String,
    /// Platform timestamp identifying the posted message.
    pub timestamp: String,
}

/// The platform client.
///
/// [`manage`](Connection::manage) is spawned exactly once by the bot engine as
/// an independent task. It must push every decoded event into `events` in
/// arrival order and return when the connection is permanently gone or the
/// receiver has been dropped.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Maintains the connection and forwards inbound events.
    async fn manage(&self, events: mpsc::Sender<Event>);

    /// Sends a plain text message over the streaming path.
    async fn send_message(&self, channel: &str, text: &str) -> ApiResult<()>;

    /// Sends a "typing" indicator over the streaming path.
    async fn send_typing(&self, channel: &str) -> ApiResult<()>;

    /// Posts a message through the request/response API.
    async fn post_message(
        &self,
        channel: &str,
        content: PostContent,
        params: PostParams,
    ) -> ApiResult<PostResponse>;
}

/// A shared, type-erased connection.
pub type BoxedConnection = Arc<dyn Connection>;

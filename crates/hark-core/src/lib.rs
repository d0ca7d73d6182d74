//! # Hark Core
//!
//! Foundation types shared by every Hark layer:
//!
//! - **Events**: the inbound stream model ([`Event`], [`EventKind`], [`MessageEvent`])
//! - **Identity**: who the bot is on the platform ([`Identity`])
//! - **Attachments**: structured rich payloads ([`Attachment`])
//! - **Connection**: the platform client seam ([`Connection`]) and an
//!   in-process implementation ([`MemoryConnection`])
//!
//! No platform wire format lives here; decoding belongs to connection
//! implementations.

pub mod attachment;
pub mod connection;
pub mod error;
pub mod event;
pub mod identity;
pub mod memory;

pub use attachment::{Attachment, AttachmentField};
pub use connection::{BoxedConnection, Connection, PostContent, PostParams, PostResponse};
pub use error::{ApiError, ApiResult};
pub use event::{
    ConnectedEvent, ErrorEvent, Event, EventKind, MessageEvent, OtherEvent,
    UnknownEventKind,
};
pub use identity::Identity;
pub use memory::{EventInjector, MemoryConnection, MemoryRemote, Outbound, memory_connection};

//! # Hark Framework
//!
//! Dispatch components for building chat bots.
//!
//! This layer provides:
//! - An immutable, append-only request [`Context`]
//! - Axum-style [`Handler`]s whose parameters are extracted via [`FromContext`]
//! - Pattern [`Route`]s and the first-match-wins [`Router`]
//! - The typing-delay estimator ([`estimate_delay`], [`TypingEstimator`])
//!
//! The framework does not own a connection or an event loop; the runtime
//! layer drives it.

pub mod context;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod route;
pub mod router;
pub mod typing;

pub use context::Context;
pub use error::{ExtractError, ExtractResult, FrameworkError, FrameworkResult};
pub use extractor::FromContext;
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, HandlerFn, into_handler};
pub use route::{Captures, Route, RouteBuilder};
pub use router::{RouteMatch, Router};
pub use typing::{
    ATTACHMENT_PLACEHOLDER, AttachmentDelay, Payload, TypingConfig, TypingEstimator,
    estimate_delay,
};

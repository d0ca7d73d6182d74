//! Extractor system for the Hark framework.
//!
//! This module provides the [`FromContext`] trait, which defines how types
//! can be extracted from a [`Context`] for use as handler parameters.
//!
//! Any binding in the context can be requested as `Arc<T>`; the engine binds
//! the bot as `Arc<Bot>`, the current message as `Arc<MessageEvent>`, and the
//! matched groups as `Arc<Captures>`.

use std::sync::Arc;

use crate::context::Context;
use crate::error::ExtractResult;

/// A trait for types that can be extracted from a [`Context`].
///
/// If extraction fails, the handler is skipped.
///
/// # Example
///
/// ```rust,ignore
/// use hark_framework::{Context, ExtractError, ExtractResult, FromContext};
///
/// struct Channel(String);
///
/// impl FromContext for Channel {
///     fn from_context(ctx: &Context) -> ExtractResult<Self> {
///         ctx.message()
///             .map(|msg| Channel(msg.channel.clone()))
///             .ok_or(ExtractError::Missing("MessageEvent"))
///     }
/// }
/// ```
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &Context) -> ExtractResult<Self>;
}

/// The whole context, for handlers that want to look bindings up themselves.
impl FromContext for Context {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(ctx.clone())
    }
}

/// Any binding, by type.
impl<T: Send + Sync + 'static> FromContext for Arc<T> {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        ctx.require::<T>()
    }
}

/// Optional parameters never cause the handler to be skipped.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

//! Handler system for the Hark framework.
//!
//! Handlers are plain async functions whose parameters are pulled out of the
//! request [`Context`] through [`FromContext`], similar to Axum's handler
//! system.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hark_framework::{Captures, Context};
//! use hark_core::MessageEvent;
//!
//! // No parameters
//! async fn ping() {}
//!
//! // The whole context
//! async fn raw(ctx: Context) {
//!     println!("bindings: {ctx:?}");
//! }
//!
//! // Individual bindings
//! async fn how_are_you(msg: Arc<MessageEvent>, caps: Arc<Captures>) {
//!     println!("{} asked {:?}", msg.user, caps.get(1));
//! }
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::extractor::FromContext;

/// Boxed `Send` future returned by type-erased handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for route handlers.
///
/// Automatically implemented for async functions and closures that take up to
/// eight parameters implementing [`FromContext`] and return `()`.
///
/// If a parameter cannot be extracted the handler is skipped.
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Future driving one invocation.
    type Future: Future<Output = ()> + Send + 'static;

    /// Extracts the parameters from `ctx` and runs the handler.
    fn call(self, ctx: Context) -> Self::Future;
}

/// A wrapper that turns a [`Handler`] into an [`ErasedHandler`].
pub struct HandlerFn<F, T> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> HandlerFn<F, T> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F: Clone, T> Clone for HandlerFn<F, T> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

/// A type-erased handler that can be stored in a route.
pub type BoxedHandler = Arc<dyn ErasedHandler>;

/// Object-safe form of [`Handler`], stored inside routes.
pub trait ErasedHandler: Send + Sync {
    /// Runs the handler against `ctx`.
    fn call(&self, ctx: Context) -> BoxFuture<'static, ()>;
}

impl<F, T> ErasedHandler for HandlerFn<F, T>
where
    F: Handler<T>,
    T: 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture<'static, ()> {
        Box::pin(<F as Handler<T>>::call(self.f.clone(), ctx))
    }
}

/// Erases a handler so it can be stored in a [`Route`](crate::Route).
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(HandlerFn::new(f))
}

// ============================================================================
// Function handlers, one impl per arity
// ============================================================================

impl<F, Fut> Handler<()> for F
where
    F: FnOnce() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    type Future = Fut;

    fn call(self, _ctx: Context) -> Self::Future {
        (self)()
    }
}

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        impl<F, Fut, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = ()> + Send + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            type Future = BoxFuture<'static, ()>;

            fn call(self, ctx: Context) -> Self::Future {
                Box::pin(async move {
                    $(
                        let $ty = match $ty::from_context(&ctx) {
                            Ok(value) => value,
                            Err(err) => {
                                debug!(error = %err, "Handler parameter unavailable, skipping");
                                return;
                            }
                        };
                    )*

                    (self)($($ty,)*).await;
                })
            }
        }
    };
}

impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

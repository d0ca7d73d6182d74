//! Request-scoped context for the Hark framework.
//!
//! A [`Context`] is an immutable, append-only chain of bindings keyed by type.
//! The bot engine builds one per inbound event:
//!
//! ```text
//! background ──▶ + Arc<Bot> ──▶ + MessageEvent ──▶ + Captures
//! ```
//!
//! Every `with_*` call returns a **new** context that shares its tail with
//! the one it was derived from. Nothing is ever mutated in place, so two
//! contexts derived from the same base can never observe each other's
//! bindings, and cloning is a single reference-count bump.
//!
//! Lookups walk from the newest binding to the oldest, so a later binding of
//! the same type shadows an earlier one.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use hark_core::MessageEvent;

use crate::error::{ExtractError, ExtractResult};
use crate::route::Captures;

type Value = Arc<dyn Any + Send + Sync>;

struct Binding {
    key: TypeId,
    name: &'static str,
    value: Value,
    parent: Option<Arc<Binding>>,
}

/// The immutable per-event chain of bindings handed to handlers.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Binding>>,
}

impl Context {
    /// Returns an empty context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a new context with `value` bound under its type.
    pub fn with_value<T: Send + Sync + 'static>(&self, value: T) -> Self {
        self.with_arc(Arc::new(value))
    }

    /// Returns a new context binding an already shared value.
    pub fn with_arc<T: Send + Sync + 'static>(&self, value: Arc<T>) -> Self {
        Self {
            head: Some(Arc::new(Binding {
                key: TypeId::of::<T>(),
                name: type_name::<T>(),
                value,
                parent: self.head.clone(),
            })),
        }
    }

    /// Looks up the nearest binding of type `T`.
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let key = TypeId::of::<T>();
        self.bindings()
            .find(|binding| binding.key == key)
            .and_then(|binding| Arc::clone(&binding.value).downcast::<T>().ok())
    }

    /// Like [`value`](Self::value) but reports which type was missing.
    pub fn require<T: Send + Sync + 'static>(&self) -> ExtractResult<Arc<T>> {
        self.value::<T>()
            .ok_or(ExtractError::Missing(type_name::<T>()))
    }

    /// Returns `true` if a binding of type `T` exists.
    pub fn contains<T: 'static>(&self) -> bool {
        let key = TypeId::of::<T>();
        self.bindings().any(|binding| binding.key == key)
    }

    /// Number of bindings in the chain, shadowed ones included.
    pub fn depth(&self) -> usize {
        self.bindings().count()
    }

    /// Type names of all bindings, newest first.
    pub fn binding_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings().map(|binding| binding.name)
    }

    fn bindings(&self) -> impl Iterator<Item = &Binding> + '_ {
        std::iter::successors(self.head.as_deref(), |binding| binding.parent.as_deref())
    }

    // ─── Well-known bindings ────────────────────────────────────────────────

    /// Binds the message currently being dispatched.
    pub fn with_message(&self, message: MessageEvent) -> Self {
        self.with_value(message)
    }

    /// Returns the message currently being dispatched.
    pub fn message(&self) -> Option<Arc<MessageEvent>> {
        self.value::<MessageEvent>()
    }

    /// Returns the capture groups of the route that matched.
    pub fn captures(&self) -> Option<Arc<Captures>> {
        self.value::<Captures>()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.binding_names()).finish()
    }
}

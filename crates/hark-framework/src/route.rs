//! Routes for the Hark framework.
//!
//! A [`Route`] binds a compiled text pattern and an event kind to a handler.
//! Routes are created through [`Router::hear`](crate::Router::hear), which
//! hands back a [`RouteBuilder`] for the one configuration step a route ever
//! gets. Once the builder is dropped the route is frozen.
//!
//! # Example
//!
//! ```rust,ignore
//! router
//!     .hear("(?i)how are you(.*)")?
//!     .name("how-are-you")
//!     .message_handler(how_are_you);
//! ```

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use hark_core::{Event, EventKind};

use crate::handler::{BoxedHandler, Handler, into_handler};

/// A registered (pattern, event kind, handler) binding.
pub struct Route {
    pattern: Regex,
    kind: EventKind,
    handler: Option<BoxedHandler>,
    name: Option<String>,
}

impl Route {
    pub(crate) fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            kind: EventKind::Message,
            handler: None,
            name: None,
        }
    }

    /// Returns the source text of the pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the event kind this route accepts.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns the name of this route, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the handler, if one was attached.
    pub fn handler(&self) -> Option<&BoxedHandler> {
        self.handler.as_ref()
    }

    /// Returns `true` if this route would be selected for `event`.
    ///
    /// A route without a handler never matches.
    pub fn matches(&self, event: &Event) -> bool {
        self.handler.is_some()
            && self.kind == event.kind()
            && event.text().is_some_and(|text| self.pattern.is_match(text))
    }

    /// Runs the pattern against `text` and collects the capture groups.
    pub(crate) fn captures(&self, text: &str) -> Option<Captures> {
        self.pattern
            .captures(text)
            .map(|caps| Captures::new(&self.pattern, &caps))
    }

    /// Label used in logs.
    pub(crate) fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.pattern.as_str())
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

// ============================================================================
// RouteBuilder
// ============================================================================

/// Configures a freshly registered [`Route`].
///
/// The builder holds the only mutable borrow of the route; chain calls and
/// let it drop to freeze the route.
pub struct RouteBuilder<'a> {
    route: &'a mut Route,
}

impl<'a> RouteBuilder<'a> {
    pub(crate) fn new(route: &'a mut Route) -> Self {
        Self { route }
    }

    /// Restricts the route to events of `kind`.
    pub fn kind(self, kind: EventKind) -> Self {
        self.route.kind = kind;
        self
    }

    /// Restricts the route to message events.
    pub fn messages(self) -> Self {
        self.kind(EventKind::Message)
    }

    /// Sets a name for this route (useful for debugging).
    pub fn name(self, name: impl Into<String>) -> Self {
        self.route.name = Some(name.into());
        self
    }

    /// Attaches the handler invoked when this route wins.
    ///
    /// Calling it again replaces the previous handler.
    pub fn handler<F, T>(self, f: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.handler_boxed(into_handler(f))
    }

    /// Attaches a pre-built boxed handler.
    pub fn handler_boxed(self, handler: BoxedHandler) -> Self {
        self.route.handler = Some(handler);
        self
    }

    /// Restricts the route to message events and attaches `f`.
    pub fn message_handler<F, T>(self, f: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.messages().handler(f)
    }
}

// ============================================================================
// Captures
// ============================================================================

/// Capture groups produced by the route that matched.
///
/// Bound into the handler's [`Context`](crate::Context) so handlers never see
/// raw regex state. Group 0 is the whole match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    groups: Vec<Option<String>>,
    names: HashMap<String, usize>,
}

impl Captures {
    fn new(pattern: &Regex, caps: &regex::Captures<'_>) -> Self {
        let groups = caps
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        let names = pattern
            .capture_names()
            .enumerate()
            .filter_map(|(i, name)| name.map(|n| (n.to_string(), i)))
            .collect();

        Self { groups, names }
    }

    /// Returns group `index`, if it participated in the match.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }

    /// Returns the named group `name`, if it participated in the match.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.names.get(name).and_then(|&i| self.get(i))
    }

    /// Returns the whole matched text.
    pub fn full(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// Number of groups, including group 0.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

//! Ordered route registry for the Hark framework.
//!
//! The [`Router`] keeps routes in registration order and selects the **first**
//! one whose event kind and pattern both match. Order is the only tie-break:
//! a broad pattern registered early shadows a more specific one registered
//! later.
//!
//! ```rust,ignore
//! let mut router = Router::new();
//! router.hear("hi")?.message_handler(greet);          // wins for "hi there"
//! router.hear("hi there")?.message_handler(greet_long); // never reached by "hi there"
//!
//! if let Some(found) = router.find(&ctx, &event) {
//!     found.call().await;
//! }
//! ```

use regex::Regex;
use tracing::{debug, trace};

use hark_core::{Event, EventKind};

use crate::context::Context;
use crate::error::{FrameworkError, FrameworkResult};
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::route::{Route, RouteBuilder};

/// The ordered registry performing first-match dispatch.
///
/// Routes can only be added through `&mut Router`; once the registry is
/// shared with the receive loop it is read-only.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

/// The winning route together with the context its handler should receive.
pub struct RouteMatch<'r> {
    route: &'r Route,
    handler: &'r BoxedHandler,
    context: Context,
}

impl<'r> RouteMatch<'r> {
    /// Returns the route that matched.
    pub fn route(&self) -> &'r Route {
        self.route
    }

    /// Returns the matched route's handler.
    pub fn handler(&self) -> &'r BoxedHandler {
        self.handler
    }

    /// Returns the context carrying the match-specific bindings.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Invokes the handler with the match context.
    pub fn call(self) -> BoxFuture<'static, ()> {
        self.handler.call(self.context)
    }
}

impl Router {
    /// Creates a new, empty router.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers a route for `pattern` at the end of the list.
    ///
    /// The pattern uses search semantics; write `(?i)` for case-insensitive
    /// matching. The route defaults to message events and has no handler
    /// until one is attached through the returned builder.
    pub fn hear(&mut self, pattern: &str) -> FrameworkResult<RouteBuilder<'_>> {
        let regex = Regex::new(pattern).map_err(|source| FrameworkError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let position = self.routes.len();
        self.routes.push(Route::new(regex));
        debug!(pattern, position, "Route registered");

        Ok(RouteBuilder::new(&mut self.routes[position]))
    }

    /// Registers a fully specified route in one call.
    pub fn add_route<F, T>(
        &mut self,
        pattern: &str,
        kind: EventKind,
        handler: F,
    ) -> FrameworkResult<RouteBuilder<'_>>
    where
        F: Handler<T>,
        T: 'static,
    {
        Ok(self.hear(pattern)?.kind(kind).handler(handler))
    }

    /// Returns the number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Selects the first route matching `event`.
    ///
    /// On success the returned context is `ctx` extended with the route's
    /// [`Captures`](crate::Captures). Returns `None` if no route matches;
    /// that is not an error.
    pub fn find(&self, ctx: &Context, event: &Event) -> Option<RouteMatch<'_>> {
        let text = event.text()?;

        for route in &self.routes {
            let Some(handler) = route.handler() else {
                continue;
            };
            if route.kind() != event.kind() {
                continue;
            }
            let Some(captures) = route.captures(text) else {
                trace!(route = route.label(), "Route pattern did not match");
                continue;
            };

            debug!(route = route.label(), "Route matched");
            return Some(RouteMatch {
                route,
                handler,
                context: ctx.with_value(captures),
            });
        }

        trace!(kind = %event.kind(), "No route matched");
        None
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("route_count", &self.routes.len())
            .finish()
    }
}

//! The bot engine.
//!
//! A [`Bot`] owns the [`Router`], the platform
//! [`Connection`](hark_core::Connection) and the bot's
//! own [`Identity`]. Routes are registered through `&mut Bot`; once the bot is
//! wrapped in an `Arc` and [`run`](Bot::run) is called the route table is
//! frozen.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hark_runtime::{Bot, Typing};
//! use hark_core::MessageEvent;
//!
//! async fn hello(bot: Arc<Bot>, msg: Arc<MessageEvent>) {
//!     let _ = bot.reply(&msg, "hi there", Typing::With).await;
//! }
//!
//! let mut bot = Bot::new(connection);
//! bot.hear("(?i)^hello")?.message_handler(hello);
//! Arc::new(bot).run().await?;
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use hark_core::{
    ApiResult, Attachment, BoxedConnection, Event, EventKind, Identity, MessageEvent, PostContent,
    PostParams,
};
use hark_framework::{Context, Handler, Payload, RouteBuilder, Router, TypingEstimator};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::task::AbortOnDropHandle;
use tracing::{Instrument, debug, error, info, info_span, trace, warn};

use crate::config::{BotSettings, HarkConfig, SendErrors};
use crate::error::{RuntimeError, RuntimeResult};

/// Whether a reply is preceded by a simulated typing pause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Typing {
    /// Send a typing indicator and wait before replying.
    With,
    #[default]
    Without,
}

impl From<bool> for Typing {
    fn from(typing: bool) -> Self {
        if typing { Self::With } else { Self::Without }
    }
}

/// Outcome of handling one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Terminate,
}

/// The receive loop, route table and reply primitives of one bot.
pub struct Bot {
    connection: BoxedConnection,
    router: Router,
    identity: RwLock<Identity>,
    typing: TypingEstimator,
    settings: BotSettings,
}

impl Bot {
    /// Creates a bot with default settings.
    pub fn new(connection: BoxedConnection) -> Self {
        Self::with_config(connection, &HarkConfig::default())
    }

    /// Creates a bot using the `bot` and `typing` sections of `config`.
    pub fn with_config(connection: BoxedConnection, config: &HarkConfig) -> Self {
        Self {
            connection,
            router: Router::new(),
            identity: RwLock::new(Identity::default()),
            typing: TypingEstimator::new(config.typing),
            settings: config.bot.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Registers a route for `pattern`, to be qualified through the builder.
    pub fn hear(&mut self, pattern: &str) -> RuntimeResult<RouteBuilder<'_>> {
        Ok(self.router.hear(pattern)?)
    }

    /// Registers a complete route in one call.
    pub fn add_route<F, T>(
        &mut self,
        pattern: &str,
        kind: EventKind,
        handler: F,
    ) -> RuntimeResult<RouteBuilder<'_>>
    where
        F: Handler<T>,
        T: 'static,
    {
        Ok(self.router.add_route(pattern, kind, handler)?)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Snapshot of the bot's identity. Empty until the first Connected event.
    pub fn identity(&self) -> Identity {
        self.identity.read().clone()
    }

    pub fn user_id(&self) -> String {
        self.identity.read().user_id.clone()
    }

    pub fn user_name(&self) -> String {
        self.identity.read().user_name.clone()
    }

    pub fn connection(&self) -> &BoxedConnection {
        &self.connection
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn typing_estimator(&self) -> &TypingEstimator {
        &self.typing
    }

    // ------------------------------------------------------------------
    // Receive loop
    // ------------------------------------------------------------------

    /// Runs the receive loop until the event stream ends or authentication
    /// is rejected.
    ///
    /// The connection's [`manage`](hark_core::Connection::manage) runs as a
    /// separate task that does not outlive the loop. Events are handled
    /// strictly one at a time, in arrival order.
    pub async fn run(self: Arc<Self>) -> RuntimeResult<()> {
        let (events_tx, mut events_rx) = mpsc::channel(self.settings.event_buffer.max(1));

        // Aborted when dropped, including when this future is cancelled.
        let connection = Arc::clone(&self.connection);
        let _manager = AbortOnDropHandle::new(tokio::spawn(async move {
            connection.manage(events_tx).await;
        }));

        info!(routes = self.router.len(), "Receive loop started");

        while let Some(event) = events_rx.recv().await {
            if self.handle_event(event).await == Flow::Terminate {
                return Err(RuntimeError::InvalidAuth);
            }
        }

        info!("Event stream closed, receive loop stopped");
        Ok(())
    }

    async fn handle_event(self: &Arc<Self>, event: Event) -> Flow {
        let ctx = Context::background().with_arc(Arc::clone(self));

        match &event {
            Event::Connected(connected) => {
                *self.identity.write() =
                    Identity::new(connected.user_id.as_str(), connected.user_name.as_str());
                info!(
                    user_id = %connected.user_id,
                    user_name = %connected.user_name,
                    connection_count = connected.connection_count,
                    "Connected"
                );
            }
            Event::Message(message) => self.dispatch_message(ctx, message, &event).await,
            Event::InvalidAuth => {
                error!("Invalid authentication, stopping receive loop");
                return Flow::Terminate;
            }
            Event::TransportError(err) => {
                warn!(kind = %err.kind, detail = %err.message, "Transport error");
            }
            Event::Other(other) => {
                trace!(name = %other.name, "Ignoring event");
            }
        }

        Flow::Continue
    }

    async fn dispatch_message(&self, ctx: Context, message: &MessageEvent, event: &Event) {
        let from_self = self.identity.read().is_self(&message.user);
        if from_self {
            trace!(channel = %message.channel, user = %message.user, "Suppressing own message");
            return;
        }

        let ctx = ctx.with_message(message.clone());
        let Some(matched) = self.router.find(&ctx, event) else {
            debug!(channel = %message.channel, "No route for message");
            return;
        };

        let route = matched
            .route()
            .name()
            .unwrap_or_else(|| matched.route().pattern())
            .to_string();
        let span = info_span!(
            "hark.dispatch",
            route = %route,
            channel = %message.channel,
            user = %message.user,
        );

        if self.settings.isolate_panics {
            // The call itself runs inside the guard: handlers may panic before
            // returning their future.
            let call = AssertUnwindSafe(async move { matched.call().await });
            if let Err(panic) = call.catch_unwind().instrument(span).await {
                error!(route = %route, panic = panic_message(&*panic), "Handler panicked");
            }
        } else {
            matched.call().instrument(span).await;
        }
    }

    // ------------------------------------------------------------------
    // Reply primitives
    // ------------------------------------------------------------------

    /// Replies in the message's channel over the streaming path.
    pub async fn reply(
        &self,
        event: &MessageEvent,
        text: &str,
        typing: impl Into<Typing>,
    ) -> RuntimeResult<()> {
        if typing.into() == Typing::With {
            self.type_indicator(event, text).await?;
        }
        let result = self.connection.send_message(&event.channel, text).await;
        self.settle("send_message", &event.channel, result)
    }

    /// Replies in the message's channel through the posting API, as the bot
    /// user with link expansion and unfurling enabled.
    pub async fn reply_post(
        &self,
        event: &MessageEvent,
        text: &str,
        typing: impl Into<Typing>,
    ) -> RuntimeResult<()> {
        if typing.into() == Typing::With {
            self.type_indicator(event, text).await?;
        }
        let params = PostParams {
            as_user: true,
            username: self.user_id(),
            link_names: true,
            unfurl_links: true,
            unfurl_media: true,
        };
        let result = self
            .connection
            .post_message(&event.channel, PostContent::Text(text.to_string()), params)
            .await;
        self.settle("post_message", &event.channel, result)
    }

    /// Posts structured attachments in the message's channel, as the bot
    /// user with link expansion and no unfurling.
    pub async fn reply_with_attachments(
        &self,
        event: &MessageEvent,
        attachments: Vec<Attachment>,
        typing: impl Into<Typing>,
    ) -> RuntimeResult<()> {
        if typing.into() == Typing::With {
            let delay = self.typing.estimate(self.typing.attachment_payload(&attachments));
            self.simulate_typing(&event.channel, delay).await?;
        }
        let params = PostParams {
            as_user: true,
            username: self.user_id(),
            link_names: true,
            ..PostParams::default()
        };
        let result = self
            .connection
            .post_message(&event.channel, PostContent::Attachments(attachments), params)
            .await;
        self.settle("post_message", &event.channel, result)
    }

    /// Shows the typing indicator in the message's channel, then waits as
    /// long as typing `payload` would take.
    pub async fn type_indicator<'a>(
        &self,
        event: &MessageEvent,
        payload: impl Into<Payload<'a>>,
    ) -> RuntimeResult<()> {
        let delay = self.typing.estimate(payload);
        self.simulate_typing(&event.channel, delay).await
    }

    async fn simulate_typing(&self, channel: &str, delay: Duration) -> RuntimeResult<()> {
        let result = self.connection.send_typing(channel).await;
        self.settle("send_typing", channel, result)?;
        trace!(channel, delay_ms = delay.as_millis() as u64, "Typing");
        tokio::time::sleep(delay).await;
        Ok(())
    }

    /// Applies the configured send-error policy.
    fn settle<T>(
        &self,
        operation: &'static str,
        channel: &str,
        result: ApiResult<T>,
    ) -> RuntimeResult<()> {
        match result {
            Ok(_) => Ok(()),
            Err(err) => match self.settings.send_errors {
                SendErrors::Swallow => {
                    warn!(operation, channel, error = %err, "Send failed");
                    Ok(())
                }
                SendErrors::Surface => Err(err.into()),
            },
        }
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("identity", &*self.identity.read())
            .field("router", &self.router)
            .field("settings", &self.settings)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}

/// Access to the bot from a handler's [`Context`].
pub trait BotContextExt {
    /// The bot handling the current event.
    fn bot(&self) -> Option<Arc<Bot>>;
}

impl BotContextExt for Context {
    fn bot(&self) -> Option<Arc<Bot>> {
        self.value::<Bot>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttachmentDelay;
    use hark_core::{
        ApiError, ErrorEvent, MemoryConnection, MemoryRemote, Outbound, OtherEvent,
        memory_connection,
    };
    use hark_framework::Captures;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    fn setup(config: &HarkConfig) -> (Bot, Arc<MemoryConnection>, MemoryRemote) {
        let (connection, remote) = memory_connection();
        let connection = Arc::new(connection);
        let bot = Bot::with_config(connection.clone(), config);
        (bot, connection, remote)
    }

    async fn echo(bot: Arc<Bot>, msg: Arc<MessageEvent>) {
        bot.reply(&msg, &msg.text, Typing::Without).await.unwrap();
    }

    async fn explode() {
        panic!("handler exploded");
    }

    fn texts(outbound: Vec<Outbound>) -> Vec<String> {
        outbound
            .into_iter()
            .filter_map(|item| match item {
                Outbound::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_first_registered_route_wins() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        bot.hear("hello")
            .unwrap()
            .message_handler(|bot: Arc<Bot>, msg: Arc<MessageEvent>| async move {
                bot.reply(&msg, "first", Typing::Without).await.unwrap();
            });
        bot.hear("hello world")
            .unwrap()
            .message_handler(|bot: Arc<Bot>, msg: Arc<MessageEvent>| async move {
                bot.reply(&msg, "second", Typing::Without).await.unwrap();
            });

        remote.send(Event::message("C1", "U2", "hello world")).unwrap();
        remote.close();
        Arc::new(bot).run().await.unwrap();

        assert_eq!(texts(remote.drain()), vec!["first"]);
    }

    #[tokio::test]
    async fn test_own_messages_are_suppressed() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        bot.hear(".*").unwrap().message_handler(echo);

        remote.send(Event::connected("UBOT", "harkbot")).unwrap();
        remote.send(Event::message("C1", "UBOT", "by id")).unwrap();
        remote.send(Event::message("C1", "harkbot", "by name")).unwrap();
        remote.send(Event::message("C1", "U2", "from someone else")).unwrap();
        remote.close();

        let bot = Arc::new(bot);
        bot.clone().run().await.unwrap();

        assert_eq!(texts(remote.drain()), vec!["from someone else"]);
        assert_eq!(bot.user_id(), "UBOT");
        assert_eq!(bot.user_name(), "harkbot");
        assert!(bot.identity().is_known());
    }

    #[tokio::test]
    async fn test_messages_before_connect_are_not_suppressed() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        bot.hear(".*").unwrap().message_handler(echo);

        remote.send(Event::message("C1", "", "anonymous")).unwrap();
        remote.close();
        Arc::new(bot).run().await.unwrap();

        assert_eq!(texts(remote.drain()), vec!["anonymous"]);
    }

    #[tokio::test]
    async fn test_invalid_auth_stops_loop_and_drops_buffered_events() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        bot.hear(".*").unwrap().message_handler(echo);

        remote.send(Event::message("C1", "U2", "before")).unwrap();
        remote.send(Event::InvalidAuth).unwrap();
        remote.send(Event::message("C1", "U2", "after")).unwrap();

        let result = Arc::new(bot).run().await;

        assert!(matches!(result, Err(RuntimeError::InvalidAuth)));
        assert_eq!(texts(remote.drain()), vec!["before"]);
    }

    #[tokio::test]
    async fn test_transport_errors_and_other_events_are_not_fatal() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        bot.hear(".*").unwrap().message_handler(echo);

        remote
            .send(ErrorEvent::new("rate_limited", "slow down"))
            .unwrap();
        remote
            .send(Event::Other(OtherEvent {
                name: "presence_change".into(),
                raw: Value::Null,
            }))
            .unwrap();
        remote.send(Event::message("C1", "U2", "still here")).unwrap();
        remote.close();

        Arc::new(bot).run().await.unwrap();
        assert_eq!(texts(remote.drain()), vec!["still here"]);
    }

    #[tokio::test]
    async fn test_handler_sees_bot_message_and_captures() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        bot.hear(r"(?i)^add (?P<a>\d+) (\d+)$").unwrap().message_handler(
            |ctx: Context, msg: Arc<MessageEvent>, caps: Arc<Captures>| async move {
                let a: u32 = caps.name("a").unwrap().parse().unwrap();
                let b: u32 = caps.get(2).unwrap().parse().unwrap();
                let bot = ctx.bot().unwrap();
                bot.reply(&msg, &(a + b).to_string(), Typing::Without)
                    .await
                    .unwrap();
            },
        );

        remote.send(Event::message("C1", "U2", "ADD 2 40")).unwrap();
        remote.close();
        Arc::new(bot).run().await.unwrap();

        assert_eq!(
            remote.drain(),
            vec![Outbound::Message {
                channel: "C1".into(),
                text: "42".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_routes_for_other_kinds_never_see_messages() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        bot.add_route(".*", EventKind::Connected, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
        .unwrap()
        .name("connected-only");
        assert_eq!(
            bot.router().routes().next().and_then(|r| r.name()),
            Some("connected-only")
        );

        remote.send(Event::message("C1", "U2", "hello")).unwrap();
        remote.close();
        Arc::new(bot).run().await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(remote.drain().is_empty());
    }

    #[tokio::test]
    async fn test_handler_panic_is_isolated() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        bot.hear("^boom$")
            .unwrap()
            .message_handler(explode);
        bot.hear(".*").unwrap().message_handler(echo);

        remote.send(Event::message("C1", "U2", "boom")).unwrap();
        remote.send(Event::message("C1", "U2", "after")).unwrap();
        remote.close();

        Arc::new(bot).run().await.unwrap();
        assert_eq!(texts(remote.drain()), vec!["after"]);
    }

    #[tokio::test]
    async fn test_panic_before_future_is_isolated() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        bot.hear("^boom$").unwrap().message_handler(|| {
            if true {
                panic!("exploded while building the future");
            }
            async {}
        });
        bot.hear(".*").unwrap().message_handler(echo);

        remote.send(Event::message("C1", "U2", "boom")).unwrap();
        remote.send(Event::message("C1", "U2", "after")).unwrap();
        remote.close();

        let run = AssertUnwindSafe(Arc::new(bot).run()).catch_unwind().await;
        assert!(matches!(run, Ok(Ok(()))));
        assert_eq!(texts(remote.drain()), vec!["after"]);
    }

    #[tokio::test]
    async fn test_reissued_connected_replaces_identity() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        bot.hear(".*").unwrap().message_handler(echo);

        remote.send(Event::connected("U1", "bot1")).unwrap();
        remote.send(Event::connected("U2", "bot2")).unwrap();
        remote.send(Event::message("C1", "U1", "old identity")).unwrap();
        remote.send(Event::message("C1", "bot2", "new identity")).unwrap();
        remote.send(Event::message("C1", "U2", "new id")).unwrap();
        remote.close();

        let bot = Arc::new(bot);
        bot.clone().run().await.unwrap();

        assert_eq!(texts(remote.drain()), vec!["old identity"]);
        assert_eq!(bot.user_id(), "U2");
        assert_eq!(bot.user_name(), "bot2");
    }

    #[tokio::test]
    #[should_panic(expected = "handler exploded")]
    async fn test_handler_panic_propagates_when_not_isolated() {
        let mut config = HarkConfig::default();
        config.bot.isolate_panics = false;
        let (mut bot, _conn, mut remote) = setup(&config);
        bot.hear("boom")
            .unwrap()
            .message_handler(explode);

        remote.send(Event::message("C1", "U2", "boom")).unwrap();
        remote.close();
        let _ = Arc::new(bot).run().await;
    }

    #[tokio::test]
    async fn test_send_errors_swallowed_by_default() {
        let (bot, conn, _remote) = setup(&HarkConfig::default());
        conn.fail_sends(ApiError::platform("channel_not_found", "no such channel"));
        let msg = MessageEvent::new("C404", "U2", "hi");

        assert!(bot.reply(&msg, "hello", Typing::Without).await.is_ok());
        assert!(bot.reply_post(&msg, "hello", Typing::Without).await.is_ok());
        assert!(
            bot.reply_with_attachments(&msg, vec![Attachment::new()], Typing::Without)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_send_errors_surfaced_when_configured() {
        let mut config = HarkConfig::default();
        config.bot.send_errors = SendErrors::Surface;
        let (bot, conn, _remote) = setup(&config);
        conn.fail_sends(ApiError::Closed);
        let msg = MessageEvent::new("C1", "U2", "hi");

        let result = bot.reply(&msg, "hello", Typing::Without).await;
        assert!(matches!(result, Err(RuntimeError::Send(ApiError::Closed))));

        conn.clear_failure();
        assert!(bot.reply(&msg, "hello", Typing::Without).await.is_ok());
    }

    #[tokio::test]
    async fn test_reply_post_params() {
        let (mut bot, _conn, mut remote) = setup(&HarkConfig::default());
        bot.hear("post")
            .unwrap()
            .message_handler(|bot: Arc<Bot>, msg: Arc<MessageEvent>| async move {
                bot.reply_post(&msg, "posted", Typing::Without).await.unwrap();
                bot.reply_with_attachments(
                    &msg,
                    vec![Attachment::new().title("t")],
                    Typing::Without,
                )
                .await
                .unwrap();
            });

        remote.send(Event::connected("UBOT", "harkbot")).unwrap();
        remote.send(Event::message("C1", "U2", "please post")).unwrap();
        remote.close();
        Arc::new(bot).run().await.unwrap();

        let outbound = remote.drain();
        assert_eq!(outbound.len(), 2);
        assert_eq!(
            outbound[0],
            Outbound::Post {
                channel: "C1".into(),
                content: PostContent::Text("posted".into()),
                params: PostParams {
                    as_user: true,
                    username: "UBOT".into(),
                    link_names: true,
                    unfurl_links: true,
                    unfurl_media: true,
                },
            }
        );
        let Outbound::Post { content, params, .. } = &outbound[1] else {
            panic!("expected a post, got {:?}", outbound[1]);
        };
        assert!(matches!(content, PostContent::Attachments(a) if a.len() == 1));
        assert!(params.as_user && params.link_names);
        assert!(!params.unfurl_links && !params.unfurl_media);
        assert_eq!(params.username, "UBOT");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_with_typing_waits_estimated_delay() {
        let (bot, _conn, mut remote) = setup(&HarkConfig::default());
        let msg = MessageEvent::new("C1", "U2", "hi");
        let text = "x".repeat(50);

        let start = Instant::now();
        bot.reply(&msg, &text, Typing::With).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(1000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1100), "{elapsed:?}");
        assert_eq!(
            remote.drain(),
            vec![
                Outbound::Typing {
                    channel: "C1".into()
                },
                Outbound::Message {
                    channel: "C1".into(),
                    text,
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_reply_typing_is_capped() {
        let (bot, _conn, _remote) = setup(&HarkConfig::default());
        let msg = MessageEvent::new("C1", "U2", "hi");

        let start = Instant::now();
        bot.reply_post(&msg, &"y".repeat(10_000), true).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(2000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(2100), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_attachment_delay_modes() {
        let attachments = vec![Attachment::new().title("report").text("all good")];
        let msg = MessageEvent::new("C1", "U2", "status");

        let mut config = HarkConfig::default();
        config.typing.attachment_delay = AttachmentDelay::Placeholder;
        let (bot, _conn, _remote) = setup(&config);
        let start = Instant::now();
        bot.reply_with_attachments(&msg, attachments.clone(), Typing::With)
            .await
            .unwrap();
        let placeholder = start.elapsed();

        let (bot, _conn, _remote) = setup(&HarkConfig::default());
        let start = Instant::now();
        bot.reply_with_attachments(&msg, attachments, Typing::With)
            .await
            .unwrap();
        let measured = start.elapsed();

        // "attachment" is ten characters: 60s * 10 / 3000.
        assert!(placeholder >= Duration::from_millis(200), "{placeholder:?}");
        assert!(placeholder < Duration::from_millis(300), "{placeholder:?}");
        assert!(measured > placeholder);
    }

    #[tokio::test]
    async fn test_typing_failure_is_surfaced_before_send() {
        let mut config = HarkConfig::default();
        config.bot.send_errors = SendErrors::Surface;
        let (bot, conn, mut remote) = setup(&config);
        conn.fail_sends(ApiError::NotConnected);
        let msg = MessageEvent::new("C1", "U2", "hi");

        let result = bot.type_indicator(&msg, "typing...").await;
        assert!(matches!(result, Err(RuntimeError::Send(ApiError::NotConnected))));
        assert!(remote.drain().is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let (connection, _remote) = memory_connection();
        let mut bot = Bot::new(Arc::new(connection));
        assert!(matches!(
            bot.hear("(unclosed"),
            Err(RuntimeError::Framework(_))
        ));
        assert!(bot.router().is_empty());
    }
}

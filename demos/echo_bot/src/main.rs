//! Echo Bot Demo
//!
//! Drives a Hark bot from the terminal. Every line typed on stdin arrives as a
//! message from the `console` user; everything the bot sends is printed.
//!
//! # Routes
//!
//! Routes are checked in registration order and the first match wins:
//!
//! ```text
//! (?i)^/ping$            → "pong", with typing
//! (?i)^/echo (.+)$       → echoes the captured text
//! (?i)^/status$          → attachment post
//! (?i)^/whoami$          → API post naming the bot
//! (?i)\b(hi|hello)\b     → greeting
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot -- --name harkbot
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use hark::core::{EventInjector, MemoryRemote, Outbound, PostContent, memory_connection};
use hark::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

const CONSOLE_CHANNEL: &str = "console";
const CONSOLE_USER: &str = "console";

#[derive(Debug, Parser)]
#[command(about = "Console-driven Hark echo bot")]
struct Args {
    /// Bot user id reported on connect.
    #[arg(long, default_value = "UHARK")]
    user_id: String,

    /// Bot user name reported on connect.
    #[arg(long, default_value = "hark")]
    name: String,

    /// Configuration file (defaults to searching for hark.toml).
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn ping(bot: Arc<Bot>, msg: Arc<MessageEvent>) {
    if let Err(e) = bot.reply(&msg, "pong", Typing::With).await {
        error!(error = %e, "Failed to answer ping");
    }
}

async fn echo(bot: Arc<Bot>, msg: Arc<MessageEvent>, caps: Arc<Captures>) {
    let text = caps.get(1).unwrap_or_default();
    if let Err(e) = bot.reply(&msg, text, Typing::Without).await {
        error!(error = %e, "Failed to echo");
    }
}

async fn status(bot: Arc<Bot>, msg: Arc<MessageEvent>) {
    let attachment = Attachment::new()
        .fallback("Bot status")
        .color("#36a64f")
        .title("Status")
        .field(AttachmentField::new("User", bot.user_name(), true))
        .field(AttachmentField::new(
            "Routes",
            bot.router().len().to_string(),
            true,
        ));

    if let Err(e) = bot
        .reply_with_attachments(&msg, vec![attachment], Typing::With)
        .await
    {
        error!(error = %e, "Failed to post status");
    }
}

async fn whoami(bot: Arc<Bot>, msg: Arc<MessageEvent>) {
    let text = format!("I am {} ({})", bot.user_name(), bot.user_id());
    if let Err(e) = bot.reply_post(&msg, &text, Typing::Without).await {
        error!(error = %e, "Failed to post identity");
    }
}

async fn greet(bot: Arc<Bot>, msg: Arc<MessageEvent>) {
    let text = format!("hello, {}!", msg.user);
    if let Err(e) = bot.reply(&msg, &text, Typing::With).await {
        error!(error = %e, "Failed to greet");
    }
}

// ============================================================================
// Console plumbing
// ============================================================================

/// Prints everything the bot sends until the connection goes away.
async fn print_outbound(mut remote: MemoryRemote) {
    while let Some(item) = remote.recv().await {
        match item {
            Outbound::Typing { channel } => println!("[{channel}] … typing"),
            Outbound::Message { channel, text } => println!("[{channel}] {text}"),
            Outbound::Post {
                channel, content, ..
            } => match content {
                PostContent::Text(text) => println!("[{channel}] (post) {text}"),
                PostContent::Attachments(attachments) => {
                    for attachment in attachments {
                        println!("[{channel}] (attachment) {}", attachment.title);
                        for field in attachment.fields {
                            println!("    {}: {}", field.title, field.value);
                        }
                    }
                }
            },
        }
    }
}

/// Feeds stdin lines to the bot as console messages.
///
/// Returning drops the injector, which ends the bot's event stream.
async fn read_console(injector: EventInjector) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        injector.send(Event::message(CONSOLE_CHANNEL, CONSOLE_USER, line))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = HarkRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    let runtime = builder.build()?;

    let (connection, mut remote) = memory_connection();
    let mut bot = runtime.bot(Arc::new(connection));

    bot.hear("(?i)^/ping$")?.name("ping").message_handler(ping);
    bot.hear("(?i)^/echo (.+)$")?.name("echo").message_handler(echo);
    bot.hear("(?i)^/status$")?.name("status").message_handler(status);
    bot.hear("(?i)^/whoami$")?.name("whoami").message_handler(whoami);
    bot.hear(r"(?i)\b(hi|hello)\b")?
        .name("greet")
        .message_handler(greet);

    remote.send(Event::connected(&args.user_id, &args.name))?;
    info!(routes = bot.router().len(), "Type a message, Ctrl+D to quit");

    let injector = remote
        .injector()
        .ok_or_else(|| anyhow::anyhow!("memory remote closed before start"))?;
    remote.close();

    let printer = tokio::spawn(print_outbound(remote));
    let console = tokio::spawn(async move {
        if let Err(e) = read_console(injector).await {
            error!(error = %e, "Console input failed");
        }
    });

    let result = runtime.run(bot).await;
    console.abort();
    // Ends once the bot, and with it the connection, has been dropped.
    printer.await?;

    result?;
    Ok(())
}

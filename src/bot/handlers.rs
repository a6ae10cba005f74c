//! Update handlers and dispatcher tree.
//!
//! Every update is turned into a [`NavEvent`] and handed to the shared
//! [`NavigationController`]. Handler errors are logged and swallowed so the
//! dispatcher keeps polling.

use crate::bot::transport::TelegramTransport;
use crate::navigation::{NavEvent, NavigationController};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::utils::command::BotCommands;
use tracing::{error, warn};

/// Bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    /// Open the section menu
    #[command(description = "open the section menu")]
    Start,
    /// Show usage help
    #[command(description = "explain how to use the guide")]
    Help,
}

impl Command {
    /// Navigation event this command stands for.
    #[must_use]
    pub fn event(&self) -> NavEvent {
        match self {
            Self::Start => NavEvent::Start,
            Self::Help => NavEvent::from_text("/help"),
        }
    }
}

/// Build the dispatcher tree.
#[must_use]
pub fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(dptree::endpoint(handle_message)),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    controller: Arc<NavigationController>,
) -> Result<(), teloxide::RequestError> {
    let transport = TelegramTransport::for_message(bot, &msg);
    if let Err(e) = controller.dispatch(&transport, msg.chat.id.0, cmd.event()).await {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    controller: Arc<NavigationController>,
) -> Result<(), teloxide::RequestError> {
    let event = NavEvent::from_text(msg.text().unwrap_or_default());
    let transport = TelegramTransport::for_message(bot, &msg);
    if let Err(e) = controller.dispatch(&transport, msg.chat.id.0, event).await {
        error!("Message handler error: {}", e);
    }
    respond(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    controller: Arc<NavigationController>,
) -> Result<(), teloxide::RequestError> {
    let event = NavEvent::from_callback_data(q.data.as_deref().unwrap_or_default());
    let query_id = q.id.clone();

    let Some(transport) = TelegramTransport::for_callback(bot.clone(), q) else {
        // Nothing to reply into; just stop the client spinner.
        warn!("Callback without an accessible message, ignoring");
        if let Err(e) = bot.answer_callback_query(query_id).await {
            warn!("Failed to answer callback: {}", e);
        }
        return respond(());
    };

    let conversation = transport.chat_id().0;
    if let Err(e) = controller.dispatch(&transport, conversation, event).await {
        error!("Callback handler error: {}", e);
    }
    respond(())
}

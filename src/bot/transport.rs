use crate::bot::resilient::{delete_message_resilient, send_message_resilient};
use crate::navigation::{Chunk, NavigationTransport};
use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId};

/// What an inbound event arrived as
pub enum Origin {
    /// A command or plain message
    Message,
    /// An inline button press
    Callback(Box<CallbackQuery>),
}

/// Telegram transport bound to one inbound event.
pub struct TelegramTransport {
    bot: Bot,
    chat_id: ChatId,
    origin: Origin,
}

impl TelegramTransport {
    /// Transport answering a message.
    #[must_use]
    pub fn for_message(bot: Bot, msg: &Message) -> Self {
        Self {
            bot,
            chat_id: msg.chat.id,
            origin: Origin::Message,
        }
    }

    /// Transport answering a button press.
    ///
    /// `None` when the message holding the button is no longer known.
    #[must_use]
    pub fn for_callback(bot: Bot, q: CallbackQuery) -> Option<Self> {
        let chat_id = q.message.as_ref().map(|msg| msg.chat().id)?;
        Some(Self {
            bot,
            chat_id,
            origin: Origin::Callback(Box::new(q)),
        })
    }

    /// Chat the replies go to
    #[must_use]
    pub const fn chat_id(&self) -> ChatId {
        self.chat_id
    }
}

#[async_trait]
impl NavigationTransport for TelegramTransport {
    async fn send_chunk(&self, chunk: &Chunk) -> Result<()> {
        send_message_resilient(&self.bot, self.chat_id, chunk.text.clone(), chunk.keyboard.clone())
            .await
            .map(|_| ())
    }

    async fn remove_ui(&self) -> Result<()> {
        // Only bot messages with buttons count as UI.
        let Origin::Callback(q) = &self.origin else {
            return Ok(());
        };
        match q.message.as_ref() {
            Some(msg) => delete_message_resilient(&self.bot, self.chat_id, msg.id()).await,
            None => Ok(()),
        }
    }

    async fn acknowledge(&self, alert: Option<String>) -> Result<()> {
        // Messages carry no acknowledgement on Telegram.
        let Origin::Callback(q) = &self.origin else {
            return Ok(());
        };
        let mut req = self.bot.answer_callback_query(q.id.clone());
        if let Some(text) = alert {
            req = req.text(text);
        }
        req.await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("Telegram callback answer error: {e}"))
    }
}

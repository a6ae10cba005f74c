//! Telegram API calls with automatic retry.
//!
//! Wraps the requests the guide makes so that transient network failures are
//! retried with exponential backoff and jitter.

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, Message, MessageId};
use tracing::debug;

const ERROR_DELETE_NOT_FOUND: &str = "message to delete not found";
const ERROR_CANT_DELETE: &str = "message can't be deleted";

/// Send a plain-text message, optionally with an inline keyboard.
///
/// Uses [`crate::utils::retry_telegram_operation`] with exponential backoff.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<Message> {
    let text = text.into();
    crate::utils::retry_telegram_operation(|| async {
        let mut req = bot.send_message(chat_id, text.clone());
        if let Some(markup) = keyboard.clone() {
            req = req.reply_markup(markup);
        }
        req.await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
    })
    .await
}

/// Delete a message with retry.
///
/// A message that is already gone, or too old to delete, counts as deleted.
///
/// # Errors
///
/// Returns an error for any other failure once retries are exhausted.
pub async fn delete_message_resilient(bot: &Bot, chat_id: ChatId, msg_id: MessageId) -> Result<()> {
    crate::utils::retry_telegram_operation(|| async {
        match bot.delete_message(chat_id, msg_id).await {
            Ok(_) => Ok(()),
            // Permanent, so answered here instead of being retried.
            Err(e) if is_ignorable_delete_error(&e.to_string()) => {
                debug!("Message deletion skipped: {e}");
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!("Telegram delete error: {e}")),
        }
    })
    .await
}

fn is_ignorable_delete_error(message: &str) -> bool {
    message.contains(ERROR_DELETE_NOT_FOUND) || message.contains(ERROR_CANT_DELETE)
}

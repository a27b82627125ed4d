//! Telegram update handlers.
//!
//! Each handler is a small adapter that maps the teloxide update into a
//! messenger-agnostic [`IncomingUpdate`], serializes per chat, and hands it
//! to the core [`cutbot_core::bot::LinkBot`].

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};
use tracing::{debug, error};

use cutbot_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::{self as port_types, Command, IncomingUpdate, TextMessage},
};

use crate::router::AppState;

/// Text to update: commands start with `/`, everything else is free text.
pub fn update_from_text(
    chat_id: i64,
    user_id: i64,
    first_name: &str,
    text: &str,
) -> IncomingUpdate {
    let chat_id = ChatId(chat_id);
    let user_id = UserId(user_id);
    match Command::parse(chat_id, user_id, first_name, text) {
        Some(cmd) => IncomingUpdate::Command(cmd),
        None => IncomingUpdate::Text(TextMessage {
            chat_id,
            user_id,
            first_name: first_name.to_string(),
            text: text.to_string(),
        }),
    }
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        debug!(chat = msg.chat.id.0, "ignoring non-text message");
        return Ok(());
    };

    let chat_id = msg.chat.id.0;
    let update = update_from_text(chat_id, user.id.0 as i64, &user.first_name, text);

    // Sequentialize per chat.
    let _guard = state.chat_locks.lock_chat(chat_id).await;
    if let Err(e) = state.bot.handle(update).await {
        error!(chat = chat_id, error = %e, "failed to handle message");
    }
    Ok(())
}

/// Callbacks from inline-mode messages carry no message; they are keyed to
/// the user's private chat so they still get answered.
pub fn update_from_callback(
    user_id: i64,
    callback_id: &str,
    data: Option<&str>,
    message: Option<MessageRef>,
) -> port_types::CallbackQuery {
    port_types::CallbackQuery {
        chat_id: message.map(|m| m.chat_id).unwrap_or(ChatId(user_id)),
        user_id: UserId(user_id),
        callback_id: callback_id.to_string(),
        data: data.unwrap_or_default().to_string(),
        message,
    }
}

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let message = q.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
    });
    let query = update_from_callback(q.from.id.0 as i64, &q.id, q.data.as_deref(), message);
    let chat_id = query.chat_id.0;
    let update = IncomingUpdate::Callback(query);

    let _guard = state.chat_locks.lock_chat(chat_id).await;
    if let Err(e) = state.bot.handle(update).await {
        error!(chat = chat_id, error = %e, "failed to handle callback");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_text_becomes_command() {
        let IncomingUpdate::Command(c) = update_from_text(1, 2, "Ann", "/qr https://a.com") else {
            panic!("expected command");
        };
        assert_eq!(c.name, "qr");
        assert_eq!(c.args, "https://a.com");
        assert_eq!(c.user_id, UserId(2));
        assert_eq!(c.chat_id, ChatId(1));
    }

    #[test]
    fn callback_without_message_falls_back_to_user_chat() {
        let q = update_from_callback(7, "cb", None, None);
        assert_eq!(q.chat_id, ChatId(7));
        assert_eq!(q.callback_id, "cb");
        assert!(q.data.is_empty());
        assert!(q.message.is_none());
    }

    #[test]
    fn callback_with_message_uses_its_chat() {
        let msg = MessageRef {
            chat_id: ChatId(-100),
            message_id: MessageId(5),
        };
        let q = update_from_callback(7, "cb", Some(r#"{"copy":"x"}"#), Some(msg));
        assert_eq!(q.chat_id, ChatId(-100));
        assert_eq!(q.message, Some(msg));
        assert_eq!(q.data, r#"{"copy":"x"}"#);
    }

    #[test]
    fn other_text_is_passed_through() {
        let IncomingUpdate::Text(t) = update_from_text(1, 2, "Ann", " https://a.com ") else {
            panic!("expected text");
        };
        assert_eq!(t.text, " https://a.com ");
        assert_eq!(t.first_name, "Ann");
    }
}

use crate::{
    actions::ButtonAction,
    domain::{ChatId, MessageRef, UserId},
};

/// Cross-messenger incoming update model.
///
/// Telegram-specific fields should live in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Callback(CallbackQuery),
}

#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub first_name: String,
    /// Lowercased, without the leading `/` or `@botname` suffix.
    pub name: String,
    pub args: String,
}

impl Command {
    /// Parse `/cmd@botname arg1 ...`. Returns `None` for non-command text.
    pub fn parse(chat_id: ChatId, user_id: UserId, first_name: &str, text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let mut parts = text.splitn(2, char::is_whitespace);
        let first = parts.next().unwrap_or("").trim();
        let args = parts.next().unwrap_or("").trim().to_string();

        let name = first
            .trim_start_matches('/')
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();

        Some(Self {
            chat_id,
            user_id,
            first_name: first_name.to_string(),
            name,
            args,
        })
    }

    /// Whitespace-separated arguments.
    pub fn arg_list(&self) -> Vec<&str> {
        self.args.split_whitespace().collect()
    }
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub first_name: String,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub callback_id: String,
    pub data: String,
    pub message: Option<MessageRef>,
}

/// Inline keyboard, one button per row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub target: ButtonTarget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonTarget {
    /// Callback data delivered back to the bot.
    Callback(String),
    /// Opens a link client-side.
    Url(String),
}

impl InlineKeyboard {
    /// Adds a callback button for `action`; skipped if the payload is too large.
    pub fn action(mut self, label: &str, action: &ButtonAction) -> Self {
        if let Some(data) = action.encode() {
            self.buttons.push(InlineButton {
                label: label.to_string(),
                target: ButtonTarget::Callback(data),
            });
        }
        self
    }

    pub fn link(mut self, label: &str, url: &str) -> Self {
        self.buttons.push(InlineButton {
            label: label.to_string(),
            target: ButtonTarget::Url(url.to_string()),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}

/// What a messenger implementation can render.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    /// Without keyboards, replies go out as plain HTML.
    pub supports_inline_keyboards: bool,
    /// Hard per-message limit in bytes; replies are chunked below it.
    pub max_message_len: usize,
}

//! Inline button payloads.
//!
//! Encoded as compact externally-tagged JSON, e.g. `{"copy":"https://cutt.ly/x"}`.

use serde::{Deserialize, Serialize};

/// Telegram rejects callback data longer than this (bytes).
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Copy(String),
    ShowQr(String),
}

impl ButtonAction {
    /// `None` when the payload does not fit into a callback button.
    pub fn encode(&self) -> Option<String> {
        let data = serde_json::to_string(self).ok()?;
        (data.len() <= MAX_CALLBACK_DATA_LEN).then_some(data)
    }

    pub fn decode(data: &str) -> Option<Self> {
        serde_json::from_str(data).ok()
    }

    pub fn url(&self) -> &str {
        match self {
            ButtonAction::Copy(u) | ButtonAction::ShowQr(u) => u,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_compactly() {
        let a = ButtonAction::ShowQr("https://cutt.ly/abc".to_string());
        assert_eq!(a.encode().as_deref(), Some(r#"{"show_qr":"https://cutt.ly/abc"}"#));
    }

    #[test]
    fn decode_accepts_own_encoding() {
        let a = ButtonAction::Copy("https://cutt.ly/my-custom-alias-of-thirty-chars".to_string());
        let data = a.encode().expect("fits");
        assert_eq!(ButtonAction::decode(&data), Some(a));
    }

    #[test]
    fn oversized_payload_is_not_encoded() {
        let a = ButtonAction::Copy(format!("https://cutt.ly/{}", "x".repeat(60)));
        assert_eq!(a.encode(), None);
    }

    #[test]
    fn foreign_data_is_ignored() {
        assert_eq!(ButtonAction::decode("copy_https://cutt.ly/x"), None);
        assert_eq!(ButtonAction::decode(r#"{"delete":"x"}"#), None);
        assert_eq!(ButtonAction::decode(""), None);
    }
}

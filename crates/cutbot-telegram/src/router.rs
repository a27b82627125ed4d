use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use teloxide::{
    dispatching::Dispatcher,
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    update_listeners::{webhooks, Polling},
};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use cutbot_core::{
    bot::LinkBot,
    config::{Config, TransportMode},
    messaging::port::MessagingPort,
    shortener::Shortener,
    usage::UsageTracker,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<LinkBot>,
    pub chat_locks: Arc<ChatLocks>,
}

#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Public webhook endpoint: `<external_url>/<token>`.
pub fn webhook_url(external_url: &str, token: &str) -> anyhow::Result<url::Url> {
    let base = external_url.trim_end_matches('/');
    Ok(url::Url::parse(&format!("{base}/{token}"))?)
}

pub async fn run(
    cfg: Arc<Config>,
    shortener: Arc<dyn Shortener>,
    usage: Arc<UsageTracker>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        info!(username = %me.username(), "bot started");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState {
        bot: Arc::new(LinkBot::new(cfg.clone(), shortener, usage, messenger)),
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build();

    match &cfg.transport {
        TransportMode::Polling => {
            info!("running in polling mode");
            let listener = Polling::builder(bot).drop_pending_updates().build();
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("polling listener error"),
                )
                .await;
        }
        TransportMode::Webhook { port, external_url } => {
            let url = webhook_url(external_url, &cfg.telegram_bot_token)?;
            let addr = SocketAddr::from(([0, 0, 0, 0], *port));
            info!(%addr, external_url = %external_url, "running in webhook mode");

            let listener = webhooks::axum(
                bot,
                webhooks::Options::new(addr, url).drop_pending_updates(),
            )
            .await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("webhook listener error"),
                )
                .await;
        }
    }

    info!("bot stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[test]
    fn webhook_url_appends_token_path() {
        let u = webhook_url("https://cutbot.onrender.com/", "123:abc").unwrap();
        assert_eq!(u.as_str(), "https://cutbot.onrender.com/123:abc");
        assert_eq!(u.path(), "/123:abc");
    }

    #[test]
    fn webhook_url_rejects_garbage() {
        assert!(webhook_url("not a base", "t").is_err());
    }

    #[tokio::test]
    async fn chat_locks_serialize_same_chat() {
        let locks = ChatLocks::default();
        let g1 = locks.lock_chat(1).await;

        // A different chat is not blocked.
        let other = timeout(Duration::from_millis(50), locks.lock_chat(2)).await;
        assert!(other.is_ok());

        // The same chat waits until the first guard is dropped.
        let same = timeout(Duration::from_millis(50), locks.lock_chat(1)).await;
        assert!(same.is_err());

        drop(g1);
        let again = timeout(Duration::from_millis(50), locks.lock_chat(1)).await;
        assert!(again.is_ok());
    }
}

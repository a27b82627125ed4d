//! Command router: turns incoming chat updates into validation, shortening
//! calls and replies.
//!
//! Messenger-agnostic. Every reply goes through [`MessagingPort`], every
//! shortening call through [`Shortener`].

use std::{collections::HashSet, sync::Arc};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    actions::ButtonAction,
    bulk::{process_bulk, split_lines, BulkOutcome},
    config::Config,
    domain::{ChatId, MessageRef, UserId},
    formatting::split_message,
    links::{qr_code_link, stats_link},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate, InlineKeyboard, TextMessage},
    },
    replies,
    shortener::{ShortenRequest, ShortenResult, Shortener},
    usage::UsageTracker,
    validation::{is_valid_alias, is_valid_url},
    Result,
};

pub struct LinkBot {
    cfg: Arc<Config>,
    shortener: Arc<dyn Shortener>,
    usage: Arc<UsageTracker>,
    messenger: Arc<dyn MessagingPort>,
    awaiting_bulk: Mutex<HashSet<UserId>>,
}

impl LinkBot {
    pub fn new(
        cfg: Arc<Config>,
        shortener: Arc<dyn Shortener>,
        usage: Arc<UsageTracker>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            cfg,
            shortener,
            usage,
            messenger,
            awaiting_bulk: Mutex::new(HashSet::new()),
        }
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    pub async fn is_awaiting_bulk(&self, user_id: UserId) -> bool {
        self.awaiting_bulk.lock().await.contains(&user_id)
    }

    pub async fn handle(&self, update: IncomingUpdate) -> Result<()> {
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Text(msg) => self.handle_text(msg).await,
            IncomingUpdate::Callback(q) => self.handle_callback(q).await,
        }
    }

    async fn handle_command(&self, cmd: Command) -> Result<()> {
        debug!(user = cmd.user_id.0, command = %cmd.name, "command received");
        let chat_id = cmd.chat_id;

        match cmd.name.as_str() {
            "start" => {
                self.send(chat_id, &replies::welcome(&cmd.first_name, self.cfg.bulk_max_urls))
                    .await
            }

            "help" => self.send(chat_id, &replies::help(self.cfg.bulk_max_urls)).await,

            "stats" => {
                let stats = self.usage.get_usage(cmd.user_id).await;
                self.send(chat_id, &replies::stats(&cmd.first_name, stats.as_ref()))
                    .await
            }

            "custom" => {
                let args = cmd.arg_list();
                match args.as_slice() {
                    [] => self.send(chat_id, &replies::custom_usage()).await,
                    [_] => self.send(chat_id, &replies::custom_missing_arg()).await,
                    [alias, url, ..] => {
                        if !is_valid_alias(alias) {
                            return self.send(chat_id, &replies::invalid_alias()).await;
                        }
                        if !is_valid_url(url) {
                            return self.send(chat_id, &replies::invalid_url(false)).await;
                        }
                        self.shorten_and_reply(chat_id, cmd.user_id, url, Some(*alias))
                            .await
                    }
                }
            }

            "qr" => {
                let url = cmd.arg_list().join(" ");
                if url.is_empty() {
                    return self.send(chat_id, &replies::qr_usage()).await;
                }
                if !is_valid_url(&url) {
                    return self.send(chat_id, &replies::invalid_url(false)).await;
                }
                let qr = qr_code_link(&self.cfg.qr_api_url, &url);
                let text = replies::qr_generated(&url, &qr);
                if !self.messenger.capabilities().supports_inline_keyboards {
                    return self.send(chat_id, &text).await;
                }
                self.messenger
                    .send_inline_keyboard(chat_id, &text, replies::qr_keyboard(&url, &qr))
                    .await?;
                Ok(())
            }

            "bulk" => {
                self.awaiting_bulk.lock().await.insert(cmd.user_id);
                self.send(chat_id, &replies::bulk_instructions(self.cfg.bulk_max_urls))
                    .await
            }

            _ => self.send(chat_id, &replies::unknown_command()).await,
        }
    }

    async fn handle_text(&self, msg: TextMessage) -> Result<()> {
        let text = msg.text.trim();

        let bulk = self.awaiting_bulk.lock().await.remove(&msg.user_id);
        if bulk {
            return self.run_bulk(msg.chat_id, msg.user_id, text).await;
        }

        if !is_valid_url(text) {
            return self.send(msg.chat_id, &replies::invalid_url(true)).await;
        }

        self.shorten_and_reply(msg.chat_id, msg.user_id, text, None)
            .await
    }

    async fn handle_callback(&self, q: CallbackQuery) -> Result<()> {
        // Always answer so the client stops its spinner.
        self.messenger
            .answer_callback_query(&q.callback_id, None)
            .await?;

        let Some(action) = ButtonAction::decode(&q.data) else {
            debug!(data = %q.data, "ignoring unknown callback data");
            return Ok(());
        };
        let Some(target) = q.message else {
            return Ok(());
        };

        let text = match &action {
            ButtonAction::Copy(url) => replies::copied(url),
            ButtonAction::ShowQr(url) => {
                replies::qr_from_button(url, &qr_code_link(&self.cfg.qr_api_url, url))
            }
        };
        self.messenger.edit_html(target, &text).await
    }

    async fn shorten_and_reply(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        url: &str,
        alias: Option<&str>,
    ) -> Result<()> {
        let req = ShortenRequest::new(url, alias.map(str::to_string))?;
        let progress = self
            .messenger
            .send_html(chat_id, &replies::shortening_progress(alias))
            .await?;

        let result = self.shortener.shorten(&req).await;
        match &result {
            ShortenResult::Success {
                short_url,
                already_existed,
            } => {
                self.usage.record_usage(user_id, 1).await;
                info!(user = user_id.0, short_url = %short_url, "url shortened");

                let stats_url = stats_link(&self.cfg.cuttly_stats_base, short_url, alias);
                let text = replies::shortened(&replies::Shortened {
                    original: url,
                    short_url,
                    already_existed: *already_existed,
                    alias,
                    stats_url: &stats_url,
                });
                // The QR action is offered for auto-generated links only.
                let keyboard = replies::shortened_keyboard(short_url, &stats_url, alias.is_none());
                self.replace_progress(progress, &text, keyboard).await
            }
            ShortenResult::Failure { reason, code, kind } => {
                warn!(user = user_id.0, ?kind, ?code, reason = %reason, "shortening failed");
                let msg = result
                    .user_message()
                    .unwrap_or_else(|| "Unknown error".to_string());
                self.replace_progress(
                    progress,
                    &replies::shorten_failed(&msg),
                    InlineKeyboard::default(),
                )
                .await
            }
        }
    }

    async fn run_bulk(&self, chat_id: ChatId, user_id: UserId, raw: &str) -> Result<()> {
        let max = self.cfg.bulk_max_urls;
        let lines = split_lines(raw);

        if lines.len() > max {
            return self.send(chat_id, &replies::bulk_too_many(max)).await;
        }
        let valid = lines.iter().filter(|l| is_valid_url(l)).count();
        if valid == 0 {
            return self.send(chat_id, &replies::bulk_no_valid()).await;
        }

        let progress = self
            .messenger
            .send_html(chat_id, &replies::bulk_progress(valid))
            .await?;

        let report = match process_bulk(self.shortener.as_ref(), raw, max).await {
            BulkOutcome::Report(r) => r,
            BulkOutcome::TooMany { max, .. } => {
                return self
                    .messenger
                    .edit_html(progress, &replies::bulk_too_many(max))
                    .await;
            }
        };

        let succeeded = report.succeeded.len() as u64;
        if succeeded > 0 {
            self.usage.record_usage(user_id, succeeded).await;
        }
        info!(
            user = user_id.0,
            succeeded,
            failed = report.failed.len(),
            rejected = report.rejected.len(),
            "bulk request processed"
        );

        self.replace_progress(
            progress,
            &replies::bulk_report(&report),
            InlineKeyboard::default(),
        )
        .await
    }

    /// Configured safe limit, capped by what the messenger accepts. Blank
    /// chunks are dropped since messengers reject empty messages.
    fn chunks(&self, text: &str) -> Vec<String> {
        let limit = self
            .cfg
            .telegram_safe_limit
            .min(self.messenger.capabilities().max_message_len);
        split_message(text, limit)
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect()
    }

    /// Edit the progress message into the final reply, spilling any overflow
    /// into follow-up messages. The keyboard is attached only to single-chunk
    /// replies.
    async fn replace_progress(
        &self,
        progress: MessageRef,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()> {
        let mut iter = self.chunks(text).into_iter();
        let Some(first) = iter.next() else {
            return Ok(());
        };

        let rest: Vec<String> = iter.collect();
        let with_keyboard =
            !keyboard.is_empty() && self.messenger.capabilities().supports_inline_keyboards;
        if rest.is_empty() && with_keyboard {
            return self
                .messenger
                .edit_inline_keyboard(progress, &first, keyboard)
                .await;
        }

        self.messenger.edit_html(progress, &first).await?;
        for chunk in rest {
            self.messenger.send_html(progress.chat_id, &chunk).await?;
        }
        Ok(())
    }

    async fn send(&self, chat_id: ChatId, html: &str) -> Result<()> {
        for chunk in self.chunks(html) {
            self.messenger.send_html(chat_id, &chunk).await?;
        }
        Ok(())
    }
}

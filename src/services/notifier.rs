// src/services/notifier.rs

//! Telegram notifications.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{NotifierConfig, Posting, TelegramCredentials};

pub const NO_NEW_POSTINGS: &str = "No new job postings found today.";
const NEW_POSTINGS_HEADER: &str = "🚨 *New Job Postings Available!* 🚨";

/// What a run has to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summary<'a> {
    NothingNew,
    NewPostings(&'a [Posting]),
}

impl<'a> Summary<'a> {
    pub fn for_postings(new: &'a [Posting]) -> Self {
        if new.is_empty() {
            Self::NothingNew
        } else {
            Self::NewPostings(new)
        }
    }

    /// Render the message body in Telegram legacy Markdown.
    pub fn render(&self) -> String {
        match self {
            Self::NothingNew => NO_NEW_POSTINGS.to_string(),
            Self::NewPostings(postings) => {
                let mut message = format!("{NEW_POSTINGS_HEADER}\n\n");
                for posting in *postings {
                    message.push_str(&format!(
                        "📌 {}\n🔗 [Apply Here]({})\n\n",
                        bold(&posting.title),
                        posting.link
                    ));
                }
                message
            }
        }
    }
}

/// Render `text` in bold for legacy Markdown.
///
/// Inside an entity every character up to the closing `*` is literal, so only
/// `*` needs care: the bold span is closed, an escaped `\*` emitted, and the
/// span reopened.
pub fn bold(text: &str) -> String {
    text.split('*')
        .map(|part| {
            if part.is_empty() {
                String::new()
            } else {
                format!("*{part}*")
            }
        })
        .collect::<Vec<_>>()
        .join("\\*")
}

/// Delivery channel for run summaries.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message.
    async fn send(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Sends messages through the Telegram Bot API.
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
    parse_mode: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: &NotifierConfig, credentials: &TelegramCredentials) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                credentials.bot_token
            ),
            chat_id: credentials.chat_id.clone(),
            parse_mode: config.parse_mode.clone(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: &self.parse_mode,
        };

        // The endpoint embeds the bot token, so strip it from transport errors.
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::notify(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify(format!(
                "Telegram API returned {status}: {}",
                body.trim()
            )));
        }

        log::info!("Telegram message sent to chat {}", self.chat_id);
        Ok(())
    }
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        log::info!("Dry run, message not sent:\n{text}");
        Ok(())
    }
}

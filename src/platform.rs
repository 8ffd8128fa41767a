//! Messaging-platform boundary and its Telegram implementation.
use crate::model::{MemberStatus, SponsorChannel};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::fmt;
use teloxide::prelude::*;
use teloxide::types::{
    ChatMemberKind, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, Recipient,
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Url { text: String, url: String },
    Callback { text: String, data: String },
}

impl Button {
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Button::Url {
            text: text.into(),
            url: url.into(),
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Button::Callback {
            text: text.into(),
            data: data.into(),
        }
    }
}

/// Inline keyboard, row by row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn row(mut self, row: Vec<Button>) -> Self {
        self.rows.push(row);
        self
    }
}

/// Operations the bot needs from the messaging platform.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn member_status(&self, channel: &SponsorChannel, user_id: i64) -> Result<MemberStatus>;

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i32>,
        keyboard: Option<Keyboard>,
    ) -> Result<()>;

    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<()>;

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>, alert: bool)
        -> Result<()>;

    /// Copy a message without the "forwarded from" header; returns the new id.
    async fn copy_message(&self, to_chat: i64, from_chat: i64, message_id: i32) -> Result<i32>;

    async fn edit_caption(&self, chat_id: i64, message_id: i32, caption: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct TelegramPlatform {
    bot: Bot,
}

impl fmt::Debug for TelegramPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramPlatform").finish_non_exhaustive()
    }
}

impl TelegramPlatform {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn recipient(channel: &SponsorChannel) -> Recipient {
        match channel.chat_id() {
            Some(id) => Recipient::Id(ChatId(id)),
            None => Recipient::ChannelUsername(channel.normalized()),
        }
    }
}

fn markup(keyboard: Keyboard) -> Result<InlineKeyboardMarkup> {
    let mut rows = Vec::with_capacity(keyboard.rows.len());
    for row in keyboard.rows {
        let mut buttons = Vec::with_capacity(row.len());
        for button in row {
            buttons.push(match button {
                Button::Url { text, url } => {
                    let url = Url::parse(&url).with_context(|| format!("invalid button url {url}"))?;
                    InlineKeyboardButton::url(text, url)
                }
                Button::Callback { text, data } => InlineKeyboardButton::callback(text, data),
            });
        }
        rows.push(buttons);
    }
    Ok(InlineKeyboardMarkup::new(rows))
}

fn status_of(kind: &ChatMemberKind) -> MemberStatus {
    match kind {
        ChatMemberKind::Owner(_) => MemberStatus::Creator,
        ChatMemberKind::Administrator(_) => MemberStatus::Administrator,
        ChatMemberKind::Member => MemberStatus::Member,
        ChatMemberKind::Restricted(_) => MemberStatus::Restricted,
        ChatMemberKind::Left => MemberStatus::Left,
        ChatMemberKind::Banned(_) => MemberStatus::Kicked,
    }
}

#[async_trait]
impl Platform for TelegramPlatform {
    async fn member_status(&self, channel: &SponsorChannel, user_id: i64) -> Result<MemberStatus> {
        let member = self
            .bot
            .get_chat_member(Self::recipient(channel), UserId(user_id as u64))
            .await
            .with_context(|| format!("failed to fetch membership in {}", channel.normalized()))?;
        let status = status_of(&member.kind);
        debug!(channel=%channel.normalized(), user_id, status=status.as_str(), "membership");
        Ok(status)
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i32>,
        keyboard: Option<Keyboard>,
    ) -> Result<()> {
        let mut req = self.bot.send_message(ChatId(chat_id), text.to_string());
        if let Some(id) = reply_to {
            req = req.reply_to_message_id(MessageId(id));
        }
        if let Some(kb) = keyboard {
            req = req.reply_markup(markup(kb)?);
        }
        req.await.context("send_message failed")?;
        Ok(())
    }

    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<()> {
        let mut req = self
            .bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id), text.to_string());
        if let Some(kb) = keyboard {
            req = req.reply_markup(markup(kb)?);
        }
        req.await.context("edit_message_text failed")?;
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<()> {
        let mut req = self.bot.answer_callback_query(callback_id.to_string());
        if let Some(t) = text {
            req = req.text(t.to_string());
        }
        if alert {
            req = req.show_alert(true);
        }
        req.await.context("answer_callback_query failed")?;
        Ok(())
    }

    async fn copy_message(&self, to_chat: i64, from_chat: i64, message_id: i32) -> Result<i32> {
        let copied = self
            .bot
            .copy_message(ChatId(to_chat), ChatId(from_chat), MessageId(message_id))
            .await
            .context("copy_message failed")?;
        Ok(copied.0)
    }

    async fn edit_caption(&self, chat_id: i64, message_id: i32, caption: &str) -> Result<()> {
        self.bot
            .edit_message_caption(ChatId(chat_id), MessageId(message_id))
            .caption(caption.to_string())
            .await
            .context("edit_message_caption failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_markup_rows() {
        let kb = Keyboard::default()
            .row(vec![Button::url("➕ kino", "https://t.me/kino")])
            .row(vec![
                Button::callback("a", "add_sponsor"),
                Button::callback("b", "remove_sponsor"),
            ]);
        let markup = markup(kb).unwrap();
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[1].len(), 2);
    }

    #[test]
    fn rejects_bad_url() {
        let kb = Keyboard::default().row(vec![Button::url("x", "not a url")]);
        assert!(markup(kb).is_err());
    }

    #[test]
    fn recipients() {
        assert_eq!(
            TelegramPlatform::recipient(&SponsorChannel::new("kino")),
            Recipient::ChannelUsername("@kino".into())
        );
        assert_eq!(
            TelegramPlatform::recipient(&SponsorChannel::new("-1001")),
            Recipient::Id(ChatId(-1001))
        );
    }
}

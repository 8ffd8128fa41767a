#![allow(dead_code)]

use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use tg_kinobot::config::{self, Config};
use tg_kinobot::handlers::App;
use tg_kinobot::model::{MemberStatus, SponsorChannel};
use tg_kinobot::platform::{Keyboard, Platform};
use tg_kinobot::store::Stores;
use tokio::sync::Mutex;

pub const ADMIN: i64 = 123456789;
pub const MEDIA_CHANNEL: i64 = -1001234567890;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    MemberStatus {
        channel: String,
        user_id: i64,
    },
    Send {
        chat_id: i64,
        text: String,
        reply_to: Option<i32>,
        keyboard: Option<Keyboard>,
    },
    Edit {
        chat_id: i64,
        message_id: i32,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Answer {
        callback_id: String,
        text: Option<String>,
        alert: bool,
    },
    Copy {
        to_chat: i64,
        from_chat: i64,
        message_id: i32,
    },
    EditCaption {
        chat_id: i64,
        message_id: i32,
        caption: String,
    },
}

/// Platform fake that records every call. Membership lookups for channels
/// without a scripted status fail like an unknown chat would.
#[derive(Default)]
pub struct RecordingPlatform {
    statuses: Mutex<HashMap<String, MemberStatus>>,
    unreachable_chats: Mutex<HashSet<i64>>,
    calls: Mutex<Vec<Call>>,
    fail_copy: AtomicBool,
    next_message_id: AtomicI32,
}

impl RecordingPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_message_id: AtomicI32::new(9000),
            ..Default::default()
        })
    }

    pub async fn set_status(&self, channel: &str, status: MemberStatus) {
        self.statuses
            .lock()
            .await
            .insert(SponsorChannel::new(channel).normalized(), status);
    }

    /// Sends to this chat fail, as for a user who blocked the bot.
    pub async fn block(&self, chat_id: i64) {
        self.unreachable_chats.lock().await.insert(chat_id);
    }

    pub fn fail_copies(&self) {
        self.fail_copy.store(true, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.calls.lock().await.clear();
    }

    pub async fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub async fn membership_checks(&self) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                Call::MemberStatus { channel, .. } => Some(channel),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait::async_trait]
impl Platform for RecordingPlatform {
    async fn member_status(&self, channel: &SponsorChannel, user_id: i64) -> Result<MemberStatus> {
        let handle = channel.normalized();
        self.record(Call::MemberStatus {
            channel: handle.clone(),
            user_id,
        })
        .await;
        self.statuses
            .lock()
            .await
            .get(&handle)
            .copied()
            .ok_or_else(|| anyhow!("Bad Request: chat not found"))
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i32>,
        keyboard: Option<Keyboard>,
    ) -> Result<()> {
        self.record(Call::Send {
            chat_id,
            text: text.to_string(),
            reply_to,
            keyboard,
        })
        .await;
        if self.unreachable_chats.lock().await.contains(&chat_id) {
            return Err(anyhow!("Forbidden: bot was blocked by the user"));
        }
        Ok(())
    }

    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<()> {
        self.record(Call::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
            keyboard,
        })
        .await;
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<()> {
        self.record(Call::Answer {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
            alert,
        })
        .await;
        Ok(())
    }

    async fn copy_message(&self, to_chat: i64, from_chat: i64, message_id: i32) -> Result<i32> {
        self.record(Call::Copy {
            to_chat,
            from_chat,
            message_id,
        })
        .await;
        if self.fail_copy.load(Ordering::SeqCst) {
            return Err(anyhow!("Bad Request: message to copy not found"));
        }
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn edit_caption(&self, chat_id: i64, message_id: i32, caption: &str) -> Result<()> {
        self.record(Call::EditCaption {
            chat_id,
            message_id,
            caption: caption.to_string(),
        })
        .await;
        Ok(())
    }
}

pub fn test_config(data_dir: &Path, admin_panel: bool) -> Config {
    let mut cfg: Config = serde_yaml::from_str(config::example()).unwrap();
    cfg.app.data_dir = data_dir.to_string_lossy().to_string();
    cfg.telegram.admin_panel = admin_panel;
    cfg
}

/// App over a fresh data dir seeded with `sponsors`.
pub async fn setup_app(
    data_dir: &Path,
    sponsors: &[&str],
    admin_panel: bool,
) -> (App, Arc<RecordingPlatform>) {
    let json = serde_json::to_string(sponsors).unwrap();
    std::fs::write(data_dir.join("sponsors.json"), json).unwrap();
    let stores = Stores::open(data_dir).await.unwrap();
    let platform = RecordingPlatform::new();
    let app = App::new(test_config(data_dir, admin_panel), stores, platform.clone());
    (app, platform)
}

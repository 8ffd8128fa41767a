//! Video catalog: ingest forwarded videos and deliver them by code.
use crate::model::{extract_code, VideoUpload};
use crate::platform::Platform;
use crate::store::{StoreError, Stores};
use anyhow::Result;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingest {
    Saved {
        code: String,
        message_id: i32,
        replaced: Option<i32>,
    },
    NoCode,
    WrongChannel {
        origin_chat_id: i64,
    },
    /// Forwarded from a chat, but the original message id is hidden.
    MissingMessageId {
        origin_chat_id: i64,
    },
    NotForwarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered { message_id: i32 },
    NotFound,
    Failed,
}

/// Store `code -> original message id` for a video forwarded from the media
/// channel. The catalog is only touched on `Ingest::Saved`.
#[instrument(skip(stores, upload))]
pub async fn ingest(
    stores: &Stores,
    media_channel_id: i64,
    upload: &VideoUpload,
) -> Result<Ingest, StoreError> {
    let Some(provenance) = &upload.provenance else {
        return Ok(Ingest::NotForwarded);
    };
    let Some(message_id) = provenance.origin_message_id else {
        return Ok(Ingest::MissingMessageId {
            origin_chat_id: provenance.origin_chat_id,
        });
    };
    if provenance.origin_chat_id != media_channel_id {
        return Ok(Ingest::WrongChannel {
            origin_chat_id: provenance.origin_chat_id,
        });
    }
    let Some(code) = upload.caption.as_deref().and_then(extract_code) else {
        return Ok(Ingest::NoCode);
    };

    let replaced = stores.save_video(code, message_id).await?;
    info!(code, message_id, ?replaced, "video saved");
    Ok(Ingest::Saved {
        code: code.to_string(),
        message_id,
        replaced,
    })
}

/// Copy the video stored under `code` into `chat_id` and replace its caption.
/// Platform failures are reported as `Delivery::Failed`; the entry is kept.
#[instrument(skip(platform, stores, caption))]
pub async fn deliver(
    platform: &dyn Platform,
    stores: &Stores,
    media_channel_id: i64,
    caption: &str,
    chat_id: i64,
    code: &str,
) -> Delivery {
    let Some(source_id) = stores.video(code).await else {
        return Delivery::NotFound;
    };
    match copy_with_caption(platform, media_channel_id, caption, chat_id, source_id).await {
        Ok(message_id) => Delivery::Delivered { message_id },
        Err(err) => {
            warn!(?err, code, source_id, "video delivery failed");
            Delivery::Failed
        }
    }
}

async fn copy_with_caption(
    platform: &dyn Platform,
    media_channel_id: i64,
    caption: &str,
    chat_id: i64,
    source_id: i32,
) -> Result<i32> {
    let copied = platform
        .copy_message(chat_id, media_channel_id, source_id)
        .await?;
    platform.edit_caption(chat_id, copied, caption).await?;
    Ok(copied)
}

use serde::{Deserialize, Serialize};

/// Prefix shared by numeric ids of channels and supergroups.
pub const PRIVATE_CHANNEL_PREFIX: &str = "-100";

/// A channel users must join, stored exactly as the admin typed it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SponsorChannel(pub String);

impl SponsorChannel {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Handle in the form the membership lookup expects: `@name` or `-100…`.
    pub fn normalized(&self) -> String {
        let raw = self.0.as_str();
        if raw.starts_with('@') || raw.starts_with(PRIVATE_CHANNEL_PREFIX) {
            raw.to_string()
        } else {
            format!("@{raw}")
        }
    }

    /// Numeric chat id when the handle is a `-100…` id.
    pub fn chat_id(&self) -> Option<i64> {
        if self.0.starts_with(PRIVATE_CHANNEL_PREFIX) {
            self.0.parse().ok()
        } else {
            None
        }
    }

    /// Name shown on the join button.
    pub fn display_name(&self) -> &str {
        self.0.trim_start_matches('@')
    }

    /// Link a user can follow to join the channel.
    ///
    /// Private channels (`-100…` ids) get a `t.me/c/<id>` link. Telegram only
    /// opens those for people who are already members, so a private sponsor
    /// can only be joined through an invite link shared elsewhere. Add such
    /// channels by `@username` when they have one.
    pub fn join_link(&self) -> String {
        match self.chat_id() {
            Some(_) => format!(
                "https://t.me/c/{}",
                &self.0[PRIVATE_CHANNEL_PREFIX.len()..]
            ),
            None => format!("https://t.me/{}", self.display_name()),
        }
    }
}

/// Membership status of a user in a chat, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Creator => "creator",
            MemberStatus::Administrator => "administrator",
            MemberStatus::Member => "member",
            MemberStatus::Restricted => "restricted",
            MemberStatus::Left => "left",
            MemberStatus::Kicked => "kicked",
        }
    }

    /// Whether this status satisfies a sponsor subscription.
    pub fn is_subscribed(&self) -> bool {
        matches!(
            self,
            MemberStatus::Creator | MemberStatus::Administrator | MemberStatus::Member
        )
    }
}

/// Forwarding metadata attached to an incoming video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub origin_chat_id: i64,
    pub origin_message_id: Option<i32>,
}

/// A video message sent to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpload {
    pub provenance: Option<Provenance>,
    pub caption: Option<String>,
}

/// True when `text` is non-empty and made of ASCII digits only.
pub fn is_video_code(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// First whitespace-delimited token of a caption that is all digits.
pub fn extract_code(caption: &str) -> Option<&str> {
    caption.split_whitespace().find(|word| is_video_code(word))
}

//! Classification of raw Telegram updates into the events the bot reacts to.
use crate::model::{is_video_code, Provenance, VideoUpload};
use teloxide::types::{CallbackQuery, Message};

/// Where a message-triggered event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Admin(AdminCommand),
}

/// Commands only configured admins may run. Arguments are `None` when the
/// admin left them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    AddSponsor(Option<String>),
    RemoveSponsor(Option<String>),
    ListSponsors,
    Broadcast(Option<String>),
}

/// Buttons of the admin management panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    AddSponsor,
    RemoveSponsor,
    ListSponsors,
    Broadcast,
    Stats,
    AddVideo,
    BackToAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    CheckSubs,
    Panel(PanelAction),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "check_subs" => CallbackAction::CheckSubs,
            "add_sponsor" => CallbackAction::Panel(PanelAction::AddSponsor),
            "remove_sponsor" => CallbackAction::Panel(PanelAction::RemoveSponsor),
            "list_sponsors" => CallbackAction::Panel(PanelAction::ListSponsors),
            "broadcast" => CallbackAction::Panel(PanelAction::Broadcast),
            "stats" => CallbackAction::Panel(PanelAction::Stats),
            "add_video" => CallbackAction::Panel(PanelAction::AddVideo),
            "back_to_admin" => CallbackAction::Panel(PanelAction::BackToAdmin),
            _ => return None,
        };
        Some(action)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackAction::CheckSubs => "check_subs",
            CallbackAction::Panel(PanelAction::AddSponsor) => "add_sponsor",
            CallbackAction::Panel(PanelAction::RemoveSponsor) => "remove_sponsor",
            CallbackAction::Panel(PanelAction::ListSponsors) => "list_sponsors",
            CallbackAction::Panel(PanelAction::Broadcast) => "broadcast",
            CallbackAction::Panel(PanelAction::Stats) => "stats",
            CallbackAction::Panel(PanelAction::AddVideo) => "add_video",
            CallbackAction::Panel(PanelAction::BackToAdmin) => "back_to_admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Command {
        origin: Origin,
        command: Command,
    },
    Callback {
        callback_id: String,
        user_id: i64,
        /// Chat and id of the message carrying the pressed button.
        message: Option<(i64, i32)>,
        action: CallbackAction,
    },
    Video {
        origin: Origin,
        upload: VideoUpload,
    },
    Code {
        origin: Origin,
        code: String,
    },
}

/// Parse a slash command. Both the Uzbek tokens and their English
/// equivalents are accepted, with an optional `@botname` suffix.
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;
    let (token, args) = match rest.split_once(char::is_whitespace) {
        Some((token, args)) => (token, args.trim()),
        None => (rest, ""),
    };
    let token = token.split_once('@').map_or(token, |(name, _)| name);
    let first_arg = args.split_whitespace().next().map(str::to_string);
    let full_arg = (!args.is_empty()).then(|| args.to_string());

    let command = match token {
        "start" => Command::Start,
        "homiy_qosh" | "add_sponsor" => Command::Admin(AdminCommand::AddSponsor(first_arg)),
        "homiy_olib_tashla" | "remove_sponsor" => {
            Command::Admin(AdminCommand::RemoveSponsor(first_arg))
        }
        "homiylar" | "list_sponsors" => Command::Admin(AdminCommand::ListSponsors),
        "xabar_yubor" | "broadcast" => Command::Admin(AdminCommand::Broadcast(full_arg)),
        _ => return None,
    };
    Some(command)
}

/// Classify an incoming message. Messages without a sender and shapes the
/// bot does not handle yield `None`.
pub fn from_message(msg: &Message) -> Option<InboundEvent> {
    let user = msg.from()?;
    let origin = Origin {
        user_id: user.id.0 as i64,
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
    };

    if msg.video().is_some() {
        let provenance = msg.forward_from_chat().map(|chat| Provenance {
            origin_chat_id: chat.id.0,
            origin_message_id: msg.forward_from_message_id(),
        });
        return Some(InboundEvent::Video {
            origin,
            upload: VideoUpload {
                provenance,
                caption: msg.caption().map(str::to_owned),
            },
        });
    }

    let text = msg.text()?;
    if is_video_code(text) {
        return Some(InboundEvent::Code {
            origin,
            code: text.to_string(),
        });
    }
    parse_command(text).map(|command| InboundEvent::Command { origin, command })
}

pub fn from_callback(q: &CallbackQuery) -> Option<InboundEvent> {
    let action = CallbackAction::parse(q.data.as_deref()?)?;
    Some(InboundEvent::Callback {
        callback_id: q.id.clone(),
        user_id: q.from.id.0 as i64,
        message: q.message.as_ref().map(|m| (m.chat.id.0, m.id.0)),
        action,
    })
}

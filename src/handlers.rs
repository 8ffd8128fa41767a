use crate::admin;
use crate::catalog::{self, Delivery, Ingest};
use crate::config::Config;
use crate::event::{AdminCommand, CallbackAction, Command, InboundEvent, Origin, PanelAction};
use crate::gate;
use crate::model::{SponsorChannel, VideoUpload};
use crate::platform::{Keyboard, Platform};
use crate::store::{AddSponsor, RemoveSponsor, Stores};
use crate::texts;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Everything a handler needs, built once at startup.
pub struct App {
    pub cfg: Config,
    pub stores: Stores,
    pub platform: Arc<dyn Platform>,
}

impl App {
    pub fn new(cfg: Config, stores: Stores, platform: Arc<dyn Platform>) -> Self {
        Self {
            cfg,
            stores,
            platform,
        }
    }

    fn panel_enabled_for(&self, user_id: i64) -> bool {
        self.cfg.telegram.admin_panel && self.cfg.is_admin(user_id)
    }

    /// Reply in the chat of `origin`, quoting its message. Send failures are
    /// logged only.
    async fn reply(&self, origin: &Origin, text: &str) {
        if let Err(err) = self
            .platform
            .send_text(origin.chat_id, text, Some(origin.message_id), None)
            .await
        {
            warn!(?err, chat_id = origin.chat_id, "failed to reply");
        }
    }

    async fn send(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) {
        if let Err(err) = self.platform.send_text(chat_id, text, None, keyboard).await {
            warn!(?err, chat_id, "failed to send message");
        }
    }

    async fn edit(&self, chat_id: i64, message_id: i32, text: &str, keyboard: Option<Keyboard>) {
        if let Err(err) = self
            .platform
            .edit_text(chat_id, message_id, text, keyboard)
            .await
        {
            warn!(?err, chat_id, message_id, "failed to edit message");
        }
    }

    async fn answer(&self, callback_id: &str, text: Option<&str>, alert: bool) {
        if let Err(err) = self.platform.answer_callback(callback_id, text, alert).await {
            warn!(?err, "failed to answer callback");
        }
    }

    async fn gate(&self, user_id: i64) -> bool {
        gate::check_subscriptions(self.platform.as_ref(), &self.stores, user_id).await
    }

    /// Ask the user to join every sponsor channel.
    async fn send_join_prompt(&self, chat_id: i64, text: &str) {
        let sponsors = self.stores.sponsors().await;
        self.send(chat_id, text, Some(texts::join_keyboard(&sponsors)))
            .await;
    }
}

#[instrument(skip_all)]
pub async fn handle_event(app: &App, event: InboundEvent) -> Result<()> {
    match event {
        InboundEvent::Command {
            origin,
            command: Command::Start,
        } => start(app, &origin).await,
        InboundEvent::Callback {
            callback_id,
            user_id,
            message,
            action,
        } => match action {
            CallbackAction::CheckSubs => check_subs(app, &callback_id, user_id, message).await,
            CallbackAction::Panel(action) => {
                panel(app, &callback_id, user_id, message, action).await
            }
        },
        InboundEvent::Video { origin, upload } => save_video(app, &origin, &upload).await,
        InboundEvent::Code { origin, code } => send_video(app, &origin, &code).await,
        InboundEvent::Command {
            origin,
            command: Command::Admin(command),
        } => {
            if !app.cfg.is_admin(origin.user_id) {
                debug!(user_id = origin.user_id, ?command, "ignoring admin command");
                return Ok(());
            }
            admin_command(app, &origin, command).await
        }
    }
}

async fn start(app: &App, origin: &Origin) -> Result<()> {
    if app.stores.register_user(origin.user_id).await? {
        info!(user_id = origin.user_id, "registered user");
    }

    if !app.gate(origin.user_id).await {
        app.send_join_prompt(origin.chat_id, texts::JOIN_TO_USE).await;
        return Ok(());
    }

    if app.panel_enabled_for(origin.user_id) {
        app.send(origin.chat_id, texts::ADMIN_WELCOME, Some(texts::admin_panel()))
            .await;
    } else if app.cfg.telegram.admin_panel {
        app.send(origin.chat_id, texts::WELCOME, None).await;
    } else {
        app.send(origin.chat_id, texts::CODE_PROMPT, None).await;
    }
    Ok(())
}

async fn check_subs(
    app: &App,
    callback_id: &str,
    user_id: i64,
    message: Option<(i64, i32)>,
) -> Result<()> {
    if !app.gate(user_id).await {
        app.answer(callback_id, Some(texts::SUBS_INCOMPLETE), true)
            .await;
        return Ok(());
    }
    app.answer(callback_id, Some(texts::SUBS_CONFIRMED), false)
        .await;

    let (text, keyboard) = if app.panel_enabled_for(user_id) {
        (texts::ADMIN_PANEL, Some(texts::admin_panel()))
    } else {
        (texts::CODE_PROMPT_AFTER_CHECK, None)
    };
    match message {
        Some((chat_id, message_id)) if app.cfg.telegram.admin_panel => {
            app.edit(chat_id, message_id, text, keyboard).await
        }
        Some((chat_id, _)) => app.send(chat_id, text, keyboard).await,
        None => app.send(user_id, text, keyboard).await,
    }
    Ok(())
}

async fn panel(
    app: &App,
    callback_id: &str,
    user_id: i64,
    message: Option<(i64, i32)>,
    action: PanelAction,
) -> Result<()> {
    if !app.cfg.is_admin(user_id) {
        app.answer(callback_id, Some(texts::ADMIN_ONLY), true).await;
        return Ok(());
    }

    if let Some((chat_id, message_id)) = message {
        let (text, keyboard) = match action {
            PanelAction::AddSponsor => (texts::ADD_SPONSOR_USAGE.to_string(), texts::back_to_admin()),
            PanelAction::RemoveSponsor => {
                (texts::REMOVE_SPONSOR_USAGE.to_string(), texts::back_to_admin())
            }
            PanelAction::Broadcast => (texts::BROADCAST_USAGE.to_string(), texts::back_to_admin()),
            PanelAction::AddVideo => (texts::ADD_VIDEO_HINT.to_string(), texts::back_to_admin()),
            PanelAction::ListSponsors => {
                let sponsors = app.stores.sponsors().await;
                (texts::sponsor_list(&sponsors), texts::back_to_admin())
            }
            PanelAction::Stats => {
                let stats = app.stores.stats().await;
                (texts::stats(&stats), texts::back_to_admin())
            }
            PanelAction::BackToAdmin => (texts::ADMIN_PANEL.to_string(), texts::admin_panel()),
        };
        app.edit(chat_id, message_id, &text, Some(keyboard)).await;
    }
    app.answer(callback_id, None, false).await;
    Ok(())
}

async fn save_video(app: &App, origin: &Origin, upload: &VideoUpload) -> Result<()> {
    let outcome = catalog::ingest(&app.stores, app.cfg.telegram.media_channel_id, upload).await;
    let text = match outcome {
        Err(err) => {
            warn!(?err, "failed to save video");
            texts::SAVE_FAILED.to_string()
        }
        Ok(outcome) => ingest_reply(outcome),
    };
    app.reply(origin, &text).await;
    Ok(())
}

fn ingest_reply(outcome: Ingest) -> String {
    match outcome {
        Ingest::Saved { code, .. } => texts::video_saved(&code),
        Ingest::NoCode => texts::NO_CODE_IN_CAPTION.to_string(),
        Ingest::WrongChannel { origin_chat_id } => {
            debug!(origin_chat_id, "video forwarded from another channel");
            texts::WRONG_CHANNEL.to_string()
        }
        Ingest::MissingMessageId { origin_chat_id } => texts::channel_id(origin_chat_id),
        Ingest::NotForwarded => texts::FORWARD_NOT_UPLOAD.to_string(),
    }
}

async fn send_video(app: &App, origin: &Origin, code: &str) -> Result<()> {
    if !app.gate(origin.user_id).await {
        app.send_join_prompt(origin.chat_id, texts::JOIN_TO_WATCH).await;
        return Ok(());
    }

    let delivery = catalog::deliver(
        app.platform.as_ref(),
        &app.stores,
        app.cfg.telegram.media_channel_id,
        &app.cfg.telegram.promo_caption,
        origin.chat_id,
        code,
    )
    .await;
    match delivery {
        Delivery::Delivered { .. } => {}
        Delivery::NotFound => app.reply(origin, texts::VIDEO_NOT_FOUND).await,
        Delivery::Failed => app.reply(origin, texts::DELIVERY_FAILED).await,
    }
    Ok(())
}

async fn admin_command(app: &App, origin: &Origin, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::AddSponsor(None) => app.reply(origin, texts::ADD_SPONSOR_USAGE).await,
        AdminCommand::AddSponsor(Some(handle)) => {
            let text = match app.stores.add_sponsor(SponsorChannel::new(handle.clone())).await {
                Ok(AddSponsor::Added) => {
                    info!(%handle, "sponsor added");
                    texts::SPONSOR_ADDED
                }
                Ok(AddSponsor::AlreadyPresent) => texts::SPONSOR_EXISTS,
                Err(err) => {
                    warn!(?err, %handle, "failed to add sponsor");
                    texts::SAVE_FAILED
                }
            };
            app.reply(origin, text).await;
        }
        AdminCommand::RemoveSponsor(None) => app.reply(origin, texts::REMOVE_SPONSOR_USAGE).await,
        AdminCommand::RemoveSponsor(Some(handle)) => {
            let text = match app.stores.remove_sponsor(&handle).await {
                Ok(RemoveSponsor::Removed) => {
                    info!(%handle, "sponsor removed");
                    texts::SPONSOR_REMOVED
                }
                Ok(RemoveSponsor::NotFound) => texts::SPONSOR_NOT_FOUND,
                Err(err) => {
                    warn!(?err, %handle, "failed to remove sponsor");
                    texts::SAVE_FAILED
                }
            };
            app.reply(origin, text).await;
        }
        AdminCommand::ListSponsors => {
            let sponsors = app.stores.sponsors().await;
            app.reply(origin, &texts::sponsor_list(&sponsors)).await;
        }
        AdminCommand::Broadcast(None) => app.reply(origin, texts::BROADCAST_USAGE).await,
        AdminCommand::Broadcast(Some(text)) => {
            let users = app.stores.users().await;
            let report = admin::broadcast(app.platform.as_ref(), &users, &text).await;
            app.reply(origin, &texts::broadcast_done(report.sent)).await;
        }
    }
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::dptree;
use teloxide::prelude::*;
use tg_kinobot::config;
use tg_kinobot::event;
use tg_kinobot::handlers::{self, App};
use tg_kinobot::platform::TelegramPlatform;
use tg_kinobot::store::Stores;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Create an empty sponsor list in the data dir if there is none yet
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let data_dir = cfg.data_dir();
    if args.init {
        Stores::provision(&data_dir).await?;
    }
    let stores = Stores::open(&data_dir).await?;
    let stats = stores.stats().await;
    info!(
        users = stats.users,
        videos = stats.videos,
        sponsors = stats.sponsors,
        "loaded stores"
    );

    let bot = Bot::new(cfg.telegram.bot_token.clone());
    let platform = Arc::new(TelegramPlatform::new(bot.clone()));
    let app = Arc::new(App::new(cfg, stores, platform));

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    info!("starting telegram bot");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![app])
        // Updates that match no branch are dropped silently.
        .default_handler(|_| std::future::ready(()))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("bot stopped");
    Ok(())
}

async fn on_message(app: Arc<App>, msg: Message) -> ResponseResult<()> {
    if let Some(ev) = event::from_message(&msg) {
        if let Err(err) = handlers::handle_event(&app, ev).await {
            error!(?err, "failed to handle message");
        }
    }
    Ok(())
}

async fn on_callback(app: Arc<App>, q: CallbackQuery) -> ResponseResult<()> {
    if let Some(ev) = event::from_callback(&q) {
        if let Err(err) = handlers::handle_event(&app, ev).await {
            error!(?err, "failed to handle callback");
        }
    }
    Ok(())
}

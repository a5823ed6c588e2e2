use std::sync::Arc;

use anyhow::Context;
use reference_data::ReferenceData;
use store_client::HttpRecordStore;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wizard::BotContext;

mod config;
mod sessions;
mod telegram;

use config::Settings;
use telegram::BotState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(err) if err.not_found() => None,
        Err(err) => return Err(err).context("failed to read .env"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    if let Some(path) = env_file {
        info!(path = %path.display(), "loaded environment file");
    }

    let settings = Settings::load().context("invalid configuration")?;
    info!(?settings, "configuration loaded");

    let data = ReferenceData::load(&settings.data_dir).with_context(|| {
        format!(
            "failed to load reference data from '{}'",
            settings.data_dir.display()
        )
    })?;
    let store = HttpRecordStore::new(settings.store_url.clone(), settings.store_timeout)
        .context("failed to build record store client")?;

    let ctx = BotContext::new(Arc::new(data), Arc::new(store), settings.tz);
    let bot = Bot::new(settings.bot_token.clone());

    info!("bot polling started");
    telegram::run(bot, BotState::new(ctx)).await;
    info!("bot stopped");
    Ok(())
}

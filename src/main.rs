use anyhow::Context;
use gltch::{
    api::ApiClient,
    app::App,
    chat::ChatPanel,
    config::{config_dir, get_config_path, load_effective_config},
    logging::init_logging,
    token_store::TokenStore,
    ui::run_ui,
};
use std::{env, path::PathBuf, sync::Arc};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config_path = get_config_path()?;
    let config = load_effective_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let log_dir = match env::var("GLTCH_LOG_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => config_dir()?,
    };
    let _logger = init_logging(&config.log_level, &log_dir)?;
    log::info!("Starting against {}", config.api_base_url);

    let tokens = TokenStore::new(config.resolved_token_path()?);
    if let Ok(token) = env::var("GLTCH_TOKEN") {
        tokens
            .save(&token)
            .context("storing GLTCH_TOKEN in the token file")?;
    }

    let (client_tx, client_rx) = mpsc::unbounded_channel();
    let api = Arc::new(ApiClient::new(config.api_base_url.clone(), tokens).with_events(client_tx));

    match api.health().await {
        Ok(health) => log::info!("API health: {}", health.status),
        Err(e) => log::warn!("API health check failed, replies will come from the fallback set: {}", e),
    }

    let chat = ChatPanel::new(Some(Arc::clone(&api))).with_settle_delay(config.speaking_settle());
    let (app_tx, app_rx) = mpsc::unbounded_channel();
    let app = App::new(Some(api), chat, app_tx);

    run_ui(app, client_rx, app_rx, config.tick_rate()).await?;

    log::info!("Shutting down");
    Ok(())
}

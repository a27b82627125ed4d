use std::sync::Arc;

use tracing::info;

use cutbot_core::{
    config::{Config, TransportMode},
    shortener::Shortener,
    usage::UsageTracker,
};
use cutbot_cuttly::CuttlyClient;

#[tokio::main]
async fn main() -> Result<(), cutbot_core::Error> {
    cutbot_core::logging::init("cutbot")?;

    let cfg = Arc::new(Config::load()?);
    info!(
        webhook = matches!(cfg.transport, TransportMode::Webhook { .. }),
        bulk_max = cfg.bulk_max_urls,
        timeout_secs = cfg.shorten_timeout.as_secs(),
        "configuration loaded"
    );

    let shortener: Arc<dyn Shortener> = Arc::new(CuttlyClient::new(
        &cfg.cuttly_api_key,
        &cfg.cuttly_api_url,
        cfg.shorten_timeout,
    )?);
    let usage = Arc::new(UsageTracker::new());

    cutbot_telegram::router::run(cfg, shortener, usage)
        .await
        .map_err(|e| cutbot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}

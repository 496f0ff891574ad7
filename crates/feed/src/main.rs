use std::io;

use hearme_domain::config::FeedConfig;
use hearme_domain::services::telemetry::{init_telemetry, TelemetryConfig};
use hearme_feed::{run_feed, FeedError, HttpMessageSource};
use tracing::info;

#[tokio::main]
async fn main() -> io::Result<()> {
    if let Err(err) = bootstrap().await {
        eprintln!("[feed] bootstrap failed: {err}");
        return Err(io::Error::other(err.to_string()));
    }

    Ok(())
}

async fn bootstrap() -> Result<(), FeedError> {
    let config = FeedConfig::load_from_env()?;
    init_telemetry(&TelemetryConfig::from_env("FEED"))?;
    let source = HttpMessageSource::new(config.api_url(), config.show_id(), config.paid_only())?;
    info!(
        url = %source.url(),
        interval_ms = config.poll_interval().as_millis() as u64,
        "following show"
    );
    let mut stdout = io::stdout();
    run_feed(source, config.poll_interval(), &mut stdout).await
}

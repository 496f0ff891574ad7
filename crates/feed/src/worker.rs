use std::io::{self, Write};
use std::time::Duration;

use hearme_domain::{config::ConfigError, services::telemetry::TelemetryError};
use metrics::{counter, gauge, histogram};
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::source::MessageSource;
use crate::state::FeedState;

const HIGHLIGHT_MARKER: &str = ">>";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("api responded with status {0}")]
    Status(u16),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for FeedError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}

/// Polls `source` every `poll_interval` and redraws `out` whenever the
/// visible feed changed: new messages, expired highlights, or the very first
/// successful poll. Fetch failures are logged and the next tick proceeds on
/// the same schedule.
pub async fn run_feed<S, W>(source: S, poll_interval: Duration, out: &mut W) -> Result<(), FeedError>
where
    S: MessageSource,
    W: Write,
{
    let mut state = FeedState::new();
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        poll_once(&source, &mut state).await;
        if state.needs_redraw() {
            render(&state, out)?;
            state.mark_drawn();
        }
    }
}

/// Runs a single fetch against `source`. Returns the number of new messages,
/// or zero when the fetch failed.
pub async fn poll_once<S>(source: &S, state: &mut FeedState) -> usize
where
    S: MessageSource,
{
    match source.fetch_messages().await {
        Ok(batch) => {
            counter!("feed_polls_total", "result" => "ok").increment(1);
            histogram!("feed_batch_messages").record(batch.len() as f64);
            let added = state.apply(batch);
            gauge!("feed_messages_on_screen").set(state.messages().len() as f64);
            debug!(added, total = state.messages().len(), "poll completed");
            added
        }
        Err(err) => {
            counter!("feed_polls_total", "result" => "error").increment(1);
            warn!(error = %err, "message fetch failed");
            0
        }
    }
}

/// Writes the feed newest first, one message per line.
pub fn render<W: Write>(state: &FeedState, out: &mut W) -> io::Result<()> {
    writeln!(out, "---- {} messages ----", state.messages().len())?;
    for message in state.messages() {
        let marker = if state.is_highlighted(message) {
            HIGHLIGHT_MARKER
        } else {
            "  "
        };
        let paid = if message.paid { " (paid)" } else { "" };
        writeln!(
            out,
            "{marker} [{}] {}: {} - {}{paid}",
            message.created_at.format("%H:%M:%S"),
            message.display_name,
            message.content,
            format_cents(message.payment),
        )?;
    }
    out.flush()
}

fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

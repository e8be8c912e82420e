//! deepscout - CLI entry point.
//!
//! Runs one research query and streams agent events to stdout, one prefixed
//! line per event, closed by a terminator line. Logs go to stderr so the
//! event stream stays clean.

use std::io::Write;

use deepscout::events::{self, AgentEvent};
use deepscout::{Agent, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deepscout=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        anyhow::bail!("usage: deepscout <query>");
    }

    let config = Config::from_env()?;
    info!("Loaded configuration: model={}", config.model);

    let agent = Agent::new(config);

    let stdout = std::io::stdout();
    let result = agent
        .run(&query, |event| {
            let mut out = stdout.lock();
            let _ = out.write_all(events::render_line(event).as_bytes());
            let _ = out.flush();
        })
        .await;

    let mut out = stdout.lock();
    if let Err(e) = &result {
        // One terminal error event with the classified explanation.
        let _ = out.write_all(
            events::render_line(&AgentEvent::Error {
                message: e.to_string(),
            })
            .as_bytes(),
        );
    }
    let _ = out.write_all(events::TERMINATOR_LINE.as_bytes());
    let _ = out.flush();

    result.map(|_| ()).map_err(Into::into)
}

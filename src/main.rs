//! Happy Clicker Terminal Front End
//!
//! Reads commands from stdin (one per line, JSON or text) and writes JSON
//! responses, toasts and engine events to stdout. Logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use happy_clicker::{
    VERSION,
    game::content::{ContentSource, StaticContent},
    runtime::{
        ChannelSink, ClickerConfig, ClickerEngine, Command, Response, dispatch,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let default_level = if cfg!(feature = "debug-tracing") { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Happy Clicker v{}", VERSION);

    let config = ClickerConfig::from_env().context("invalid CLICKER_* configuration")?;
    let now = Utc::now();
    let content: Arc<dyn ContentSource> = match &config.content_path {
        Some(path) => {
            info!("Loading content from {}", path.display());
            let content = StaticContent::load(path, now)
                .with_context(|| format!("failed to load content from {}", path.display()))?;
            Arc::new(content)
        }
        None => Arc::new(StaticContent::builtin(now)),
    };

    let (sink, mut toasts) = ChannelSink::new();
    let engine = ClickerEngine::new(config, content, Arc::new(sink));
    let mut events = engine.subscribe();
    info!("Session {} ready", engine.id_string());

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write_response(&mut stdout, &Response::State(engine.snapshot().await)).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    info!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => dispatch(&engine, command).await,
                    Err(e) => Response::error(e),
                };
                write_response(&mut stdout, &response).await?;
            }
            Some(toast) = toasts.recv() => {
                write_response(&mut stdout, &Response::Toast(toast)).await?;
            }
            event = events.recv() => match event {
                Ok(event) => write_response(&mut stdout, &Response::Event(event)).await?,
                Err(RecvError::Lagged(skipped)) => warn!("Dropped {} engine events", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }

    let farewell = dispatch(&engine, Command::Quit).await;
    engine.shutdown().await;
    write_response(&mut stdout, &farewell).await?;

    Ok(())
}

/// Write one JSON response line.
async fn write_response(stdout: &mut Stdout, response: &Response) -> Result<()> {
    let mut line = response.to_json().context("failed to serialize response")?;
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

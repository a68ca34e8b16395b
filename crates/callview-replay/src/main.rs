//! Call View Replay
//!
//! Feeds a capture of RTC SDK callback payloads (one JSON object per line on
//! stdin) through a `SessionActor` and prints the resulting view as JSON on
//! stdout. Logs go to stderr.
//!
//! # Startup Flow
//!
//! 1. Load observability and session configuration from environment
//! 2. Initialize tracing (`RUST_LOG` wins over `CALLVIEW_LOG_LEVEL`)
//! 3. Spawn the `SessionActor`
//! 4. Ingest stdin line by line; stop early on Ctrl+C
//! 5. Print tiles, speaker window and page sizes

#![warn(clippy::pedantic)]

use anyhow::Context;
use callview_core::actions::{tile_actions, TileActions};
use callview_core::actor::SessionActor;
use callview_core::avatar::avatar_color;
use callview_core::config::SessionConfig;
use callview_core::model::{PeerIdentity, TileRecord};
use callview_core::session::IngestOutcome;
use common::config::ObservabilityConfig;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// One tile as printed in the report.
#[derive(Debug, Serialize)]
struct TileView {
    #[serde(flatten)]
    tile: TileRecord,
    avatar: String,
    /// Present once the capture has reported the local peer.
    actions: Option<TileActions>,
}

/// Final state printed to stdout.
#[derive(Debug, Serialize)]
struct Report {
    lines: usize,
    applied: usize,
    ignored: usize,
    tiles: Vec<TileView>,
    active_speakers: Vec<PeerIdentity>,
    page_sizes: Vec<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let observability =
        ObservabilityConfig::from_env().context("invalid observability configuration")?;

    // Initialize tracing
    let default_filter = format!(
        "callview_core={level},callview_replay={level}",
        level = observability.log_level
    );
    let json_logs = observability.json_logs;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    info!("Starting Call View Replay");

    let config = SessionConfig::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        speaker_capacity = config.speaker_capacity,
        page_size = config.page_size,
        placeholder_policy = ?config.placeholder_policy,
        "Configuration loaded successfully"
    );

    let shutdown_token = CancellationToken::new();
    let (handle, actor_task) = SessionActor::spawn(config, shutdown_token.child_token());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut report = Report {
        lines: 0,
        applied: 0,
        ignored: 0,
        tiles: Vec::new(),
        active_speakers: Vec::new(),
        page_sizes: Vec::new(),
    };

    loop {
        let line = tokio::select! {
            () = shutdown_signal() => {
                warn!("Interrupted, reporting partial replay");
                break;
            }
            line = lines.next_line() => line.context("failed to read stdin")?,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        report.lines += 1;

        match handle.ingest_json(line).await? {
            IngestOutcome::Applied { event } => {
                report.applied += 1;
                debug!(line = report.lines, event, "Payload applied");
            }
            IngestOutcome::Ignored(reason) => {
                report.ignored += 1;
                warn!(line = report.lines, reason = %reason, "Payload ignored");
            }
        }
    }

    let local = handle.local_peer().await?;
    report.tiles = handle
        .snapshot()
        .await?
        .iter()
        .map(|tile| TileView {
            avatar: avatar_color(&tile.peer.id).hex(),
            actions: local.as_ref().map(|local| tile_actions(tile, local)),
            tile: tile.clone(),
        })
        .collect();
    report.active_speakers = handle.active_speakers().await?;
    report.page_sizes = handle.pages().await?.iter().map(Vec::len).collect();

    info!(
        lines = report.lines,
        applied = report.applied,
        ignored = report.ignored,
        tiles = report.tiles.len(),
        "Replay complete"
    );

    shutdown_token.cancel();
    actor_task.await.context("session actor task failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed the replay simply
/// runs to end of input.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

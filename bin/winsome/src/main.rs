//! # WINSOME Daemon
//!
//! The entry point that assembles the node: settings, snapshot restore, the
//! reward scheduler, periodic checkpoints, and graceful shutdown. The
//! client-facing transport mounts on top of [`SocialState`]; it is not part
//! of this binary.

mod settings;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;
use winsome_core::{FollowEvent, FollowNotifier};
use winsome_rewards::{run_scheduler, RewardConfig, RewardEngine};
use winsome_state::SocialState;

/// Stands in for the remote-callback layer: follow changes are only logged.
struct LogNotifier;

impl FollowNotifier for LogNotifier {
    fn notify(&self, event: &FollowEvent) {
        tracing::info!(
            follower = %event.follower,
            followee = %event.followee,
            change = ?event.change,
            "follow graph changed"
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = settings::Settings::load().context("loading settings")?;
    tracing::info!(?settings, "starting winsome");

    // A structurally broken snapshot is fatal here: the process must not
    // start with an inconsistent state.
    let state = match tokio::fs::read(&settings.snapshot_path).await {
        Ok(bytes) => Arc::new(
            winsome_persist::decode(&bytes, Box::new(LogNotifier))
                .context("restoring snapshot")?,
        ),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %settings.snapshot_path.display(), "no snapshot found, starting empty");
            Arc::new(SocialState::new(Box::new(LogNotifier)))
        }
        Err(err) => return Err(err).context("reading snapshot"),
    };

    let engine = Arc::new(RewardEngine::new(
        Arc::clone(&state.posts),
        Arc::clone(&state.wallet),
        RewardConfig::new(settings.author_share)?,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(run_scheduler(
        engine,
        settings.reward_period(),
        shutdown_rx.clone(),
    ));
    let checkpoints = tokio::spawn(checkpoint_loop(
        Arc::clone(&state),
        settings.snapshot_path.clone(),
        settings.checkpoint_period(),
        shutdown_rx,
    ));

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    tracing::info!("shutdown requested");
    shutdown_tx.send(true).ok();
    let _ = scheduler.await;
    let _ = checkpoints.await;

    write_snapshot(&state, &settings.snapshot_path)
        .await
        .context("writing final snapshot")?;
    tracing::info!("bye");
    Ok(())
}

/// Periodic checkpointing. A failed checkpoint is logged and retried next
/// period; the in-memory state stays authoritative.
async fn checkpoint_loop(
    state: Arc<SocialState>,
    path: std::path::PathBuf,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(err) = write_snapshot(&state, &path).await {
                    tracing::error!(%err, "checkpoint failed, in-memory state remains authoritative");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}

/// Write-to-temp-then-rename so a crash mid-write never clobbers the last
/// good snapshot.
async fn write_snapshot(state: &SocialState, path: &Path) -> anyhow::Result<()> {
    let bytes = winsome_persist::encode(state)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    tracing::debug!(bytes = bytes.len(), path = %path.display(), "snapshot written");
    Ok(())
}

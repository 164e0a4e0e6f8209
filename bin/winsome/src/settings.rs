//! Runtime settings, loaded from defaults overridable via `WINSOME_*`
//! environment variables (and a local `.env` file in development).

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Where the state snapshot lives on disk.
    pub snapshot_path: PathBuf,
    /// Seconds between reward-engine ticks.
    pub reward_period_secs: u64,
    /// Author's fraction of each post reward, 0..=1.
    pub author_share: f64,
    /// Seconds between periodic state checkpoints.
    pub checkpoint_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("snapshot_path", "winsome-snapshot.json")?
            .set_default("reward_period_secs", 10_i64)?
            .set_default("author_share", 0.7_f64)?
            .set_default("checkpoint_secs", 60_i64)?
            .add_source(config::Environment::with_prefix("WINSOME"))
            .build()?
            .try_deserialize()
    }

    pub fn reward_period(&self) -> Duration {
        Duration::from_secs(self.reward_period_secs)
    }

    pub fn checkpoint_period(&self) -> Duration {
        Duration::from_secs(self.checkpoint_secs)
    }
}

//! winsome/crates/winsome-rewards/src/lib.rs
//!
//! The periodic reward engine: converts accumulated, not-yet-counted
//! engagement into wallet transactions, exactly once per engagement unit.

pub mod config;
pub mod engine;
pub mod scheduler;

pub use config::RewardConfig;
pub use engine::{reward_value, RewardEngine, TickSummary};
pub use scheduler::run_scheduler;

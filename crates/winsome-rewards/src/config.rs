//! Reward-engine configuration. The damping shape is fixed (see
//! [`reward_value`](crate::engine::reward_value)); the author/curator split
//! is an operator choice.

use winsome_core::{AppError, Result};

#[derive(Debug, Clone, Copy)]
pub struct RewardConfig {
    /// Fraction of each post reward credited to the author, 0..=1.
    /// The remainder is split evenly across that tick's distinct curators.
    pub author_share: f64,
}

impl RewardConfig {
    pub fn new(author_share: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&author_share) {
            return Err(AppError::Validation(format!(
                "author share must be within 0..=1, got {author_share}"
            )));
        }
        Ok(Self { author_share })
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self { author_share: 0.7 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_bounds() {
        assert!(RewardConfig::new(0.0).is_ok());
        assert!(RewardConfig::new(1.0).is_ok());
        assert!(RewardConfig::new(1.01).is_err());
        assert!(RewardConfig::new(-0.1).is_err());
    }
}

//! # Wallet ledger
//!
//! Per-user append-only transaction history plus running total. Only the
//! reward engine writes here; clients read independent copies.

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use winsome_core::{Transaction, WalletView};

#[derive(Debug, Default)]
struct Wallet {
    total: f64,
    history: Vec<Transaction>,
}

/// Serializable form of one wallet; the total is recomputed on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub username: String,
    pub history: Vec<Transaction>,
}

#[derive(Debug, Default)]
pub struct WalletLedger {
    wallets: DashMap<String, Wallet>,
}

impl WalletLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one transaction crediting `username`. Timestamped here so the
    /// history order matches wall-clock order within a tick.
    pub fn credit(&self, username: &str, amount: f64) {
        let mut wallet = self.wallets.entry(username.to_string()).or_default();
        wallet.total += amount;
        wallet.history.push(Transaction {
            username: username.to_string(),
            amount,
            timestamp: Utc::now(),
        });
    }

    /// Detached copy of `username`'s wallet. Users with no transactions yet
    /// have an empty wallet, not an error.
    pub fn wallet_of(&self, username: &str) -> WalletView {
        self.wallets
            .get(username)
            .map(|w| WalletView {
                total: w.total,
                history: w.history.clone(),
            })
            .unwrap_or_default()
    }

    /// The Wincoin total converted at a randomly sampled exchange rate,
    /// standing in for the external rate service of the original system.
    pub fn total_in_bitcoin(&self, username: &str) -> f64 {
        let rate: f64 = rand::random();
        self.wallet_of(username).total * rate
    }

    /// Number of transactions across all wallets.
    pub fn transaction_count(&self) -> usize {
        self.wallets.iter().map(|w| w.history.len()).sum()
    }

    /// Sorted records for the snapshot codec.
    pub fn export(&self) -> Vec<WalletRecord> {
        let mut out: Vec<WalletRecord> = self
            .wallets
            .iter()
            .map(|w| WalletRecord {
                username: w.key().clone(),
                history: w.value().history.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.username.cmp(&b.username));
        out
    }

    /// Rebuilds wallets from snapshot records, recomputing totals.
    pub fn import(records: Vec<WalletRecord>) -> Self {
        let ledger = Self::new();
        for record in records {
            let total = record.history.iter().map(|t| t.amount).sum();
            ledger.wallets.insert(
                record.username,
                Wallet {
                    total,
                    history: record.history,
                },
            );
        }
        ledger
    }
}

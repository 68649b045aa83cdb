//! Wallet types.
//!
//! Wallets are owned by the banking backend; this crate only reads them to
//! label transactions shown under an aggregated wallet.

use serde::{Deserialize, Serialize};

/// Bank account backing a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub account_number: String,
    #[serde(default)]
    pub bank_branch_id: Option<String>,
}

/// A bank wallet with its balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub wallet_id: String,
    pub wallet_name: String,
    pub currency_code: String,
    pub current_balance: f64,
    /// Whether this wallet combines several underlying accounts.
    #[serde(default)]
    pub is_aggregated: bool,
    #[serde(default)]
    pub bank_account: Option<BankAccount>,
}

impl Wallet {
    /// Compare wallet ids the way the backend formats them inconsistently:
    /// with or without dashes.
    #[must_use]
    pub fn matches_id(&self, wallet_id: &str) -> bool {
        normalize_wallet_id(&self.wallet_id) == normalize_wallet_id(wallet_id)
    }
}

fn normalize_wallet_id(wallet_id: &str) -> String {
    wallet_id.chars().filter(|c| *c != '-').collect()
}

/// Find the wallet matching `wallet_id`, ignoring dashes.
#[must_use]
pub fn find_wallet<'a>(wallets: &'a [Wallet], wallet_id: &str) -> Option<&'a Wallet> {
    wallets.iter().find(|wallet| wallet.matches_id(wallet_id))
}

//! Paged transaction responses and the per-wallet record built from them.

use serde::{Deserialize, Serialize};

use super::Transaction;

// ============================================================================
// Paging
// ============================================================================

/// Position within a paginated transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page_number: u32,
    pub page_size: u32,
    #[serde(default)]
    pub total_records: u64,
}

impl Paging {
    /// Returns `true` while records remain beyond the current page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.page_number) * u64::from(self.page_size) < self.total_records
    }

    /// The page that follows this one, if there is one.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        if self.has_more() {
            self.page_number.checked_add(1)
        } else {
            None
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Server-computed money in/out totals for a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub total_money_in: f64,
    pub total_money_out: f64,
}

// ============================================================================
// Responses and Records
// ============================================================================

/// One page of transactions as returned by the wallet API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    #[serde(default)]
    pub data: Vec<Transaction>,
    pub paging: Paging,
    #[serde(default)]
    pub summary: TransactionSummary,
}

/// Everything fetched so far for one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub wallet_id: String,
    pub data: Vec<Transaction>,
    pub paging: Paging,
    pub summary: TransactionSummary,
}

impl WalletTransaction {
    /// Start a record from the first page fetched for a wallet.
    #[must_use]
    pub fn from_page(wallet_id: impl Into<String>, page: TransactionPage) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            data: page.data,
            paging: page.paging,
            summary: page.summary,
        }
    }

    /// Append a later page, taking its paging and summary as current.
    pub fn append_page(&mut self, page: TransactionPage) {
        self.data.extend(page.data);
        self.paging = page.paging;
        self.summary = page.summary;
    }

    /// Replace everything with a freshly fetched page.
    pub fn replace_with(&mut self, page: TransactionPage) {
        self.data = page.data;
        self.paging = page.paging;
        self.summary = page.summary;
    }
}

// ============================================================================
// Tests
// ============================================================================

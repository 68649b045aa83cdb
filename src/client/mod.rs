//! Clients for the wallet API.
//!
//! The store never talks HTTP itself; it is handed a [`TransactionSource`]
//! when it is built. [`WalletClient`] is the production source, tests use a
//! scripted one.

#![allow(unused_imports)]

pub mod http;
pub mod wallet;

// ============================================================================
// Re-exports
// ============================================================================

pub use http::{HttpClient, HttpConfig};
pub use wallet::WalletClient;

use crate::domain::{TransactionPage, WalletError};

// ============================================================================
// Transaction Source
// ============================================================================

/// Anything that can fetch one page of a wallet's transactions.
pub trait TransactionSource: Send + Sync {
    /// Fetch `page_number` of `wallet_id`'s history. `None` lets the server
    /// pick its default page.
    fn fetch_page(
        &self,
        wallet_id: &str,
        page_number: Option<u32>,
    ) -> impl Future<Output = Result<TransactionPage, WalletError>> + Send;
}

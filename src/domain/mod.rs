//! Domain types for walletview.
//!
//! # Module Organization
//!
//! - [`error`] - Error type shared by the client and the store
//! - [`transaction`] - Transactions, identifiers and timestamp parsing
//! - [`page`] - Paged responses, summaries and per-wallet records
//! - [`wallet`] - Wallets and their bank accounts
//! - [`grouping`] - Day-bucketed grouping of history

// ============================================================================
// Module Declarations
// ============================================================================

pub mod error;
pub mod grouping;
pub mod page;
pub mod transaction;
pub mod wallet;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::WalletError;

#[allow(unused_imports)] // AccountRef and parse_timestamp are used by tests
pub use transaction::{
    AccountRef, CreditDebitIndicator, Money, Transaction, TxnId, parse_timestamp,
};

pub use page::{Paging, TransactionPage, TransactionSummary, WalletTransaction};

pub use wallet::{BankAccount, Wallet, find_wallet};

pub use grouping::{GroupedTransactions, TransactionSection, group_transactions};

//! State management for walletview.
//!
//! - [`TransactionStore`] - per-wallet transaction cache with loading,
//!   refreshing and error state
//! - [`AppConfig`] - persistent configuration with load/save capabilities
//!
//! The store is an explicit object: build it with a transaction source and
//! share it by `Arc` with whatever needs to read it.
//!
//! # Example
//!
//! ```ignore
//! use crate::state::{AppConfig, TransactionStore};
//!
//! let config = AppConfig::load();
//! let store = Arc::new(TransactionStore::new(WalletClient::from_config(&config)?));
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod transactions;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::AppConfig;
pub use transactions::TransactionStore;

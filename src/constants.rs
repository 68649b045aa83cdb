//! Application constants for walletview.
//!
//! Paging defaults, date formats and HTTP settings shared by the client,
//! the store and the text renderer.

use std::time::Duration;

// ============================================================================
// Paging Constants
// ============================================================================

/// Number of transactions requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page number used by refreshes and first loads.
pub const FIRST_PAGE: u32 = 1;

// ============================================================================
// Formatting Constants
// ============================================================================

/// `chrono` format for history section headers, e.g. `05 Jan 2024`.
pub const SECTION_DATE_FORMAT: &str = "%d %b %Y";

/// Message shown when a wallet has no transactions.
pub const EMPTY_HISTORY_MESSAGE: &str = "No transactions yet";

/// Placeholder for summary values that are not loaded.
pub const MISSING_VALUE: &str = "-";

// ============================================================================
// HTTP Constants
// ============================================================================

/// Default timeout for wallet API requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Idle connection lifetime for the pooled HTTP client.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the transactions endpoint relative to the API base URL.
pub const TRANSACTIONS_PATH: &str = "/transactions";

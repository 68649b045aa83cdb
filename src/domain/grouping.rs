//! Day-bucketed grouping of transaction history.
//!
//! History is shown newest first, one section per calendar day. Inside a
//! day, rows are ordered by transaction id, highest first, regardless of
//! their time of day.

use serde::Serialize;

use super::Transaction;

/// One day of history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSection {
    /// Date label, e.g. `05 Jan 2024`.
    pub section: String,
    pub data: Vec<Transaction>,
}

/// Sections in display order.
pub type GroupedTransactions = Vec<TransactionSection>;

/// Group transactions into day sections.
///
/// Transactions are stably sorted by timestamp (newest first) and bucketed
/// by their calendar date. Sections keep the order in which their date first
/// appears, and each section is then stably sorted by id, descending.
#[must_use]
pub fn group_transactions(transactions: &[Transaction]) -> GroupedTransactions {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.txn_date_time.cmp(&a.txn_date_time));

    let mut sections: GroupedTransactions = Vec::new();
    for txn in sorted {
        let label = txn.section_label();
        match sections.iter_mut().find(|s| s.section == label) {
            Some(section) => section.data.push(txn.clone()),
            None => sections.push(TransactionSection {
                section: label,
                data: vec![txn.clone()],
            }),
        }
    }

    for section in &mut sections {
        section.data.sort_by(|a, b| b.txn_id.cmp(&a.txn_id));
    }

    sections
}

// ============================================================================
// Tests
// ============================================================================

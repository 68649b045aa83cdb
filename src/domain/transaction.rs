//! Transaction types for wallet history.
//!
//! A [`Transaction`] is a single monetary movement against a wallet. The
//! wire format is camelCase JSON as served by the wallet API; identifiers
//! may arrive either as numbers or strings, and timestamps may or may not
//! carry an offset.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::SECTION_DATE_FORMAT;
use crate::domain::WalletError;

// ============================================================================
// Timestamp Parsing
// ============================================================================

/// Offset-less layouts accepted for `txnDateTime`, read as wall-clock time.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a transaction timestamp.
///
/// RFC 3339 values keep their own offset. Values without an offset are taken
/// as written and pinned to a zero offset, so the calendar date never shifts.
///
/// # Errors
///
/// Returns `WalletError::Parse` if none of the accepted layouts match.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, WalletError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed);
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| WalletError::parse(format!("unrecognised timestamp '{raw}'")))
}

mod txn_timestamp {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Transaction Identifier
// ============================================================================

/// Transaction identifier as delivered by the API.
///
/// Numeric ids compare numerically and textual ids lexically. A numeric id
/// always sorts below a textual one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TxnId {
    /// Id sent as a JSON number.
    Numeric(u64),
    /// Id sent as a JSON string.
    Text(String),
}

impl Ord for TxnId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Numeric(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for TxnId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for TxnId {
    fn from(id: u64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for TxnId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

// ============================================================================
// Supporting Types
// ============================================================================

/// Direction of a transaction relative to the wallet it was fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditDebitIndicator {
    /// Money coming in.
    Credit,
    /// Money going out.
    Debit,
}

impl CreditDebitIndicator {
    /// Sign prefix used when displaying an amount.
    #[must_use]
    pub const fn sign(&self) -> char {
        match self {
            Self::Credit => '+',
            Self::Debit => '-',
        }
    }
}

/// A monetary value with its currency code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: f64,
    pub currency: String,
}

/// One side of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub wallet_id: String,
}

// ============================================================================
// Transaction
// ============================================================================

/// A single transaction as returned by the wallet API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub txn_id: TxnId,
    #[serde(default)]
    pub description: String,
    pub amount: Money,
    #[serde(with = "txn_timestamp")]
    pub txn_date_time: DateTime<FixedOffset>,
    pub credit_debit_indicator: CreditDebitIndicator,
    #[serde(default)]
    pub source_account: AccountRef,
    #[serde(default)]
    pub destination_account: AccountRef,
}

impl Transaction {
    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.credit_debit_indicator == CreditDebitIndicator::Credit
    }

    /// Calendar date label of this transaction, in its own offset.
    #[must_use]
    pub fn section_label(&self) -> String {
        self.txn_date_time.format(SECTION_DATE_FORMAT).to_string()
    }

    /// The wallet on the far side of this transaction when it is listed
    /// under an aggregated wallet: the destination of a credit, the source
    /// of a debit.
    #[must_use]
    pub fn counterparty_wallet_id(&self) -> &str {
        match self.credit_debit_indicator {
            CreditDebitIndicator::Credit => &self.destination_account.wallet_id,
            CreditDebitIndicator::Debit => &self.source_account.wallet_id,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

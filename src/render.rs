//! Plain-text rendering of wallet history.
//!
//! Formatting helpers for money and transaction rows, plus the text
//! layouts printed by the command-line front end.

use std::fmt::Write as _;

use crate::constants::{EMPTY_HISTORY_MESSAGE, MISSING_VALUE};
use crate::domain::{Transaction, TransactionSection, TransactionSummary, Wallet, find_wallet};

/// Width of the description column in history rows.
const DESCRIPTION_WIDTH: usize = 28;

/// Width of the right-aligned amount column in history rows.
const AMOUNT_WIDTH: usize = 16;

// ============================================================================
// Money Formatting
// ============================================================================

/// Format a number with commas for thousands separators.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_with_commas(1000), "1,000");
/// assert_eq!(format_with_commas(1_000_000), "1,000,000");
/// ```
#[must_use]
pub fn format_with_commas(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format an amount with two decimals and its currency code.
///
/// Non-finite values render as `-`. Magnitudes beyond `u64::MAX` cents
/// saturate.
///
/// ```ignore
/// assert_eq!(format_money(1234.5, "USD"), "1,234.50 USD");
/// ```
#[must_use]
pub fn format_money(value: f64, currency: &str) -> String {
    if !value.is_finite() {
        return format!("{MISSING_VALUE} {currency}");
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}{}.{:02} {currency}",
        format_with_commas(cents / 100),
        cents % 100
    )
}

/// Transaction amount prefixed with `+` for credits and `-` for debits.
#[must_use]
pub fn signed_amount(txn: &Transaction) -> String {
    format!(
        "{}{}",
        txn.credit_debit_indicator.sign(),
        format_money(txn.amount.amount.abs(), &txn.amount.currency)
    )
}

// ============================================================================
// Wallet Labels
// ============================================================================

/// `Name (branch account)`, or just the name when there is no bank account.
#[must_use]
pub fn wallet_label(wallet: &Wallet) -> String {
    match &wallet.bank_account {
        Some(account) => match &account.bank_branch_id {
            Some(branch) => format!(
                "{} ({branch} {})",
                wallet.wallet_name, account.account_number
            ),
            None => format!("{} ({})", wallet.wallet_name, account.account_number),
        },
        None => wallet.wallet_name.clone(),
    }
}

/// The wallet a row belongs to when history is shown for an aggregated
/// wallet. Plain wallets have no target.
#[must_use]
pub fn target_wallet<'a>(
    txn: &Transaction,
    wallets: &'a [Wallet],
    is_aggregated: bool,
) -> Option<&'a Wallet> {
    if !is_aggregated {
        return None;
    }
    find_wallet(wallets, txn.counterparty_wallet_id())
}

// ============================================================================
// Layouts
// ============================================================================

/// Render grouped history, one block per day.
#[must_use]
pub fn render_history(
    sections: &[TransactionSection],
    wallets: &[Wallet],
    is_aggregated: bool,
) -> String {
    if sections.is_empty() {
        return format!("{EMPTY_HISTORY_MESSAGE}\n");
    }

    let mut out = String::new();
    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", section.section);
        for txn in &section.data {
            let _ = writeln!(
                out,
                "  {:<DESCRIPTION_WIDTH$}{:>AMOUNT_WIDTH$}",
                txn.description,
                signed_amount(txn)
            );
            if let Some(wallet) = target_wallet(txn, wallets, is_aggregated) {
                let _ = writeln!(out, "    {}", wallet_label(wallet));
            }
        }
    }
    out
}

/// Render money in/out totals; `-` when no summary is loaded.
#[must_use]
pub fn render_summary(summary: Option<&TransactionSummary>, currency: &str) -> String {
    let (money_in, money_out) = match summary {
        Some(summary) => (
            format_money(summary.total_money_in, currency),
            format_money(summary.total_money_out, currency),
        ),
        None => (MISSING_VALUE.to_string(), MISSING_VALUE.to_string()),
    };
    format!("Money in:  {money_in}\nMoney out: {money_out}\n")
}

/// Render a wallet's balance card with its summary.
#[must_use]
pub fn render_wallet_card(wallet: &Wallet, summary: Option<&TransactionSummary>) -> String {
    format!(
        "{}\nBalance:   {}\n{}",
        wallet_label(wallet),
        format_money(wallet.current_balance, &wallet.currency_code),
        render_summary(summary, &wallet.currency_code)
    )
}

// ============================================================================
// Tests
// ============================================================================

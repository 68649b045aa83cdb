//! Shared test utilities and Mother pattern factories.
//!
//! Use these helpers instead of hand-building transactions, pages and
//! wallets in every test. [`MockSource`] is a scripted
//! [`TransactionSource`] for store tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::client::TransactionSource;
use crate::constants::DEFAULT_PAGE_SIZE;
use crate::domain::{
    AccountRef, BankAccount, CreditDebitIndicator, Money, Paging, Transaction, TransactionPage,
    TransactionSummary, TxnId, Wallet, WalletError, parse_timestamp,
};

// ============================================================================
// Mother Pattern Factories
// ============================================================================

pub struct TransactionMother;

impl TransactionMother {
    #[must_use]
    pub fn debit(id: &str, timestamp: &str) -> Transaction {
        Transaction {
            txn_id: TxnId::from(id),
            description: format!("Payment {id}"),
            amount: Money {
                amount: 10.0,
                currency: "USD".to_string(),
            },
            txn_date_time: parse_timestamp(timestamp).unwrap(),
            credit_debit_indicator: CreditDebitIndicator::Debit,
            source_account: AccountRef {
                wallet_id: "wallet-a".to_string(),
            },
            destination_account: AccountRef {
                wallet_id: "merchant".to_string(),
            },
        }
    }

    #[must_use]
    pub fn credit(id: &str, timestamp: &str) -> Transaction {
        Transaction {
            description: format!("Deposit {id}"),
            credit_debit_indicator: CreditDebitIndicator::Credit,
            source_account: AccountRef {
                wallet_id: "employer".to_string(),
            },
            destination_account: AccountRef {
                wallet_id: "wallet-a".to_string(),
            },
            ..Self::debit(id, timestamp)
        }
    }

    #[must_use]
    pub fn with_amount(mut txn: Transaction, amount: f64, currency: &str) -> Transaction {
        txn.amount = Money {
            amount,
            currency: currency.to_string(),
        };
        txn
    }
}

pub struct PageMother;

impl PageMother {
    /// A page whose summary is computed from its own transactions.
    #[must_use]
    pub fn page(page_number: u32, total_records: u64, data: Vec<Transaction>) -> TransactionPage {
        let summary = data.iter().fold(TransactionSummary::default(), |mut acc, txn| {
            if txn.is_credit() {
                acc.total_money_in += txn.amount.amount;
            } else {
                acc.total_money_out += txn.amount.amount;
            }
            acc
        });

        TransactionPage {
            data,
            paging: Paging {
                page_number,
                page_size: DEFAULT_PAGE_SIZE,
                total_records,
            },
            summary,
        }
    }
}

pub struct WalletMother;

impl WalletMother {
    #[must_use]
    pub fn with_id(wallet_id: &str) -> Wallet {
        Wallet {
            wallet_id: wallet_id.to_string(),
            wallet_name: "Everyday".to_string(),
            currency_code: "USD".to_string(),
            current_balance: 1_250.5,
            is_aggregated: false,
            bank_account: Some(BankAccount {
                account_number: "12345678".to_string(),
                bank_branch_id: Some("062-000".to_string()),
            }),
        }
    }

    #[must_use]
    pub fn named(wallet_id: &str, name: &str) -> Wallet {
        Wallet {
            wallet_name: name.to_string(),
            ..Self::with_id(wallet_id)
        }
    }

    #[must_use]
    pub fn aggregated(wallet_id: &str) -> Wallet {
        Wallet {
            wallet_name: "All accounts".to_string(),
            is_aggregated: true,
            bank_account: None,
            ..Self::with_id(wallet_id)
        }
    }
}

// ============================================================================
// Scripted Transaction Source
// ============================================================================

enum Scripted {
    Page(TransactionPage),
    Fail(u16),
    Gated(oneshot::Receiver<()>, TransactionPage),
}

/// Answers `fetch_page` calls from a script, in order, and records every
/// call it receives. An exhausted script answers `ClientNotRegistered`.
#[derive(Default)]
pub struct MockSource {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<(String, Option<u32>)>>,
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

impl MockSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn respond(self, page: TransactionPage) -> Self {
        self.push(Scripted::Page(page))
    }

    #[must_use]
    pub fn fail(self, status: u16) -> Self {
        self.push(Scripted::Fail(status))
    }

    /// Script a page that is only delivered once the returned sender fires.
    #[must_use]
    pub fn gated(self, page: TransactionPage) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        (self.push(Scripted::Gated(rx, page)), tx)
    }

    fn push(self, step: Scripted) -> Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<(String, Option<u32>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TransactionSource for MockSource {
    async fn fetch_page(
        &self,
        wallet_id: &str,
        page_number: Option<u32>,
    ) -> Result<TransactionPage, WalletError> {
        self.calls
            .lock()
            .unwrap()
            .push((wallet_id.to_string(), page_number));
        let step = self.script.lock().unwrap().pop_front();

        match step {
            Some(Scripted::Page(page)) => Ok(page),
            Some(Scripted::Fail(status)) => Err(WalletError::status(status, "mock://transactions")),
            Some(Scripted::Gated(gate, page)) => {
                let _ = gate.await;
                Ok(page)
            }
            None => Err(WalletError::ClientNotRegistered),
        }
    }
}

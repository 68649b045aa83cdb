//! Per-wallet transaction cache.
//!
//! [`TransactionStore`] owns every page fetched so far, keyed by wallet id,
//! along with the loading/refreshing flags and the last error the
//! presentation layer polls.
//!
//! # Design
//!
//! Fetches are fire-and-forget: errors are logged and kept as the store's
//! last error, never returned. Requests for the same wallet are serialized
//! so pages land in call order; different wallets load concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, RwLock};

use crate::client::TransactionSource;
use crate::constants::FIRST_PAGE;
use crate::domain::{
    GroupedTransactions, Paging, TransactionPage, TransactionSummary, WalletError,
    WalletTransaction, group_transactions,
};

// ============================================================================
// Internal State
// ============================================================================

/// What a queued request should do once it holds its wallet's lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    /// Fetch a page and append it.
    Page(Option<u32>),
    /// Fetch the first page and replace the record.
    Refresh,
    /// Fetch the first page only if nothing is stored yet.
    IfMissing,
    /// Fetch the page after the stored one, if any remain.
    NextPage,
}

impl Request {
    const fn is_refresh(self) -> bool {
        matches!(self, Self::Refresh)
    }
}

/// Keeps a pending-request counter raised for as long as it lives, so a
/// request dropped mid-flight still lowers it.
struct Pending<'a>(&'a AtomicUsize);

impl<'a> Pending<'a> {
    fn begin(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct StoreState {
    records: Vec<WalletTransaction>,
    error: Option<Arc<WalletError>>,
}

impl StoreState {
    fn record(&self, wallet_id: &str) -> Option<&WalletTransaction> {
        self.records.iter().find(|r| r.wallet_id == wallet_id)
    }

    /// Page to request, or `None` when the request has nothing to do.
    fn resolve_page(&self, wallet_id: &str, request: Request) -> Option<Option<u32>> {
        match request {
            Request::Page(page) => Some(page),
            Request::Refresh => Some(Some(FIRST_PAGE)),
            Request::IfMissing => match self.record(wallet_id) {
                Some(_) => None,
                None => Some(Some(FIRST_PAGE)),
            },
            Request::NextPage => self
                .record(wallet_id)
                .and_then(|r| r.paging.next_page())
                .map(Some),
        }
    }

    fn merge(&mut self, wallet_id: &str, page: TransactionPage, request: Request) {
        match self.records.iter_mut().find(|r| r.wallet_id == wallet_id) {
            Some(record) if request.is_refresh() => record.replace_with(page),
            Some(record) => record.append_page(page),
            None => self
                .records
                .push(WalletTransaction::from_page(wallet_id, page)),
        }
    }
}

/// A wallet id counts as given only when non-empty.
fn given(wallet_id: Option<&str>) -> Option<&str> {
    wallet_id.filter(|id| !id.is_empty())
}

// ============================================================================
// Transaction Store
// ============================================================================

/// Cache of paginated transactions per wallet.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(TransactionStore::new(WalletClient::from_config(&config)?));
///
/// store.fetch_transactions(Some("w-1"), Some(1)).await;
/// if let Some(err) = store.transaction_error().await {
///     eprintln!("{err}");
///     store.clear_transaction_error().await;
/// }
/// for section in store.group_transactions(Some("w-1")).await {
///     println!("{}", section.section);
/// }
/// ```
#[derive(Debug)]
pub struct TransactionStore<S> {
    source: S,
    state: RwLock<StoreState>,
    pending_loads: AtomicUsize,
    pending_refreshes: AtomicUsize,
    wallet_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: TransactionSource> TransactionStore<S> {
    /// Creates an empty store that fetches through `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: RwLock::new(StoreState::default()),
            pending_loads: AtomicUsize::new(0),
            pending_refreshes: AtomicUsize::new(0),
            wallet_locks: Mutex::new(HashMap::new()),
        }
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Fetches a page for `wallet_id` and appends it to the wallet's record,
    /// creating the record on first use. Does nothing without a wallet id.
    ///
    /// Failures are stored as the last error; data fetched earlier is kept.
    pub async fn fetch_transactions(&self, wallet_id: Option<&str>, page_number: Option<u32>) {
        if let Some(wallet_id) = given(wallet_id) {
            self.load(wallet_id, Request::Page(page_number)).await;
        }
    }

    /// Fetches the first page for `wallet_id` and replaces whatever was
    /// stored. Tracked by the refreshing flag instead of the loading flag.
    pub async fn refresh_transactions(&self, wallet_id: Option<&str>) {
        if let Some(wallet_id) = given(wallet_id) {
            self.load(wallet_id, Request::Refresh).await;
        }
    }

    /// Fetches the page after the last stored one.
    ///
    /// Returns `false` without a request when the wallet was never fetched
    /// or its paging says there is nothing more.
    pub async fn fetch_next_page(&self, wallet_id: Option<&str>) -> bool {
        match given(wallet_id) {
            Some(wallet_id) => self.load(wallet_id, Request::NextPage).await,
            None => false,
        }
    }

    /// Fetches the first page only if the wallet has no record yet.
    ///
    /// Returns whether a request was made.
    pub async fn ensure_transactions(&self, wallet_id: Option<&str>) -> bool {
        match given(wallet_id) {
            Some(wallet_id) => self.load(wallet_id, Request::IfMissing).await,
            None => false,
        }
    }

    async fn wallet_lock(&self, wallet_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.wallet_locks.lock().await;
        Arc::clone(locks.entry(wallet_id.to_string()).or_default())
    }

    /// Drops the wallet's lock entry once no other request holds or waits
    /// on it.
    async fn release_wallet_lock(&self, wallet_id: &str, wallet_lock: Arc<Mutex<()>>) {
        let mut locks = self.wallet_locks.lock().await;
        drop(wallet_lock);
        if locks
            .get(wallet_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(wallet_id);
        }
    }

    async fn load(&self, wallet_id: &str, request: Request) -> bool {
        let _pending = Pending::begin(if request.is_refresh() {
            &self.pending_refreshes
        } else {
            &self.pending_loads
        });

        let wallet_lock = self.wallet_lock(wallet_id).await;
        let requested = {
            let _serialized = wallet_lock.lock().await;
            self.load_serialized(wallet_id, request).await
        };
        self.release_wallet_lock(wallet_id, wallet_lock).await;
        requested
    }

    async fn load_serialized(&self, wallet_id: &str, request: Request) -> bool {
        let page_number = self.state.read().await.resolve_page(wallet_id, request);
        let Some(page_number) = page_number else {
            return false;
        };

        tracing::debug!(
            "Requesting transactions for wallet {wallet_id} ({request:?}, page {page_number:?})"
        );
        let result = self.source.fetch_page(wallet_id, page_number).await;

        let mut state = self.state.write().await;
        match result {
            Ok(page) => state.merge(wallet_id, page, request),
            Err(err) => {
                tracing::warn!("Transaction request for wallet {wallet_id} failed: {err}");
                state.error = Some(Arc::new(err));
            }
        }
        true
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Paging of the last page stored for `wallet_id`.
    pub async fn transaction_paging(&self, wallet_id: Option<&str>) -> Option<Paging> {
        let wallet_id = given(wallet_id)?;
        self.state.read().await.record(wallet_id).map(|r| r.paging)
    }

    /// Latest money in/out summary for `wallet_id`.
    pub async fn transaction_summary(&self, wallet_id: Option<&str>) -> Option<TransactionSummary> {
        let wallet_id = given(wallet_id)?;
        self.state.read().await.record(wallet_id).map(|r| r.summary)
    }

    /// Stored transactions of `wallet_id` grouped into day sections, or an
    /// empty list when nothing is stored.
    pub async fn group_transactions(&self, wallet_id: Option<&str>) -> GroupedTransactions {
        let Some(wallet_id) = given(wallet_id) else {
            return Vec::new();
        };
        self.state
            .read()
            .await
            .record(wallet_id)
            .map(|r| group_transactions(&r.data))
            .unwrap_or_default()
    }

    /// Snapshot of every wallet record, in the order they were first fetched.
    pub async fn wallet_transactions(&self) -> Vec<WalletTransaction> {
        self.state.read().await.records.clone()
    }

    /// `true` while any fetch is queued or in flight.
    #[allow(dead_code)]
    pub fn is_loading(&self) -> bool {
        self.pending_loads.load(Ordering::SeqCst) > 0
    }

    /// `true` while any refresh is queued or in flight.
    #[allow(dead_code)]
    pub fn is_refreshing(&self) -> bool {
        self.pending_refreshes.load(Ordering::SeqCst) > 0
    }

    /// The last failure, until it is cleared.
    pub async fn transaction_error(&self) -> Option<Arc<WalletError>> {
        self.state.read().await.error.clone()
    }

    // ========================================================================
    // Clearing
    // ========================================================================

    /// Dismisses the last failure.
    pub async fn clear_transaction_error(&self) {
        self.state.write().await.error = None;
    }

    /// Drops every wallet record. Flags and the last error are left alone.
    #[allow(dead_code)]
    pub async fn clear_transactions(&self) {
        self.state.write().await.records.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockSource, PageMother, TransactionMother};
    use std::time::Duration;

    fn page_one() -> TransactionPage {
        PageMother::page(
            1,
            15,
            vec![
                TransactionMother::debit("3", "2024-01-05T10:00"),
                TransactionMother::credit("1", "2024-01-05T09:00"),
            ],
        )
    }

    fn page_two() -> TransactionPage {
        PageMother::page(2, 15, vec![TransactionMother::debit("2", "2024-01-04T23:00")])
    }

    async fn wait_for_calls(source: &MockSource, count: usize) {
        while source.calls().len() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_unknown_wallet_lookups_are_empty() {
        let store = TransactionStore::new(MockSource::new());

        assert!(store.transaction_paging(Some("w-1")).await.is_none());
        assert!(store.transaction_summary(Some("w-1")).await.is_none());
        assert!(store.group_transactions(Some("w-1")).await.is_empty());
        assert!(store.transaction_paging(None).await.is_none());
        assert!(store.group_transactions(Some("")).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_wallet_id_is_a_no_op() {
        let store = TransactionStore::new(MockSource::new().respond(page_one()));

        store.fetch_transactions(None, Some(1)).await;
        store.fetch_transactions(Some(""), Some(1)).await;
        store.refresh_transactions(None).await;

        assert!(store.source.calls().is_empty());
        assert!(!store.is_loading());
        assert!(store.wallet_transactions().await.is_empty());
    }

    #[tokio::test]
    async fn test_first_fetch_creates_record() {
        let store = TransactionStore::new(MockSource::new().respond(page_one()));

        store.fetch_transactions(Some("w-1"), Some(1)).await;

        let records = store.wallet_transactions().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].wallet_id, "w-1");
        assert_eq!(records[0].data, page_one().data);
        assert_eq!(store.transaction_paging(Some("w-1")).await, Some(page_one().paging));
        assert_eq!(store.transaction_summary(Some("w-1")).await, Some(page_one().summary));
        assert!(!store.is_loading());
        assert_eq!(store.source.calls(), vec![("w-1".to_string(), Some(1))]);
    }

    #[tokio::test]
    async fn test_second_page_is_appended() {
        let store =
            TransactionStore::new(MockSource::new().respond(page_one()).respond(page_two()));

        store.fetch_transactions(Some("w-1"), Some(1)).await;
        store.fetch_transactions(Some("w-1"), Some(2)).await;

        let records = store.wallet_transactions().await;
        let mut expected = page_one().data;
        expected.extend(page_two().data);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data, expected);
        assert_eq!(records[0].paging, page_two().paging);
        assert_eq!(records[0].summary, page_two().summary);
    }

    #[tokio::test]
    async fn test_refresh_replaces_record() {
        let fresh = PageMother::page(1, 1, vec![TransactionMother::credit("9", "2024-01-06T08:00")]);
        let store = TransactionStore::new(
            MockSource::new()
                .respond(page_one())
                .respond(page_two())
                .respond(fresh.clone()),
        );

        store.fetch_transactions(Some("w-1"), Some(1)).await;
        store.fetch_transactions(Some("w-1"), Some(2)).await;
        store.refresh_transactions(Some("w-1")).await;

        let records = store.wallet_transactions().await;
        assert_eq!(records[0].data, fresh.data);
        assert_eq!(records[0].paging, fresh.paging);
        assert_eq!(records[0].summary, fresh.summary);
        assert_eq!(store.source.calls()[2], ("w-1".to_string(), Some(FIRST_PAGE)));
        assert!(!store.is_refreshing());
    }

    #[tokio::test]
    async fn test_refresh_creates_missing_record() {
        let store = TransactionStore::new(MockSource::new().respond(page_one()));

        store.refresh_transactions(Some("w-2")).await;

        assert_eq!(store.wallet_transactions().await[0].wallet_id, "w-2");
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_data_and_records_error() {
        let store = TransactionStore::new(
            MockSource::new()
                .respond(page_one())
                .fail(503),
        );

        store.fetch_transactions(Some("w-1"), Some(1)).await;
        store.fetch_transactions(Some("w-1"), Some(2)).await;

        assert_eq!(store.wallet_transactions().await[0].data, page_one().data);
        assert!(!store.is_loading());
        let err = store.transaction_error().await.unwrap();
        assert!(matches!(*err, WalletError::Status { status: 503, .. }));

        store.clear_transaction_error().await;
        assert!(store.transaction_error().await.is_none());
        assert_eq!(store.wallet_transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_resets_refreshing_flag() {
        let store = TransactionStore::new(MockSource::new().fail(500));

        store.refresh_transactions(Some("w-1")).await;

        assert!(!store.is_refreshing());
        assert!(store.transaction_error().await.is_some());
        assert!(store.wallet_transactions().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_transactions_empties_every_wallet() {
        let store = TransactionStore::new(
            MockSource::new()
                .respond(page_one())
                .respond(page_two())
                .fail(500),
        );
        store.fetch_transactions(Some("w-1"), Some(1)).await;
        store.fetch_transactions(Some("w-2"), Some(1)).await;
        store.fetch_transactions(Some("w-3"), Some(1)).await;

        store.clear_transactions().await;

        for wallet in ["w-1", "w-2"] {
            assert!(store.transaction_paging(Some(wallet)).await.is_none());
            assert!(store.transaction_summary(Some(wallet)).await.is_none());
            assert!(store.group_transactions(Some(wallet)).await.is_empty());
        }
        // The error is not part of the wallet records.
        assert!(store.transaction_error().await.is_some());
    }

    #[tokio::test]
    async fn test_group_transactions_uses_stored_data() {
        let store =
            TransactionStore::new(MockSource::new().respond(page_one()).respond(page_two()));
        store.fetch_transactions(Some("w-1"), Some(1)).await;
        store.fetch_transactions(Some("w-1"), Some(2)).await;

        let grouped = store.group_transactions(Some("w-1")).await;

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].section, "05 Jan 2024");
        assert_eq!(grouped[1].section, "04 Jan 2024");
        assert_eq!(grouped, store.group_transactions(Some("w-1")).await);
    }

    #[tokio::test]
    async fn test_wallet_ids_match_exactly() {
        let store = TransactionStore::new(MockSource::new().respond(page_one()));
        store.fetch_transactions(Some("ab-12"), Some(1)).await;

        assert!(store.transaction_paging(Some("AB-12")).await.is_none());
        assert!(store.transaction_paging(Some("ab12")).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_next_page_follows_paging() {
        let store =
            TransactionStore::new(MockSource::new().respond(page_one()).respond(page_two()));

        assert!(!store.fetch_next_page(Some("w-1")).await);

        store.fetch_transactions(Some("w-1"), Some(1)).await;
        assert!(store.fetch_next_page(Some("w-1")).await);
        assert!(!store.fetch_next_page(Some("w-1")).await);

        assert_eq!(
            store.source.calls(),
            vec![("w-1".to_string(), Some(1)), ("w-1".to_string(), Some(2))]
        );
        assert_eq!(store.wallet_transactions().await[0].data.len(), 3);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_ensure_transactions_fetches_once() {
        let store = TransactionStore::new(MockSource::new().respond(page_one()));

        assert!(store.ensure_transactions(Some("w-1")).await);
        assert!(!store.ensure_transactions(Some("w-1")).await);
        assert!(!store.ensure_transactions(None).await);

        assert_eq!(store.source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_same_wallet_requests_apply_in_call_order() {
        let (source, release_first) = MockSource::new().gated(page_one());
        let store = Arc::new(TransactionStore::new(source.respond(page_two())));

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.fetch_transactions(Some("w-1"), Some(1)).await })
        };
        wait_for_calls(&store.source, 1).await;

        let second = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.fetch_transactions(Some("w-1"), Some(2)).await })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // The second request waits behind the first.
        assert_eq!(store.source.calls().len(), 1);
        assert!(store.is_loading());

        release_first.send(()).unwrap();
        first.await.unwrap();
        second.await.unwrap();

        let mut expected = page_one().data;
        expected.extend(page_two().data);
        assert_eq!(store.wallet_transactions().await[0].data, expected);
        assert_eq!(store.transaction_paging(Some("w-1")).await, Some(page_two().paging));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_other_wallets_are_not_blocked() {
        let (source, release_first) = MockSource::new().gated(page_one());
        let store = Arc::new(TransactionStore::new(source.respond(page_two())));

        let slow = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.fetch_transactions(Some("w-1"), Some(1)).await })
        };
        wait_for_calls(&store.source, 1).await;

        store.fetch_transactions(Some("w-2"), Some(1)).await;
        assert_eq!(store.wallet_transactions().await[0].wallet_id, "w-2");
        assert!(store.is_loading());

        release_first.send(()).unwrap();
        slow.await.unwrap();

        let wallets: Vec<_> = store
            .wallet_transactions()
            .await
            .into_iter()
            .map(|r| r.wallet_id)
            .collect();
        assert_eq!(wallets, vec!["w-2", "w-1"]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_dropped_fetch_lowers_loading_flag() {
        let (source, _release) = MockSource::new().gated(page_one());
        let store = TransactionStore::new(source.respond(page_two()));

        let timed_out = tokio::time::timeout(
            Duration::from_millis(20),
            store.fetch_transactions(Some("w-1"), Some(1)),
        )
        .await;

        assert!(timed_out.is_err());
        assert!(!store.is_loading());
        assert!(store.wallet_transactions().await.is_empty());

        // The wallet is not left locked either.
        store.fetch_transactions(Some("w-1"), Some(2)).await;
        assert_eq!(store.wallet_transactions().await[0].data, page_two().data);
    }

    #[tokio::test]
    async fn test_dropped_refresh_lowers_refreshing_flag() {
        let (source, _release) = MockSource::new().gated(page_one());
        let store = TransactionStore::new(source);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), store.refresh_transactions(Some("w-1")))
                .await;

        assert!(timed_out.is_err());
        assert!(!store.is_refreshing());
    }

    #[tokio::test]
    async fn test_refresh_queued_behind_older_page_wins() {
        let fresh = PageMother::page(1, 1, vec![TransactionMother::credit("9", "2024-01-06T08:00")]);
        let (source, release_older) = MockSource::new().gated(page_two());
        let store = Arc::new(TransactionStore::new(source.respond(fresh.clone())));

        let older = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.fetch_transactions(Some("w-1"), Some(2)).await })
        };
        wait_for_calls(&store.source, 1).await;

        let refresh = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.refresh_transactions(Some("w-1")).await })
        };
        while !store.is_refreshing() {
            tokio::task::yield_now().await;
        }
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // The refresh waits behind the older page.
        assert_eq!(store.source.calls().len(), 1);
        assert!(store.is_refreshing());

        release_older.send(()).unwrap();
        older.await.unwrap();
        refresh.await.unwrap();

        let records = store.wallet_transactions().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data, fresh.data);
        assert_eq!(records[0].paging, fresh.paging);
        assert_eq!(records[0].summary, fresh.summary);
        assert!(!store.is_refreshing());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_wallet_lock_is_dropped_when_idle() {
        let (source, release_first) = MockSource::new().gated(page_one());
        let store = Arc::new(TransactionStore::new(source));

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.fetch_transactions(Some("w-1"), Some(1)).await })
        };
        wait_for_calls(&store.source, 1).await;
        assert!(store.wallet_locks.lock().await.contains_key("w-1"));

        release_first.send(()).unwrap();
        first.await.unwrap();
        assert!(store.wallet_locks.lock().await.is_empty());

        // A request with nothing to do releases its entry too.
        assert!(!store.ensure_transactions(Some("w-1")).await);
        assert!(store.wallet_locks.lock().await.is_empty());
    }
}

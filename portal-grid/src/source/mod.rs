//! The caller's side of the grid: fetching pages of records.
//!
//! The grid performs no I/O. A screen pairs it with a [`RecordSource`], turns
//! each [`GridEvent`](crate::GridEvent) into a [`GridQuery`], and feeds the
//! resulting [`RecordPage`] back into the grid. [`FetchSequencer`] drops
//! responses that arrive after a newer request was issued.

mod query;
mod retry;
mod sequence;

pub use query::GridQuery;
pub use retry::RetryConfig;
pub use sequence::{FetchSequencer, Ticket};

use async_trait::async_trait;

use crate::column::GridRecord;
use crate::error::SourceError;

/// One page of records with the total size of the filtered result set.
#[derive(Debug, Clone)]
pub struct RecordPage<T> {
    records: Vec<T>,
    total: usize,
}

impl<T> RecordPage<T> {
    pub fn new(records: Vec<T>, total: usize) -> Self {
        Self { records, total }
    }

    /// Returns a reference to the records in this page.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Consumes the page and returns the records.
    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    /// Total number of records matching the query, across all pages.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A backend that can serve filtered, sorted, paginated records.
#[async_trait]
pub trait RecordSource<T: GridRecord>: Send + Sync {
    /// Fetch the page described by `query`.
    async fn fetch(&self, query: &GridQuery) -> Result<RecordPage<T>, SourceError>;

    /// Delete records by id. Returns how many were removed.
    async fn delete(&self, ids: &[T::Id]) -> Result<usize, SourceError> {
        let _ = ids;
        Err(SourceError::Unsupported("delete"))
    }
}

/// Fetch a page, retrying transient failures with exponential backoff.
pub async fn fetch_with_retry<T, S>(
    source: &S,
    query: &GridQuery,
    retry: &RetryConfig,
) -> Result<RecordPage<T>, SourceError>
where
    T: GridRecord,
    S: RecordSource<T> + ?Sized,
{
    let mut attempt = 0;
    loop {
        match source.fetch(query).await {
            Ok(page) => return Ok(page),
            Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                let delay = err
                    .retry_after()
                    .unwrap_or_else(|| retry.delay_for(attempt));
                log::warn!(
                    "[fetch] attempt {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone)]
    struct Item(u32);

    impl GridRecord for Item {
        type Id = u32;

        fn id(&self) -> u32 {
            self.0
        }
    }

    /// Fails with the queued errors, then succeeds.
    struct Flaky {
        failures: Mutex<Vec<SourceError>>,
        calls: Mutex<u32>,
    }

    impl Flaky {
        fn new(failures: Vec<SourceError>) -> Self {
            Self {
                failures: Mutex::new(failures),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl RecordSource<Item> for Flaky {
        async fn fetch(&self, _query: &GridQuery) -> Result<RecordPage<Item>, SourceError> {
            *self.calls.lock().unwrap() += 1;
            match self.failures.lock().unwrap().pop() {
                Some(err) => Err(err),
                None => Ok(RecordPage::new(vec![Item(1), Item(2)], 2)),
            }
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig::default().initial_delay(Duration::from_millis(10))
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_errors() {
        let source = Flaky::new(vec![
            SourceError::Network("reset".into()),
            SourceError::Server {
                status: 503,
                message: "busy".into(),
            },
        ]);
        let page = fetch_with_retry(&source, &GridQuery::new(1, 20), &fast_retry())
            .await
            .unwrap();
        assert_eq!(page.total(), 2);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_retry_client_errors() {
        let source = Flaky::new(vec![SourceError::Server {
            status: 400,
            message: "bad sort".into(),
        }]);
        let err = fetch_with_retry(&source, &GridQuery::new(1, 20), &fast_retry())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Server { status: 400, .. }));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let source = Flaky::new(vec![SourceError::Network("down".into()); 5]);
        let err = fetch_with_retry(&source, &GridQuery::new(1, 20), &fast_retry().max_retries(2))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Network(_)));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_delete_unsupported_by_default() {
        let source = Flaky::new(vec![]);
        let err = source.delete(&[1]).await.unwrap_err();
        assert_eq!(err, SourceError::Unsupported("delete"));
    }
}

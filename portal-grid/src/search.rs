//! Debounced search input.
//!
//! Keystrokes update the raw text immediately. The settled query trails it by
//! a fixed idle interval and is the only value passed on to the caller, so a
//! burst of typing produces a single fetch.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default idle interval before a query settles.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

type SettledFn = Arc<dyn Fn(String) + Send + Sync>;

/// Snapshot of the search input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    /// What the user has typed so far.
    pub raw: String,
    /// The last query that survived the debounce interval.
    pub settled: String,
}

impl SearchState {
    /// Returns `true` while typed text has not settled yet.
    pub fn is_pending(&self) -> bool {
        self.raw != self.settled
    }
}

#[derive(Default)]
struct DebounceInner {
    state: SearchState,
    /// Bumped on every input and on cancel; a timer only fires if its
    /// generation is still current.
    generation: u64,
    pending: bool,
}

/// Trailing-edge debouncer for a free-text search field.
///
/// Each call to [`on_raw_change`](Self::on_raw_change) restarts the idle timer.
/// When the timer runs out, the last value is stored as settled and passed to
/// the `on_settled` callback. The empty string settles like any other value.
///
/// The timer runs on the current Tokio runtime. Dropping the debouncer
/// cancels a pending emission.
pub struct SearchDebouncer {
    delay: Duration,
    inner: Arc<Mutex<DebounceInner>>,
    timer: Option<CancellationToken>,
    on_settled: SettledFn,
}

impl SearchDebouncer {
    /// Create a debouncer with the given idle interval.
    pub fn new(delay: Duration, on_settled: impl Fn(String) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            inner: Arc::new(Mutex::new(DebounceInner::default())),
            timer: None,
            on_settled: Arc::new(on_settled),
        }
    }

    /// Create a debouncer with [`DEFAULT_DEBOUNCE`].
    pub fn with_default_delay(on_settled: impl Fn(String) + Send + Sync + 'static) -> Self {
        Self::new(DEFAULT_DEBOUNCE, on_settled)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record new raw text and restart the idle timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_raw_change(&mut self, text: impl Into<String>) {
        let text = text.into();
        let generation = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            inner.generation += 1;
            inner.pending = true;
            inner.state.raw = text.clone();
            inner.generation
        };

        if let Some(previous) = self.timer.take() {
            previous.cancel();
        }

        let token = CancellationToken::new();
        self.timer = Some(token.clone());

        let deadline = Instant::now() + self.delay;
        let inner = Arc::clone(&self.inner);
        let on_settled = Arc::clone(&self.on_settled);

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    settle(&inner, generation, text, &on_settled);
                }
            }
        });
    }

    /// Settle the current raw text immediately, skipping the remaining wait.
    ///
    /// Does nothing if no emission is pending.
    pub fn flush(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if !inner.pending {
            return;
        }
        inner.generation += 1;
        inner.pending = false;
        inner.state.settled = inner.state.raw.clone();
        log::debug!("[search] flushed {:?}", inner.state.settled);
        (self.on_settled)(inner.state.settled.clone());
    }

    /// Suppress a pending emission. The raw text is kept.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        if let Ok(mut inner) = self.inner.lock() {
            inner.generation += 1;
            inner.pending = false;
        }
    }

    /// Cancel any pending emission and reset both raw and settled text
    /// without notifying the callback.
    pub fn reset(&mut self) {
        self.cancel();
        if let Ok(mut inner) = self.inner.lock() {
            inner.state = SearchState::default();
        }
    }

    /// Returns `true` if an emission is scheduled.
    pub fn is_pending(&self) -> bool {
        self.inner.lock().map(|g| g.pending).unwrap_or(false)
    }

    pub fn state(&self) -> SearchState {
        self.inner
            .lock()
            .map(|g| g.state.clone())
            .unwrap_or_default()
    }

    pub fn settled(&self) -> String {
        self.inner
            .lock()
            .map(|g| g.state.settled.clone())
            .unwrap_or_default()
    }
}

/// Store `text` as settled and notify, unless a newer input or a cancel
/// has bumped the generation in the meantime.
fn settle(inner: &Mutex<DebounceInner>, generation: u64, text: String, on_settled: &SettledFn) {
    let Ok(mut guard) = inner.lock() else {
        return;
    };
    if guard.generation != generation {
        return;
    }
    guard.pending = false;
    guard.state.settled = text.clone();
    log::debug!("[search] settled on {:?}", text);
    // Emitted under the lock so a concurrent cancel cannot slip in between.
    on_settled(text);
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for SearchDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchDebouncer")
            .field("delay", &self.delay)
            .field("state", &self.state())
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    fn debouncer(delay_ms: u64) -> (SearchDebouncer, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = SearchDebouncer::new(Duration::from_millis(delay_ms), move |text| {
            let _ = tx.send(text);
        });
        (debouncer, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_last_value_once() {
        let (mut search, mut rx) = debouncer(500);

        search.on_raw_change("a");
        sleep(Duration::from_millis(50)).await;
        search.on_raw_change("ab");
        sleep(Duration::from_millis(50)).await;
        search.on_raw_change("abc");

        sleep(Duration::from_millis(600)).await;

        assert_eq!(rx.try_recv().unwrap(), "abc");
        assert!(rx.try_recv().is_err());
        assert_eq!(search.settled(), "abc");
        assert!(!search.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_settles_before_interval() {
        let (mut search, mut rx) = debouncer(500);

        search.on_raw_change("lab");
        sleep(Duration::from_millis(499)).await;

        assert!(rx.try_recv().is_err());
        assert!(search.state().is_pending());
        assert_eq!(search.state().raw, "lab");
        assert_eq!(search.state().settled, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_string_settles() {
        let (mut search, mut rx) = debouncer(100);

        search.on_raw_change("x");
        sleep(Duration::from_millis(150)).await;
        search.on_raw_change("");
        sleep(Duration::from_millis(150)).await;

        assert_eq!(rx.try_recv().unwrap(), "x");
        assert_eq!(rx.try_recv().unwrap(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_emission() {
        let (mut search, mut rx) = debouncer(100);

        search.on_raw_change("pending");
        search.cancel();
        sleep(Duration::from_millis(500)).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(search.state().raw, "pending");
        assert_eq!(search.settled(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let (mut search, mut rx) = debouncer(100);

        search.on_raw_change("gone");
        drop(search);
        sleep(Duration::from_millis(500)).await;

        // Sender is dropped with the debouncer, and nothing was sent.
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_settles_immediately() {
        let (mut search, mut rx) = debouncer(500);

        search.on_raw_change("cbc");
        search.flush();
        assert_eq!(rx.try_recv().unwrap(), "cbc");

        // The scheduled timer must not fire a second time.
        sleep(Duration::from_millis(600)).await;
        assert!(rx.try_recv().is_err());

        // Flushing with nothing pending is a no-op.
        search.flush();
        assert!(rx.try_recv().is_err());
    }
}

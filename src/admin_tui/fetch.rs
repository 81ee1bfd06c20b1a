//! Data-fetch controller
//!
//! Turns a zero-argument "fetch all" operation into observable state with a
//! manual refresh trigger. Each fetch cycle runs as a spawned task and reports
//! back over a channel; results are applied when the owner polls, so the event
//! loop never waits on the network.

use std::{future::Future, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Collection fetch operation; failures carry a human-readable message
pub type FetchFn<R> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<R>, String>> + Send + Sync>;

/// Wrap an async closure as a [`FetchFn`]
pub fn fetch_fn<R, F, Fut>(f: F) -> FetchFn<R>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<R>, String>> + Send + 'static,
    R: Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Current status of a collection load
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<R> {
    /// Last successfully fetched collection, kept across later failures
    pub data: Option<Vec<R>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<R> Default for FetchState<R> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }
}

/// How results of overlapping fetch cycles are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleOrdering {
    /// Every completed cycle is applied as it arrives; the last one to
    /// complete wins, whichever was issued last.
    #[default]
    Completion,
    /// Only the most recently issued cycle is applied. Results of superseded
    /// cycles are dropped and `loading` stays set until the latest resolves.
    LatestIssued,
}

struct CycleOutcome<R> {
    seq: u64,
    result: Result<Vec<R>, String>,
}

/// Stateful wrapper around one fetch operation, bound for its whole lifetime
pub struct FetchController<R> {
    fetch: FetchFn<R>,
    state: FetchState<R>,
    ordering: CycleOrdering,
    issued: u64,
    in_flight: usize,
    tx: UnboundedSender<CycleOutcome<R>>,
    rx: UnboundedReceiver<CycleOutcome<R>>,
}

impl<R: Send + 'static> FetchController<R> {
    /// Create the controller and start its first fetch cycle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(fetch: FetchFn<R>, ordering: CycleOrdering) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut controller = Self {
            fetch,
            state: FetchState::default(),
            ordering,
            issued: 0,
            in_flight: 0,
            tx,
            rx,
        };
        controller.refetch();
        controller
    }

    /// Start a fresh fetch cycle. Concurrent cycles are not de-duplicated.
    pub fn refetch(&mut self) {
        self.issued += 1;
        self.in_flight += 1;
        self.state.loading = true;
        self.state.error = None;

        let seq = self.issued;
        let tx = self.tx.clone();
        let cycle = (self.fetch)();
        debug!(seq, "Fetch cycle started");

        tokio::spawn(async move {
            let result = cycle.await;
            // The receiver is gone once the owning controller was dropped
            let _ = tx.send(CycleOutcome { seq, result });
        });
    }

    /// Apply every cycle that finished since the last poll
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.rx.try_recv() {
            self.apply(outcome);
            changed = true;
        }
        changed
    }

    /// Wait until no cycle is in flight
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(outcome) => self.apply(outcome),
                None => break,
            }
        }
    }

    fn apply(&mut self, outcome: CycleOutcome<R>) {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.ordering == CycleOrdering::LatestIssued && outcome.seq != self.issued {
            debug!(seq = outcome.seq, latest = self.issued, "Discarding superseded fetch cycle");
            return;
        }

        self.state.loading = false;
        match outcome.result {
            Ok(data) => {
                debug!(seq = outcome.seq, count = data.len(), "Fetch cycle succeeded");
                self.state.data = Some(data);
            }
            Err(message) => {
                warn!(seq = outcome.seq, "Fetch cycle failed: {}", message);
                self.state.error = Some(message);
            }
        }
    }
}

impl<R> FetchController<R> {
    pub fn state(&self) -> &FetchState<R> {
        &self.state
    }

    pub fn data(&self) -> Option<&[R]> {
        self.state.data.as_deref()
    }

    /// Number of cycles started so far, including the initial one
    pub fn cycles_issued(&self) -> u64 {
        self.issued
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        collections::VecDeque,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };
    use tokio::sync::oneshot;

    type Gates = Arc<Mutex<VecDeque<oneshot::Receiver<Result<Vec<i32>, String>>>>>;

    /// Fetch operation whose cycles resolve only when the test releases them
    fn gated(count: usize) -> (FetchFn<i32>, Vec<oneshot::Sender<Result<Vec<i32>, String>>>) {
        let mut senders = Vec::new();
        let gates: Gates = Arc::default();
        for _ in 0..count {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            gates.lock().unwrap().push_back(rx);
        }
        let fetch = fetch_fn(move || {
            let gate = gates.lock().unwrap().pop_front();
            async move {
                match gate {
                    Some(gate) => gate.await.unwrap_or_else(|_| Err("gate dropped".to_string())),
                    None => Err("unexpected fetch".to_string()),
                }
            }
        });
        (fetch, senders)
    }

    async fn pump(controller: &mut FetchController<i32>) {
        for _ in 0..100 {
            if controller.poll() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("fetch cycle never completed");
    }

    #[tokio::test]
    async fn test_mount_runs_one_cycle() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut controller = FetchController::mount(
            fetch_fn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(vec![1, 2]) }
            }),
            CycleOrdering::Completion,
        );

        assert!(controller.state().loading);
        assert_eq!(controller.data(), None);

        controller.settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            controller.state(),
            &FetchState { data: Some(vec![1, 2]), loading: false, error: None }
        );
    }

    #[tokio::test]
    async fn test_failure_sets_message() {
        let mut controller = FetchController::<i32>::mount(
            fetch_fn(|| async { Err("X".to_string()) }),
            CycleOrdering::Completion,
        );
        controller.settle().await;

        assert_eq!(controller.state().error.as_deref(), Some("X"));
        assert_eq!(controller.data(), None);
        assert!(!controller.state().loading);
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_data_and_refetch_clears_error() {
        let (fetch, mut gates) = gated(3);
        let mut controller = FetchController::mount(fetch, CycleOrdering::Completion);

        gates.remove(0).send(Ok(vec![1])).unwrap();
        controller.settle().await;

        controller.refetch();
        gates.remove(0).send(Err("backend down".to_string())).unwrap();
        controller.settle().await;
        assert_eq!(controller.data(), Some(&[1][..]));
        assert_eq!(controller.state().error.as_deref(), Some("backend down"));

        controller.refetch();
        assert!(controller.state().loading);
        assert_eq!(controller.state().error, None);

        gates.remove(0).send(Ok(vec![1, 2])).unwrap();
        controller.settle().await;
        assert_eq!(controller.data(), Some(&[1, 2][..]));
    }

    #[tokio::test]
    async fn test_double_refetch_settles() {
        let mut controller = FetchController::mount(
            fetch_fn(|| async { Ok(vec![7]) }),
            CycleOrdering::Completion,
        );
        controller.refetch();
        controller.refetch();
        assert_eq!(controller.cycles_issued(), 3);

        controller.settle().await;
        assert!(!controller.state().loading);
        assert!(!controller.is_in_flight());
        assert_eq!(controller.data(), Some(&[7][..]));
    }

    #[tokio::test]
    async fn test_completion_order_last_to_finish_wins() {
        let (fetch, mut gates) = gated(2);
        let mut controller = FetchController::mount(fetch, CycleOrdering::Completion);
        controller.refetch();

        let first = gates.remove(0);
        let second = gates.remove(0);

        second.send(Ok(vec![2])).unwrap();
        pump(&mut controller).await;
        assert_eq!(controller.data(), Some(&[2][..]));
        assert!(!controller.state().loading);

        first.send(Ok(vec![1])).unwrap();
        controller.settle().await;
        assert_eq!(controller.data(), Some(&[1][..]));
    }

    #[tokio::test]
    async fn test_latest_issued_drops_superseded_cycles() {
        let (fetch, mut gates) = gated(2);
        let mut controller = FetchController::mount(fetch, CycleOrdering::LatestIssued);
        controller.refetch();

        let first = gates.remove(0);
        let second = gates.remove(0);

        first.send(Ok(vec![1])).unwrap();
        pump(&mut controller).await;
        assert_eq!(controller.data(), None);
        assert!(controller.state().loading);

        second.send(Ok(vec![2])).unwrap();
        controller.settle().await;
        assert_eq!(controller.data(), Some(&[2][..]));
        assert!(!controller.state().loading);
    }

    #[tokio::test]
    async fn test_results_after_drop_are_ignored() {
        let (fetch, mut gates) = gated(1);
        let controller = FetchController::mount(fetch, CycleOrdering::Completion);
        drop(controller);

        gates.remove(0).send(Ok(vec![1])).unwrap();
        tokio::task::yield_now().await;
    }
}

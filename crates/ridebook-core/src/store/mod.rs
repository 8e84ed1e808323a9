// ── Store plumbing ──
//
// `Slot<S>` is the shared machinery behind every store: a `watch`
// channel holding the current snapshot, a monotonic generation counter
// that decides which response is allowed to settle, and a cancellation
// token that fences off all updates after unmount.

mod resource;
mod state;
mod stats;

pub use resource::ResourceStore;
pub use state::{Phase, ResourceState, StatsState};
pub use stats::StatsStore;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::stream::StateStream;

pub(crate) struct Slot<S: Clone + Send + Sync + 'static> {
    state: watch::Sender<Arc<S>>,
    generation: AtomicU64,
    cancel: CancellationToken,
}

impl<S: Clone + Send + Sync + 'static> Slot<S> {
    pub(crate) fn new(initial: S, cancel: CancellationToken) -> Self {
        let (state, _) = watch::channel(Arc::new(initial));
        Self {
            state,
            generation: AtomicU64::new(0),
            cancel,
        }
    }

    pub(crate) fn snapshot(&self) -> Arc<S> {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> StateStream<S> {
        StateStream::new(self.state.subscribe())
    }

    pub(crate) fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub(crate) fn unmount(&self) {
        self.cancel.cancel();
    }

    /// Issue a new generation and apply `edit` under the state lock.
    ///
    /// Returns `None` once unmounted.
    pub(crate) fn begin(&self, edit: impl FnOnce(&mut S)) -> Option<u64> {
        let mut issued = None;
        self.state.send_if_modified(|state| {
            if self.cancel.is_cancelled() {
                return false;
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            edit(Arc::make_mut(state));
            issued = Some(generation);
            true
        });
        issued
    }

    /// Apply `edit` only if `generation` is still the latest one issued.
    ///
    /// Returns `false` for stale generations and after unmount.
    pub(crate) fn settle(&self, generation: u64, edit: impl FnOnce(&mut S)) -> bool {
        self.state.send_if_modified(|state| {
            if self.cancel.is_cancelled() || self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            edit(Arc::make_mut(state));
            true
        })
    }

    /// Apply `edit` regardless of generation, unless unmounted.
    pub(crate) fn update(&self, edit: impl FnOnce(&mut S)) -> bool {
        self.state.send_if_modified(|state| {
            if self.cancel.is_cancelled() {
                return false;
            }
            edit(Arc::make_mut(state));
            true
        })
    }

    /// Run `fut` unless the slot is unmounted first.
    pub(crate) async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_generation_does_not_settle() {
        let slot = Slot::new(0_u32, CancellationToken::new());
        let first = slot.begin(|_| {}).unwrap_or_default();
        let second = slot.begin(|_| {}).unwrap_or_default();

        assert!(!slot.settle(first, |v| *v = 1));
        assert!(slot.settle(second, |v| *v = 2));
        assert_eq!(*slot.snapshot(), 2);
    }

    #[test]
    fn unmounted_slot_ignores_everything() {
        let slot = Slot::new(0_u32, CancellationToken::new());
        let generation = slot.begin(|_| {}).unwrap_or_default();
        slot.unmount();

        assert!(slot.begin(|v| *v = 9).is_none());
        assert!(!slot.settle(generation, |v| *v = 9));
        assert!(!slot.update(|v| *v = 9));
        assert_eq!(*slot.snapshot(), 0);
    }

    #[test]
    fn subscribers_wake_on_settle() {
        let slot = Slot::new(0_u32, CancellationToken::new());
        let mut stream = slot.subscribe();
        let generation = slot.begin(|_| {}).unwrap_or_default();
        assert!(stream.has_pending());

        let mut changed = tokio_test::task::spawn(stream.changed());
        tokio_test::assert_ready!(changed.poll());
        drop(changed);

        let mut next = tokio_test::task::spawn(stream.changed());
        tokio_test::assert_pending!(next.poll());
        slot.settle(generation, |v| *v = 5);
        assert!(next.is_woken());
        assert_eq!(tokio_test::assert_ready!(next.poll()).as_deref(), Some(&5));
    }

    #[tokio::test]
    async fn guard_returns_none_after_cancel() {
        let slot = Slot::new((), CancellationToken::new());
        slot.unmount();
        assert!(slot.guard(std::future::pending::<()>()).await.is_none());
    }
}

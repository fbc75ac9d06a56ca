//! Single-slot debounce timer.
//!
//! [`Debouncer`] holds at most one pending task. Scheduling a new task
//! cancels whatever was pending, so a burst of events collapses into the
//! last one. The previous token is cancelled under the slot lock and the
//! firing task re-checks its token under the same lock, so a replaced timer
//! never runs even if its sleep already elapsed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::tasks::Tasks;

/// The armed timer: its generation and the token that stops it.
#[derive(Debug)]
struct Pending {
	generation: u64,
	cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct Slot {
	armed: u64,
	pending: Option<Pending>,
}

/// Owned single-slot timer state.
#[derive(Debug, Clone)]
pub struct Debouncer {
	slot: Arc<Mutex<Slot>>,
	tasks: Tasks,
}

impl Debouncer {
	/// Creates an empty debouncer spawning its timers on `tasks`.
	pub fn new(tasks: Tasks) -> Self {
		Self {
			slot: Arc::default(),
			tasks,
		}
	}

	/// Runs `task` once `delay` has passed, unless another call replaces it
	/// first. Any previously pending task is cancelled.
	pub fn schedule<F>(&self, delay: Duration, task: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let cancel = CancellationToken::new();

		let generation = {
			let mut slot = self.slot.lock();
			slot.armed += 1;
			let generation = slot.armed;
			let pending = Pending {
				generation,
				cancel: cancel.clone(),
			};
			if let Some(previous) = slot.pending.replace(pending) {
				previous.cancel.cancel();
				trace!(superseded = previous.generation, generation, "bufbridge.debounce.replace");
			} else {
				trace!(generation, "bufbridge.debounce.arm");
			}
			generation
		};

		let slot = self.slot.clone();
		self.tasks.spawn(async move {
			tokio::select! {
				biased;
				_ = cancel.cancelled() => return,
				_ = tokio::time::sleep(delay) => {}
			}

			{
				let mut slot = slot.lock();
				if cancel.is_cancelled() {
					return;
				}
				if slot.pending.as_ref().is_some_and(|p| p.generation == generation) {
					slot.pending = None;
				}
			}

			trace!(generation, "bufbridge.debounce.fire");
			task.await;
		});
	}

	/// Cancels the pending task, if any. Returns whether one was pending.
	pub fn cancel(&self) -> bool {
		let Some(pending) = self.slot.lock().pending.take() else {
			return false;
		};
		pending.cancel.cancel();
		trace!(generation = pending.generation, "bufbridge.debounce.cancel");
		true
	}

	/// Whether a task is scheduled and has not fired yet.
	pub fn is_pending(&self) -> bool {
		self.slot.lock().pending.is_some()
	}
}

//! Runtime binding for a client's timers and deliveries.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use crate::{Error, Result};

/// Where a client spawns its work, and the tracker that lets it wait for
/// that work.
///
/// The runtime handle is captured once, so editor callbacks may arrive on
/// threads that are not runtime workers.
#[derive(Debug, Clone)]
pub struct Tasks {
	runtime: Handle,
	tracker: TaskTracker,
}

impl Tasks {
	/// Binds to the runtime the caller is running on.
	pub fn current() -> Result<Self> {
		let runtime = Handle::try_current().map_err(|e| Error::NoRuntime(e.to_string()))?;
		Ok(Self::on(runtime))
	}

	/// Binds to an explicit runtime.
	pub fn on(runtime: Handle) -> Self {
		Self {
			runtime,
			tracker: TaskTracker::new(),
		}
	}

	pub(crate) fn spawn<F>(&self, fut: F) -> JoinHandle<F::Output>
	where
		F: Future + Send + 'static,
		F::Output: Send + 'static,
	{
		self.tracker.spawn_on(fut, &self.runtime)
	}

	/// Timers and deliveries that have not finished yet.
	pub fn in_flight(&self) -> usize {
		self.tracker.len()
	}

	/// Waits until everything spawned so far has finished, then accepts
	/// new work again.
	pub async fn settle(&self) {
		self.tracker.close();
		self.tracker.wait().await;
		self.tracker.reopen();
	}
}

//! Buffer sync client.
//!
//! [`BufferSyncClient`] filters editor events by language and drives the
//! [`Debouncer`] and [`Transmitter`]:
//! - change events on tracked documents re-arm the single debounce timer,
//!   and the document is captured when the timer fires
//! - focus events on tracked documents are pushed immediately
//! - everything else is dropped without touching the timer
//!
//! All pushes are fire-and-forget. [`BufferSyncClient::settle`] exists for
//! hosts that need to drain outstanding work before exiting.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::Result;
use crate::config::{FocusPolicy, SyncConfig};
use crate::debounce::Debouncer;
use crate::document::{TextDocument, TextEditor};
use crate::host::EditorListener;
use crate::tasks::Tasks;
use crate::transmit::{Delivery, HttpTransport, Transmitter, Transport};

/// Debounced, language-filtered buffer sync client.
#[derive(Debug)]
pub struct BufferSyncClient {
	config: SyncConfig,
	debouncer: Debouncer,
	transmitter: Transmitter,
	tasks: Tasks,
}

impl BufferSyncClient {
	/// Create a client posting over HTTP to `config.endpoint`, running on
	/// the current tokio runtime.
	pub fn new(config: SyncConfig) -> Result<Self> {
		let transport = Arc::new(HttpTransport::new(config.endpoint.clone())?);
		Self::with_transport(config, transport)
	}

	/// Create a client using an arbitrary transport, running on the current
	/// tokio runtime.
	pub fn with_transport(config: SyncConfig, transport: Arc<dyn Transport>) -> Result<Self> {
		Ok(Self::with_tasks(config, transport, Tasks::current()?))
	}

	/// Create a client whose timers and pushes run on `tasks`.
	pub fn with_tasks(config: SyncConfig, transport: Arc<dyn Transport>, tasks: Tasks) -> Self {
		Self {
			config,
			debouncer: Debouncer::new(tasks.clone()),
			transmitter: Transmitter::new(transport, tasks.clone()),
			tasks,
		}
	}

	pub fn config(&self) -> &SyncConfig {
		&self.config
	}

	/// Handles a document change notification.
	pub fn on_document_changed(&self, document: Arc<dyn TextDocument>) {
		if !self.config.tracks(document.language_id()) {
			trace!(
				path = %document.file_name().display(),
				language = document.language_id(),
				"bufbridge.sync.change_ignored"
			);
			return;
		}

		debug!(
			path = %document.file_name().display(),
			debounce_ms = self.config.debounce.as_millis() as u64,
			"bufbridge.sync.schedule"
		);

		let transmitter = self.transmitter.clone();
		self.debouncer.schedule(self.config.debounce, async move {
			transmitter.push_content(document.as_ref()).detach();
		});
	}

	/// Handles a change of the focused editor. `None` means no editor has focus.
	pub fn on_active_editor_changed(&self, editor: Option<&dyn TextEditor>) {
		let Some(editor) = editor else {
			trace!("bufbridge.sync.focus_cleared");
			return;
		};

		let document = editor.document();
		if !self.config.tracks(document.language_id()) {
			trace!(
				path = %document.file_name().display(),
				language = document.language_id(),
				"bufbridge.sync.focus_ignored"
			);
			return;
		}

		if self.config.focus_policy == FocusPolicy::CancelPending && self.debouncer.cancel() {
			debug!(path = %document.file_name().display(), "bufbridge.sync.focus_cancelled_pending");
		}

		debug!(path = %document.file_name().display(), "bufbridge.sync.focus_push");
		self.transmitter.push_content(document.as_ref()).detach();
	}

	/// Pushes `document` now, bypassing the language filter and the timer.
	pub fn push_content(&self, document: &dyn TextDocument) -> Delivery {
		self.transmitter.push_content(document)
	}

	/// Whether a debounced push is waiting to fire.
	pub fn is_pending(&self) -> bool {
		self.debouncer.is_pending()
	}

	/// Waits for the pending timer (which still fires) and every push in
	/// flight to finish.
	pub async fn settle(&self) {
		self.tasks.settle().await;
	}
}

impl EditorListener for BufferSyncClient {
	fn on_change(&self, document: Arc<dyn TextDocument>) {
		self.on_document_changed(document);
	}

	fn on_focus_change(&self, editor: Option<&dyn TextEditor>) {
		self.on_active_editor_changed(editor);
	}
}

#[cfg(test)]
mod tests;

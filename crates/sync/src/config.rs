//! Configuration for the buffer sync client.

use std::time::Duration;

use url::Url;

use crate::Result;

/// Default receiver endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:54321/update_buffer";

/// Quiet period after the last edit before a debounced sync fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Language identifier synced when no other languages are configured.
pub const PYTHON_LANGUAGE: &str = "python";

/// What an immediate focus sync does to a debounce timer that is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusPolicy {
	/// Leave the pending timer alone; it still fires for the document that
	/// was edited.
	#[default]
	KeepPending,
	/// Cancel the pending timer before syncing the focused document.
	CancelPending,
}

/// Configuration for [`BufferSyncClient`](crate::BufferSyncClient).
#[derive(Debug, Clone)]
pub struct SyncConfig {
	/// Receiver URL snapshots are POSTed to.
	pub endpoint: Url,
	/// Debounce window for change events.
	pub debounce: Duration,
	/// Editor language identifiers that are synced. Everything else is ignored.
	pub languages: Vec<String>,
	/// Interaction between focus syncs and pending timers.
	pub focus_policy: FocusPolicy,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			endpoint: default_endpoint(),
			debounce: DEFAULT_DEBOUNCE,
			languages: vec![PYTHON_LANGUAGE.to_string()],
			focus_policy: FocusPolicy::default(),
		}
	}
}

fn default_endpoint() -> Url {
	Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}

impl SyncConfig {
	/// Create a configuration with the default endpoint, delay and languages.
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the receiver endpoint.
	pub fn with_endpoint(mut self, endpoint: Url) -> Self {
		self.endpoint = endpoint;
		self
	}

	/// Parse and set the receiver endpoint.
	pub fn with_endpoint_str(self, endpoint: &str) -> Result<Self> {
		Ok(self.with_endpoint(Url::parse(endpoint)?))
	}

	/// Set the debounce window.
	pub fn with_debounce(mut self, debounce: Duration) -> Self {
		self.debounce = debounce;
		self
	}

	/// Replace the set of synced languages.
	pub fn with_languages(mut self, languages: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.languages = languages.into_iter().map(Into::into).collect();
		self
	}

	/// Set the focus policy.
	pub fn with_focus_policy(mut self, policy: FocusPolicy) -> Self {
		self.focus_policy = policy;
		self
	}

	/// Whether documents of `language_id` are synced.
	pub fn tracks(&self, language_id: &str) -> bool {
		self.languages.iter().any(|l| l == language_id)
	}
}

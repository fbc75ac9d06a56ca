//! Active buffer storage.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

/// How long an update counts as the buffer the user is working on.
pub const DEFAULT_FRESH_WINDOW: Duration = Duration::from_secs(30);

/// The most recent buffer pushed by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBuffer {
	pub path: PathBuf,
	pub content: String,
	pub language: Option<String>,
	pub updated_at: Instant,
}

impl ActiveBuffer {
	/// Whether the buffer was updated within `max_age` of `now`.
	pub fn is_fresh(&self, now: Instant, max_age: Duration) -> bool {
		now.saturating_duration_since(self.updated_at) < max_age
	}
}

/// Shared single-slot store; each update replaces the previous buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferStore {
	active: Arc<RwLock<Option<ActiveBuffer>>>,
}

impl BufferStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn update_buffer(&self, path: impl Into<PathBuf>, content: impl Into<String>, language: Option<String>) {
		let buffer = ActiveBuffer {
			path: path.into(),
			content: content.into(),
			language,
			updated_at: Instant::now(),
		};
		debug!(path = %buffer.path.display(), bytes = buffer.content.len(), "bufbridge.store.update");
		*self.active.write() = Some(buffer);
	}

	pub fn active_buffer(&self) -> Option<ActiveBuffer> {
		self.active.read().clone()
	}

	/// The active buffer, if it was updated within `max_age`.
	pub fn fresh_buffer(&self, max_age: Duration) -> Option<ActiveBuffer> {
		let now = Instant::now();
		self.active.read().as_ref().filter(|b| b.is_fresh(now, max_age)).cloned()
	}

	/// In-memory text for `path` when it names the active buffer.
	pub fn content_for(&self, path: &Path) -> Option<String> {
		let active = self.active.read();
		let buffer = active.as_ref()?;
		(normalize(&buffer.path) == normalize(path)).then(|| buffer.content.clone())
	}
}

/// Lexically collapses `.`, `..` and repeated separators.
fn normalize(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				if matches!(out.components().next_back(), Some(Component::Normal(_))) {
					out.pop();
				} else if !out.has_root() {
					out.push("..");
				}
			}
			other => out.push(other.as_os_str()),
		}
	}
	out
}

//! Document and editor handles supplied by the host.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

/// A live document owned by the host editor.
///
/// Text is read on demand, so a handle captured when an edit is debounced
/// yields whatever the buffer holds when the timer fires.
pub trait TextDocument: Send + Sync {
	/// Absolute path of the source document.
	fn file_name(&self) -> &Path;

	/// Editor-assigned language identifier.
	fn language_id(&self) -> &str;

	/// Full current text.
	fn text(&self) -> String;
}

/// An editor view wrapping a document.
pub trait TextEditor: Send + Sync {
	fn document(&self) -> Arc<dyn TextDocument>;
}

/// In-memory document whose text can be replaced after handles are shared.
#[derive(Debug)]
pub struct MemoryDocument {
	path: PathBuf,
	language: String,
	text: RwLock<String>,
}

impl MemoryDocument {
	pub fn new(path: impl Into<PathBuf>, language: impl Into<String>, text: impl Into<String>) -> Arc<Self> {
		Arc::new(Self {
			path: path.into(),
			language: language.into(),
			text: RwLock::new(text.into()),
		})
	}

	/// Replace the full buffer text.
	pub fn set_text(&self, text: impl Into<String>) {
		*self.text.write() = text.into();
	}
}

impl TextDocument for MemoryDocument {
	fn file_name(&self) -> &Path {
		&self.path
	}

	fn language_id(&self) -> &str {
		&self.language
	}

	fn text(&self) -> String {
		self.text.read().clone()
	}
}

/// Editor view over a shared document.
#[derive(Clone)]
pub struct MemoryEditor {
	document: Arc<dyn TextDocument>,
}

impl MemoryEditor {
	pub fn new(document: Arc<dyn TextDocument>) -> Self {
		Self { document }
	}
}

impl std::fmt::Debug for MemoryEditor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryEditor")
			.field("path", &self.document.file_name())
			.field("language", &self.document.language_id())
			.finish()
	}
}

impl TextEditor for MemoryEditor {
	fn document(&self) -> Arc<dyn TextDocument> {
		self.document.clone()
	}
}

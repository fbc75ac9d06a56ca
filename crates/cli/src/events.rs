//! Line protocol spoken by `bufbridge attach`.
//!
//! Each stdin line is one JSON object tagged by `event`:
//!
//! ```text
//! {"event":"change","file_path":"/a.py","buffer_content":"x","language":"python"}
//! {"event":"focus","document":{"file_path":"/a.py","buffer_content":"x","language":"python"}}
//! {"event":"focus","document":null}
//! {"event":"close","file_path":"/a.py"}
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bufbridge_sync::{DocumentSnapshot, EventHub, MemoryDocument, MemoryEditor, TextDocument};
use serde::Deserialize;
use tracing::debug;

/// One editor event read from the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
	/// Buffer text changed.
	Change(DocumentSnapshot),
	/// Active editor changed. `None` when no editor has focus.
	Focus {
		#[serde(default)]
		document: Option<DocumentSnapshot>,
	},
	/// Buffer closed by the editor. Only forgets the local handle; a pending
	/// debounced push for it still fires.
	Close { file_path: String },
}

impl HostEvent {
	pub fn parse(line: &str) -> serde_json::Result<Self> {
		serde_json::from_str(line)
	}
}

/// Documents the host has reported, keyed by path.
///
/// A document keeps its identity across events so pending debounced pushes
/// read the latest text when they fire.
#[derive(Default)]
pub struct OpenDocuments {
	documents: HashMap<PathBuf, Arc<MemoryDocument>>,
}

impl OpenDocuments {
	/// Updates or opens the document described by `snapshot`.
	pub fn apply(&mut self, snapshot: DocumentSnapshot) -> Arc<MemoryDocument> {
		let path = PathBuf::from(snapshot.file_path);
		if let Some(document) = self.documents.get(&path)
			&& document.language_id() == snapshot.language
		{
			document.set_text(snapshot.buffer_content);
			return document.clone();
		}

		let document = MemoryDocument::new(path.clone(), snapshot.language, snapshot.buffer_content);
		self.documents.insert(path, document.clone());
		document
	}

	/// Applies `event` and forwards it to the hub's listeners.
	pub fn dispatch(&mut self, hub: &EventHub, event: HostEvent) {
		match event {
			HostEvent::Change(snapshot) => {
				let document = self.apply(snapshot);
				hub.emit_change(document);
			}
			HostEvent::Focus { document: Some(snapshot) } => {
				let editor = MemoryEditor::new(self.apply(snapshot));
				hub.emit_focus(Some(&editor));
			}
			HostEvent::Focus { document: None } => hub.emit_focus(None),
			HostEvent::Close { file_path } => {
				if self.documents.remove(Path::new(&file_path)).is_none() {
					debug!(path = %file_path, "bufbridge.attach.close_unknown");
				}
			}
		}
	}

	pub fn len(&self) -> usize {
		self.documents.len()
	}
}

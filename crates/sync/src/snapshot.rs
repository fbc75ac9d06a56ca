//! Wire payload for a single buffer update.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::document::TextDocument;

/// State of one editor buffer at the moment it is captured.
///
/// Field names are the wire keys expected by the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
	/// Absolute path of the source document.
	pub file_path: String,
	/// Full document text.
	pub buffer_content: String,
	/// Editor language identifier.
	pub language: String,
}

impl DocumentSnapshot {
	/// Reads path, text and language from `document` now.
	pub fn capture(document: &dyn TextDocument) -> Self {
		Self {
			file_path: document.file_name().to_string_lossy().into_owned(),
			buffer_content: document.text(),
			language: document.language_id().to_string(),
		}
	}

	/// Encodes the snapshot as a JSON request body.
	pub fn to_body(&self) -> Result<Vec<u8>> {
		Ok(serde_json::to_vec(self)?)
	}
}

//! Error types for buffer synchronization.

use thiserror::Error;

/// Errors surfaced by the sync client.
///
/// None of these ever reach the editor: the client logs them and moves on.
/// They exist so that callers awaiting a [`Delivery`](crate::Delivery)
/// outcome can see what happened.
#[derive(Debug, Error)]
pub enum Error {
	/// The HTTP exchange with the receiver failed below the application layer
	/// (connection refused, reset, resolution failure).
	#[error("transport failure posting to {endpoint}: {reason}")]
	Transport {
		/// Endpoint the request was addressed to.
		endpoint: String,
		/// Underlying transport error message.
		reason: String,
	},

	/// The document snapshot could not be encoded as JSON.
	#[error("failed to serialize document snapshot: {0}")]
	Serialize(#[from] serde_json::Error),

	/// A configured endpoint is not a valid URL.
	#[error("invalid endpoint: {0}")]
	InvalidEndpoint(#[from] url::ParseError),

	/// The client was created outside a tokio runtime.
	#[error("no tokio runtime available: {0}")]
	NoRuntime(String),

	/// The delivery task was cancelled or panicked before reporting.
	#[error("delivery task aborted: {0}")]
	Aborted(String),
}

impl Error {
	/// Returns true for the transport failure category.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport { .. })
	}
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

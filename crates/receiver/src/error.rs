//! Error types for the receiver.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors that can occur while running the receiver.
#[derive(Debug, Error)]
pub enum Error {
	/// The listening socket could not be bound.
	#[error("failed to bind {addr}: {reason}")]
	Bind {
		/// Requested address.
		addr: SocketAddr,
		/// Underlying error message.
		reason: String,
	},

	/// The server thread panicked.
	#[error("receiver thread panicked: {0}")]
	Panicked(String),

	/// I/O error on the server thread.
	#[error("{0}")]
	Io(#[from] std::io::Error),
}

/// Result type for receiver operations.
pub type Result<T> = std::result::Result<T, Error>;

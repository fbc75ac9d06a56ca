//! Local receiver for editor buffer updates.
//!
//! Listens on `127.0.0.1:54321` and keeps the most recent buffer posted to
//! `/update_buffer` in a [`BufferStore`] that the rest of the process can read.

pub mod error;
pub mod server;
pub mod store;

pub use error::{Error, Result};
pub use server::{DEFAULT_PORT, Receiver, ReceiverConfig, ReceiverHandle, UPDATE_PATH};
pub use store::{ActiveBuffer, BufferStore, DEFAULT_FRESH_WINDOW};

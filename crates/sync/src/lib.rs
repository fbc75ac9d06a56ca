//! Debounced editor buffer synchronization.
//!
//! Mirrors the buffer an editor is working on into a local process. The host
//! forwards document-change and focus notifications to a
//! [`BufferSyncClient`], which:
//! * ignores documents whose language is not tracked (default: `python`)
//! * coalesces bursts of changes behind a single 500 ms [`Debouncer`] slot
//! * pushes focused documents immediately
//! * POSTs a [`DocumentSnapshot`] as JSON to `http://127.0.0.1:54321/update_buffer`
//!
//! Delivery is best-effort. Responses are not inspected and transport failures
//! are logged, never retried.

pub mod client;
pub mod config;
pub mod debounce;
pub mod document;
pub mod error;
pub mod host;
pub mod snapshot;
pub mod tasks;
pub mod transmit;

pub use client::BufferSyncClient;
pub use config::{DEFAULT_DEBOUNCE, DEFAULT_ENDPOINT, FocusPolicy, PYTHON_LANGUAGE, SyncConfig};
pub use debounce::Debouncer;
pub use document::{MemoryDocument, MemoryEditor, TextDocument, TextEditor};
pub use error::{Error, Result};
pub use host::{Activation, EditorHost, EditorListener, EventHub, SubscriptionId, activate};
pub use snapshot::DocumentSnapshot;
pub use tasks::Tasks;
pub use transmit::{Delivery, HttpTransport, Transmitter, Transport};

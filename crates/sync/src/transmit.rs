//! Payload transmitter.
//!
//! Every push is a one-shot task: capture a snapshot, POST it, log failures.
//! The caller receives a [`Delivery`] and either awaits its outcome or
//! detaches it. Detaching is the normal path from editor events.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use url::Url;

use crate::document::TextDocument;
use crate::snapshot::DocumentSnapshot;
use crate::tasks::Tasks;
use crate::{Error, Result};

/// Delivers an encoded snapshot to the receiver.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Destination, for diagnostics.
	fn endpoint(&self) -> &str;

	/// Sends `body` and waits for the exchange to complete.
	///
	/// Only transport-level failures are errors; the response status is not
	/// inspected.
	async fn post(&self, body: Vec<u8>) -> Result<()>;
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: Client,
	endpoint: Url,
}

impl HttpTransport {
	/// Create a transport posting to `endpoint`.
	///
	/// The client has no request timeout and never goes through a proxy.
	pub fn new(endpoint: Url) -> Result<Self> {
		let client = Client::builder().no_proxy().build().map_err(|e| Error::Transport {
			endpoint: endpoint.to_string(),
			reason: e.to_string(),
		})?;
		Ok(Self { client, endpoint })
	}
}

#[async_trait]
impl Transport for HttpTransport {
	fn endpoint(&self) -> &str {
		self.endpoint.as_str()
	}

	async fn post(&self, body: Vec<u8>) -> Result<()> {
		let response = self
			.client
			.post(self.endpoint.clone())
			.header(CONTENT_TYPE, "application/json")
			.header(CONTENT_LENGTH, body.len())
			.body(body)
			.send()
			.await
			.map_err(|e| Error::Transport {
				endpoint: self.endpoint.to_string(),
				reason: e.to_string(),
			})?;

		trace!(status = response.status().as_u16(), "bufbridge.transmit.response");
		Ok(())
	}
}

/// Handle to a single in-flight push.
#[must_use = "await `outcome` or call `detach` to make the fire-and-forget choice explicit"]
#[derive(Debug)]
pub struct Delivery {
	handle: JoinHandle<Result<()>>,
}

impl Delivery {
	/// Lets the push finish in the background. Failures were already logged.
	pub fn detach(self) {}

	/// Waits for the push and returns its outcome.
	pub async fn outcome(self) -> Result<()> {
		self.handle.await.map_err(|e| Error::Aborted(e.to_string()))?
	}
}

/// Serializes document snapshots and hands them to a [`Transport`].
#[derive(Clone)]
pub struct Transmitter {
	transport: Arc<dyn Transport>,
	tasks: Tasks,
}

impl std::fmt::Debug for Transmitter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Transmitter")
			.field("endpoint", &self.transport.endpoint())
			.field("in_flight", &self.tasks.in_flight())
			.finish()
	}
}

impl Transmitter {
	/// Create a transmitter whose pushes run on `tasks`.
	pub fn new(transport: Arc<dyn Transport>, tasks: Tasks) -> Self {
		Self { transport, tasks }
	}

	/// Captures `document` now and sends it.
	pub fn push_content(&self, document: &dyn TextDocument) -> Delivery {
		let snapshot = DocumentSnapshot::capture(document);
		let transport = self.transport.clone();

		let handle = self.tasks.spawn(async move {
			let result = deliver(transport.as_ref(), &snapshot).await;
			match &result {
				Ok(bytes) => debug!(path = %snapshot.file_path, bytes, "bufbridge.transmit.sent"),
				Err(error) => warn!(
					path = %snapshot.file_path,
					endpoint = transport.endpoint(),
					%error,
					"bufbridge.transmit.failed"
				),
			}
			result.map(drop)
		});

		Delivery { handle }
	}
}

async fn deliver(transport: &dyn Transport, snapshot: &DocumentSnapshot) -> Result<usize> {
	let body = snapshot.to_body()?;
	let bytes = body.len();
	transport.post(body).await?;
	Ok(bytes)
}

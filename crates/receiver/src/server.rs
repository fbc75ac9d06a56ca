//! HTTP endpoint accepting buffer updates.
//!
//! Routes:
//! - `POST /update_buffer`: JSON `{file_path, buffer_content, language?}`
//!   replaces the active buffer
//! - any other `POST` path: 404
//! - any other method: 501

use std::io::Read;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, error, info, warn};

use crate::store::{ActiveBuffer, BufferStore, DEFAULT_FRESH_WINDOW};
use crate::{Error, Result};

/// Port the editor bridge posts to.
pub const DEFAULT_PORT: u16 = 54321;

/// Route accepting buffer updates.
pub const UPDATE_PATH: &str = "/update_buffer";

/// Configuration for the receiver.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
	/// Address to listen on. Port 0 picks an ephemeral port.
	pub addr: SocketAddr,
	/// Window within which the active buffer is considered current.
	pub fresh_window: Duration,
}

impl Default for ReceiverConfig {
	fn default() -> Self {
		Self {
			addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
			fresh_window: DEFAULT_FRESH_WINDOW,
		}
	}
}

impl ReceiverConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the listen address.
	pub fn with_addr(mut self, addr: SocketAddr) -> Self {
		self.addr = addr;
		self
	}

	/// Set the freshness window.
	pub fn with_fresh_window(mut self, window: Duration) -> Self {
		self.fresh_window = window;
		self
	}
}

/// Response decided for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reply {
	status: u16,
	body: &'static str,
}

impl Reply {
	const OK: Self = Self {
		status: 200,
		body: r#"{"status": "ok"}"#,
	};
	const BAD_REQUEST: Self = Self {
		status: 400,
		body: r#"{"status": "bad_request"}"#,
	};
	const NOT_FOUND: Self = Self { status: 404, body: "" };
	const SERVER_ERROR: Self = Self { status: 500, body: "" };
	const NOT_IMPLEMENTED: Self = Self { status: 501, body: "" };
}

fn route(method: &Method, url: &str, body: &mut dyn Read, store: &BufferStore) -> Reply {
	if *method != Method::Post {
		return Reply::NOT_IMPLEMENTED;
	}

	let mut raw = Vec::new();
	if let Err(error) = body.read_to_end(&mut raw) {
		warn!(%error, "bufbridge.receiver.read_failed");
		return Reply::SERVER_ERROR;
	}

	let path = url.split('?').next().unwrap_or(url);
	if path != UPDATE_PATH {
		return Reply::NOT_FOUND;
	}

	let update = match serde_json::from_slice::<Value>(&raw) {
		Ok(Value::Object(update)) => update,
		Ok(other) => {
			warn!(kind = json_kind(&other), "bufbridge.receiver.not_an_object");
			return Reply::SERVER_ERROR;
		}
		Err(error) => {
			warn!(%error, bytes = raw.len(), "bufbridge.receiver.decode_failed");
			return Reply::SERVER_ERROR;
		}
	};

	let file_path = update.get("file_path").and_then(Value::as_str);
	let content = update.get("buffer_content").and_then(Value::as_str);
	match (file_path, content) {
		(Some(path), Some(content)) if !path.is_empty() => {
			info!(path, bytes = content.len(), "bufbridge.receiver.update");
			let language = update.get("language").and_then(Value::as_str).map(str::to_owned);
			store.update_buffer(path, content, language);
			Reply::OK
		}
		_ => {
			debug!("bufbridge.receiver.bad_request");
			Reply::BAD_REQUEST
		}
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn handle(mut request: Request, store: &BufferStore) {
	let method = request.method().clone();
	let url = request.url().to_string();
	let reply = route(&method, &url, request.as_reader(), store);
	debug!(%method, url = %url, status = reply.status, "bufbridge.receiver.request");

	let mut response = Response::from_string(reply.body).with_status_code(reply.status);
	if !reply.body.is_empty()
		&& let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
	{
		response = response.with_header(header);
	}
	if let Err(error) = request.respond(response) {
		debug!(%error, "bufbridge.receiver.respond_failed");
	}
}

/// A bound, not yet running receiver.
pub struct Receiver {
	server: Arc<Server>,
	store: BufferStore,
	addr: SocketAddr,
	fresh_window: Duration,
}

impl std::fmt::Debug for Receiver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Receiver").field("addr", &self.addr).finish()
	}
}

impl Receiver {
	/// Bind the listening socket.
	pub fn bind(config: &ReceiverConfig, store: BufferStore) -> Result<Self> {
		let server = Server::http(config.addr).map_err(|e| Error::Bind {
			addr: config.addr,
			reason: e.to_string(),
		})?;
		let addr = server.server_addr().to_ip().ok_or_else(|| Error::Bind {
			addr: config.addr,
			reason: "unable to determine bound address".into(),
		})?;

		Ok(Self {
			server: Arc::new(server),
			store,
			addr,
			fresh_window: config.fresh_window,
		})
	}

	/// Address actually bound.
	pub fn local_addr(&self) -> SocketAddr {
		self.addr
	}

	pub fn store(&self) -> &BufferStore {
		&self.store
	}

	/// Serve on a dedicated thread until [`ReceiverHandle::shutdown`].
	pub fn spawn(self) -> Result<ReceiverHandle> {
		let server = self.server.clone();
		let store = self.store.clone();
		let addr = self.addr;

		let thread = thread::Builder::new()
			.name("bufbridge-receiver".into())
			.spawn(move || {
				info!(%addr, "bufbridge.receiver.listening");
				while let Ok(request) = server.recv() {
					let store = store.clone();
					// A slow body must not hold up later updates.
					let spawned = thread::Builder::new()
						.name("bufbridge-request".into())
						.spawn(move || handle(request, &store));
					if let Err(error) = spawned {
						warn!(%error, "bufbridge.receiver.spawn_failed");
					}
				}
				info!(%addr, "bufbridge.receiver.stopped");
			})?;

		Ok(ReceiverHandle {
			server: self.server,
			store: self.store,
			addr,
			fresh_window: self.fresh_window,
			thread: Some(thread),
		})
	}
}

/// Running receiver.
pub struct ReceiverHandle {
	server: Arc<Server>,
	store: BufferStore,
	addr: SocketAddr,
	fresh_window: Duration,
	thread: Option<thread::JoinHandle<()>>,
}

impl std::fmt::Debug for ReceiverHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ReceiverHandle")
			.field("addr", &self.addr)
			.field("running", &self.thread.is_some())
			.finish()
	}
}

impl ReceiverHandle {
	pub fn local_addr(&self) -> SocketAddr {
		self.addr
	}

	pub fn store(&self) -> &BufferStore {
		&self.store
	}

	/// The active buffer, if it was updated within the configured window.
	pub fn current_buffer(&self) -> Option<ActiveBuffer> {
		self.store.fresh_buffer(self.fresh_window)
	}

	/// URL of the update route.
	pub fn update_url(&self) -> String {
		format!("http://{}{UPDATE_PATH}", self.addr)
	}

	/// Blocks until the server thread exits.
	pub fn join(mut self) -> Result<()> {
		self.thread.take().map_or(Ok(()), join_server)
	}

	/// Stops accepting requests and waits for the server thread.
	pub fn shutdown(mut self) -> Result<()> {
		self.server.unblock();
		self.thread.take().map_or(Ok(()), join_server)
	}
}

fn join_server(thread: thread::JoinHandle<()>) -> Result<()> {
	thread.join().map_err(|panic| {
		let reason = panic
			.downcast_ref::<&str>()
			.map(|s| s.to_string())
			.or_else(|| panic.downcast_ref::<String>().cloned())
			.unwrap_or_else(|| "unknown panic".into());
		error!(%reason, "bufbridge.receiver.panicked");
		Error::Panicked(reason)
	})
}

impl Drop for ReceiverHandle {
	fn drop(&mut self) {
		if self.thread.is_some() {
			self.server.unblock();
		}
	}
}

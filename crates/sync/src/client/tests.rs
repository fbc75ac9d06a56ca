use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::time::{Instant, sleep};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use super::*;
use crate::document::{MemoryDocument, MemoryEditor};
use crate::host::{EventHub, activate};
use crate::snapshot::DocumentSnapshot;
use crate::{Error, Transport};

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Records every body it is handed, with the paused-clock time of arrival.
#[derive(Default)]
struct RecordingTransport {
	sent: Mutex<Vec<(Instant, DocumentSnapshot)>>,
}

impl RecordingTransport {
	fn snapshots(&self) -> Vec<DocumentSnapshot> {
		self.sent.lock().iter().map(|(_, s)| s.clone()).collect()
	}

	fn times(&self) -> Vec<Instant> {
		self.sent.lock().iter().map(|(t, _)| *t).collect()
	}
}

#[async_trait]
impl Transport for RecordingTransport {
	fn endpoint(&self) -> &str {
		"memory://recording"
	}

	async fn post(&self, body: Vec<u8>) -> crate::Result<()> {
		let snapshot = serde_json::from_slice(&body)?;
		self.sent.lock().push((Instant::now(), snapshot));
		Ok(())
	}
}

#[derive(Default)]
struct RefusingTransport {
	attempts: AtomicUsize,
}

#[async_trait]
impl Transport for RefusingTransport {
	fn endpoint(&self) -> &str {
		"http://127.0.0.1:54321/update_buffer"
	}

	async fn post(&self, _body: Vec<u8>) -> crate::Result<()> {
		self.attempts.fetch_add(1, Ordering::SeqCst);
		Err(Error::Transport {
			endpoint: self.endpoint().to_string(),
			reason: "connection refused".into(),
		})
	}
}

#[derive(Clone, Default)]
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		if *event.metadata().level() == Level::WARN {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}
}

fn recording_client(config: SyncConfig) -> (BufferSyncClient, Arc<RecordingTransport>) {
	let transport = Arc::new(RecordingTransport::default());
	(BufferSyncClient::with_transport(config, transport.clone()).unwrap(), transport)
}

fn snapshot(path: &str, text: &str) -> DocumentSnapshot {
	DocumentSnapshot {
		file_path: path.into(),
		buffer_content: text.into(),
		language: "python".into(),
	}
}

#[tokio::test(start_paused = true)]
async fn test_two_keystrokes_coalesce_into_one_post() {
	let (client, transport) = recording_client(SyncConfig::new());
	let doc = MemoryDocument::new("/tmp/a.py", "python", "a");

	client.on_document_changed(doc.clone());
	sleep(Duration::from_millis(100)).await;
	doc.set_text("ab");
	client.on_document_changed(doc.clone());
	let last_event = Instant::now();

	sleep(Duration::from_millis(600)).await;

	assert_eq!(transport.snapshots(), vec![snapshot("/tmp/a.py", "ab")]);
	assert_eq!(transport.times()[0] - last_event, DEBOUNCE);
	assert!(!client.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_burst_sends_once_with_last_state() {
	let (client, transport) = recording_client(SyncConfig::new());
	let doc = MemoryDocument::new("/tmp/burst.py", "python", "");

	let mut last_event = Instant::now();
	for i in 1..=20 {
		doc.set_text("x".repeat(i));
		client.on_document_changed(doc.clone());
		last_event = Instant::now();
		sleep(Duration::from_millis(30)).await;
	}

	sleep(Duration::from_secs(1)).await;

	assert_eq!(transport.snapshots(), vec![snapshot("/tmp/burst.py", &"x".repeat(20))]);
	assert!(transport.times()[0] - last_event >= DEBOUNCE);
}

#[tokio::test(start_paused = true)]
async fn test_text_is_read_when_timer_fires() {
	let (client, transport) = recording_client(SyncConfig::new());
	let doc = MemoryDocument::new("/tmp/a.py", "python", "scheduled");

	client.on_document_changed(doc.clone());
	sleep(Duration::from_millis(200)).await;
	doc.set_text("fired");
	sleep(Duration::from_millis(400)).await;

	assert_eq!(transport.snapshots(), vec![snapshot("/tmp/a.py", "fired")]);
}

#[tokio::test(start_paused = true)]
async fn test_spaced_changes_send_twice() {
	let (client, transport) = recording_client(SyncConfig::new());
	let doc = MemoryDocument::new("/tmp/a.py", "python", "one");

	client.on_document_changed(doc.clone());
	sleep(Duration::from_millis(700)).await;
	doc.set_text("two");
	client.on_document_changed(doc.clone());
	sleep(Duration::from_millis(700)).await;

	assert_eq!(
		transport.snapshots(),
		vec![snapshot("/tmp/a.py", "one"), snapshot("/tmp/a.py", "two")]
	);
}

#[tokio::test(start_paused = true)]
async fn test_untracked_language_is_ignored() {
	let (client, transport) = recording_client(SyncConfig::new());
	let doc = MemoryDocument::new("/tmp/main.rs", "rust", "fn main() {}");

	client.on_document_changed(doc.clone());
	assert!(!client.is_pending());

	sleep(Duration::from_secs(2)).await;
	assert!(transport.snapshots().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_untracked_change_leaves_pending_timer_alone() {
	let (client, transport) = recording_client(SyncConfig::new());
	let py = MemoryDocument::new("/tmp/a.py", "python", "py");
	let rs = MemoryDocument::new("/tmp/main.rs", "rust", "rs");

	client.on_document_changed(py.clone());
	sleep(Duration::from_millis(300)).await;
	client.on_document_changed(rs);
	assert!(client.is_pending());

	sleep(Duration::from_millis(250)).await;
	assert_eq!(transport.snapshots(), vec![snapshot("/tmp/a.py", "py")]);
}

#[tokio::test(start_paused = true)]
async fn test_documents_share_one_debounce_slot() {
	let (client, transport) = recording_client(SyncConfig::new());
	let a = MemoryDocument::new("/tmp/a.py", "python", "a");
	let b = MemoryDocument::new("/tmp/b.py", "python", "b");

	client.on_document_changed(a);
	sleep(Duration::from_millis(100)).await;
	client.on_document_changed(b);
	sleep(Duration::from_secs(1)).await;

	assert_eq!(transport.snapshots(), vec![snapshot("/tmp/b.py", "b")]);
}

#[tokio::test(start_paused = true)]
async fn test_configured_languages_and_delay() {
	let config = SyncConfig::new()
		.with_languages(["markdown"])
		.with_debounce(Duration::from_millis(50));
	let (client, transport) = recording_client(config);

	client.on_document_changed(MemoryDocument::new("/tmp/a.py", "python", "py"));
	client.on_document_changed(MemoryDocument::new("/tmp/notes.md", "markdown", "# notes"));
	let scheduled = Instant::now();
	client.settle().await;

	let sent = transport.sent.lock();
	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].1.language, "markdown");
	assert_eq!(sent[0].0 - scheduled, Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_focus_pushes_immediately() {
	let (client, transport) = recording_client(SyncConfig::new());
	let editor = MemoryEditor::new(MemoryDocument::new("/tmp/a.py", "python", "focused"));
	let start = Instant::now();

	client.on_active_editor_changed(Some(&editor));
	client.settle().await;

	assert_eq!(transport.snapshots(), vec![snapshot("/tmp/a.py", "focused")]);
	assert_eq!(transport.times()[0], start);
}

#[tokio::test(start_paused = true)]
async fn test_focus_on_untracked_or_no_editor_is_ignored() {
	let (client, transport) = recording_client(SyncConfig::new());
	let editor = MemoryEditor::new(MemoryDocument::new("/tmp/main.rs", "rust", "fn main() {}"));

	client.on_active_editor_changed(Some(&editor));
	client.on_active_editor_changed(None);
	client.settle().await;

	assert!(transport.snapshots().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_focus_keeps_pending_timer_by_default() {
	let (client, transport) = recording_client(SyncConfig::new());
	let edited = MemoryDocument::new("/tmp/edited.py", "python", "edit");
	let focused = MemoryEditor::new(MemoryDocument::new("/tmp/focused.py", "python", "focus"));
	let start = Instant::now();

	client.on_document_changed(edited);
	sleep(Duration::from_millis(100)).await;
	client.on_active_editor_changed(Some(&focused));
	assert!(client.is_pending());
	client.settle().await;

	assert_eq!(
		transport.snapshots(),
		vec![snapshot("/tmp/focused.py", "focus"), snapshot("/tmp/edited.py", "edit")]
	);
	let times = transport.times();
	assert_eq!(times[0] - start, Duration::from_millis(100));
	assert_eq!(times[1] - start, DEBOUNCE);
}

#[tokio::test(start_paused = true)]
async fn test_focus_cancels_pending_timer_when_configured() {
	let config = SyncConfig::new().with_focus_policy(FocusPolicy::CancelPending);
	let (client, transport) = recording_client(config);
	let edited = MemoryDocument::new("/tmp/edited.py", "python", "edit");
	let focused = MemoryEditor::new(MemoryDocument::new("/tmp/focused.py", "python", "focus"));

	client.on_document_changed(edited);
	sleep(Duration::from_millis(100)).await;
	client.on_active_editor_changed(Some(&focused));
	assert!(!client.is_pending());
	sleep(Duration::from_secs(1)).await;

	assert_eq!(transport.snapshots(), vec![snapshot("/tmp/focused.py", "focus")]);
}

#[tokio::test(start_paused = true)]
async fn test_untracked_focus_never_cancels_pending_timer() {
	let config = SyncConfig::new().with_focus_policy(FocusPolicy::CancelPending);
	let (client, transport) = recording_client(config);
	let edited = MemoryDocument::new("/tmp/edited.py", "python", "edit");
	let other = MemoryEditor::new(MemoryDocument::new("/tmp/main.rs", "rust", ""));

	client.on_document_changed(edited);
	client.on_active_editor_changed(Some(&other));
	assert!(client.is_pending());
	client.settle().await;

	assert_eq!(transport.snapshots(), vec![snapshot("/tmp/edited.py", "edit")]);
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_logs_once_and_does_not_stick() {
	let counter = WarnCounter::default();
	let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));

	let transport = Arc::new(RefusingTransport::default());
	let client = BufferSyncClient::with_transport(SyncConfig::new(), transport.clone()).unwrap();
	let doc = MemoryDocument::new("/tmp/a.py", "python", "a");

	client.on_document_changed(doc.clone());
	client.settle().await;
	assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
	assert_eq!(counter.0.load(Ordering::SeqCst), 1);

	client.on_document_changed(doc.clone());
	client.settle().await;
	assert_eq!(transport.attempts.load(Ordering::SeqCst), 2);
	assert_eq!(counter.0.load(Ordering::SeqCst), 2);
	assert!(!client.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_delivery_outcome_surfaces_transport_failure() {
	let client = BufferSyncClient::with_transport(SyncConfig::new(), Arc::new(RefusingTransport::default())).unwrap();
	let doc = MemoryDocument::new("/tmp/a.py", "python", "a");

	let err = client.push_content(&*doc).outcome().await.unwrap_err();
	assert!(err.is_transport(), "unexpected error: {err}");
}

#[tokio::test(start_paused = true)]
async fn test_activation_routes_host_events_until_deactivated() {
	let (client, transport) = recording_client(SyncConfig::new());
	let mut hub = EventHub::new();
	let activation = activate(&mut hub, Arc::new(client));
	assert_eq!(hub.listener_count(), 1);

	let doc = MemoryDocument::new("/tmp/a.py", "python", "hub");
	hub.emit_change(doc.clone());
	hub.emit_focus(Some(&MemoryEditor::new(doc.clone())));

	let client = activation.deactivate(&mut hub);
	assert_eq!(hub.listener_count(), 0);
	hub.emit_change(doc.clone());
	client.settle().await;

	assert_eq!(
		transport.snapshots(),
		vec![snapshot("/tmp/a.py", "hub"), snapshot("/tmp/a.py", "hub")]
	);
}

#[tokio::test(start_paused = true)]
async fn test_events_from_a_host_thread_run_on_the_bound_runtime() {
	let transport = Arc::new(RecordingTransport::default());
	let tasks = Tasks::on(tokio::runtime::Handle::current());
	let client = BufferSyncClient::with_tasks(SyncConfig::new(), transport.clone(), tasks);
	let doc = MemoryDocument::new("/tmp/ui.py", "python", "from ui thread");

	std::thread::scope(|s| {
		s.spawn(|| client.on_document_changed(doc.clone()));
	});
	assert!(client.is_pending());

	client.settle().await;
	assert_eq!(transport.snapshots(), vec![snapshot("/tmp/ui.py", "from ui thread")]);
}

#[test]
fn test_client_requires_a_runtime() {
	let err = BufferSyncClient::with_transport(SyncConfig::new(), Arc::new(RecordingTransport::default())).unwrap_err();
	assert!(matches!(err, Error::NoRuntime(_)), "{err}");
}

//! Host-side event wiring.
//!
//! The client never talks to a concrete editor API. A host implements
//! [`EditorHost`] and forwards its change and focus notifications to every
//! subscribed [`EditorListener`].

use std::sync::Arc;

use tracing::info;

use crate::client::BufferSyncClient;
use crate::document::{TextDocument, TextEditor};

/// Receiver of editor notifications.
pub trait EditorListener: Send + Sync {
	/// A document's text changed.
	fn on_change(&self, document: Arc<dyn TextDocument>);

	/// Focus moved to `editor`, or away from every editor.
	fn on_focus_change(&self, editor: Option<&dyn TextEditor>);
}

/// Identifies one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A source of editor notifications listeners can register with.
pub trait EditorHost {
	fn subscribe(&mut self, listener: Arc<dyn EditorListener>) -> SubscriptionId;

	/// Removes a registration. Unknown ids are ignored.
	fn unsubscribe(&mut self, id: SubscriptionId);
}

/// Sequential subscription id generator.
#[derive(Debug, Default, Clone, Copy)]
struct SubscriptionIds(u64);

impl SubscriptionIds {
	fn next(&mut self) -> SubscriptionId {
		self.0 += 1;
		SubscriptionId(self.0)
	}
}

/// In-process host that fans events out in subscription order.
#[derive(Default)]
pub struct EventHub {
	ids: SubscriptionIds,
	listeners: Vec<(SubscriptionId, Arc<dyn EditorListener>)>,
}

impl std::fmt::Debug for EventHub {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventHub")
			.field("listeners", &self.listeners.len())
			.finish()
	}
}

impl EventHub {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn emit_change(&self, document: Arc<dyn TextDocument>) {
		for (_, listener) in &self.listeners {
			listener.on_change(document.clone());
		}
	}

	pub fn emit_focus(&self, editor: Option<&dyn TextEditor>) {
		for (_, listener) in &self.listeners {
			listener.on_focus_change(editor);
		}
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}
}

impl EditorHost for EventHub {
	fn subscribe(&mut self, listener: Arc<dyn EditorListener>) -> SubscriptionId {
		let id = self.ids.next();
		self.listeners.push((id, listener));
		id
	}

	fn unsubscribe(&mut self, id: SubscriptionId) {
		self.listeners.retain(|(existing, _)| *existing != id);
	}
}

/// A client registered with a host.
#[derive(Debug)]
pub struct Activation {
	subscription: SubscriptionId,
	client: Arc<BufferSyncClient>,
}

/// Registers `client` for change and focus notifications from `host`.
pub fn activate(host: &mut dyn EditorHost, client: Arc<BufferSyncClient>) -> Activation {
	let subscription = host.subscribe(client.clone());
	info!(
		subscription = subscription.0,
		endpoint = client.config().endpoint.as_str(),
		"bufbridge.activate"
	);
	Activation { subscription, client }
}

impl Activation {
	pub fn client(&self) -> &Arc<BufferSyncClient> {
		&self.client
	}

	/// Unregisters the client. A debounced push that is still pending is
	/// left to fire.
	pub fn deactivate(self, host: &mut dyn EditorHost) -> Arc<BufferSyncClient> {
		host.unsubscribe(self.subscription);
		info!(subscription = self.subscription.0, "bufbridge.deactivate");
		self.client
	}
}

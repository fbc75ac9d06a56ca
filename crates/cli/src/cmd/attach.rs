use std::io;
use std::sync::Arc;
use std::time::Duration;

use bufbridge_sync::{BufferSyncClient, EventHub, FocusPolicy, PYTHON_LANGUAGE, activate};
use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use super::EndpointArgs;
use crate::events::{HostEvent, OpenDocuments};

#[derive(Args, Debug)]
pub struct AttachArgs {
	#[command(flatten)]
	pub endpoint: EndpointArgs,

	/// Quiet period after the last change before a push, in milliseconds
	#[arg(long, value_name = "MS", default_value_t = 500)]
	pub debounce_ms: u64,

	/// Language to track (repeatable). Defaults to python.
	#[arg(long = "language", value_name = "ID")]
	pub languages: Vec<String>,

	/// Drop a pending debounced push when focus moves to a tracked editor
	#[arg(long)]
	pub cancel_on_focus: bool,
}

pub async fn run(args: AttachArgs) -> anyhow::Result<()> {
	let languages = if args.languages.is_empty() {
		vec![PYTHON_LANGUAGE.to_string()]
	} else {
		args.languages
	};
	let policy = if args.cancel_on_focus {
		FocusPolicy::CancelPending
	} else {
		FocusPolicy::KeepPending
	};
	let config = args
		.endpoint
		.sync_config()?
		.with_debounce(Duration::from_millis(args.debounce_ms))
		.with_languages(languages)
		.with_focus_policy(policy);

	info!(endpoint = %config.endpoint, languages = ?config.languages, "bufbridge.attach.start");

	let client = Arc::new(BufferSyncClient::new(config)?);
	let mut hub = EventHub::new();
	let activation = activate(&mut hub, client);
	let mut open = OpenDocuments::default();

	let applied = pump(BufReader::new(tokio::io::stdin()), &hub, &mut open).await?;

	debug!(applied, documents = open.len(), "bufbridge.attach.eof");
	let client = activation.deactivate(&mut hub);
	client.settle().await;
	info!("bufbridge.attach.done");
	Ok(())
}

/// Feeds every event line from `input` to `hub` until end of input.
/// Returns how many events were applied.
async fn pump<R>(input: R, hub: &EventHub, open: &mut OpenDocuments) -> io::Result<usize>
where
	R: AsyncBufRead + Unpin,
{
	let mut applied = 0;
	let mut lines = input.lines();
	while let Some(line) = lines.next_line().await? {
		if line.trim().is_empty() {
			continue;
		}
		match HostEvent::parse(&line) {
			Ok(event) => {
				open.dispatch(hub, event);
				applied += 1;
			}
			Err(error) => warn!(%error, "bufbridge.attach.bad_event"),
		}
	}
	Ok(applied)
}

pub mod attach;
pub mod push;
pub mod serve;

use bufbridge_sync::{DEFAULT_ENDPOINT, SyncConfig};
use clap::Args;

/// Where snapshots are posted.
#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
	/// Receiver URL
	#[arg(long, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
	pub endpoint: String,
}

impl EndpointArgs {
	pub fn sync_config(&self) -> anyhow::Result<SyncConfig> {
		Ok(SyncConfig::new().with_endpoint_str(&self.endpoint)?)
	}
}

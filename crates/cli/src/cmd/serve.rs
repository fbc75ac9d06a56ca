use std::net::SocketAddr;

use bufbridge_receiver::{BufferStore, DEFAULT_PORT, Receiver, ReceiverConfig};
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct ServeArgs {
	/// Address to listen on
	#[arg(long, value_name = "ADDR", default_value_t = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))]
	pub addr: SocketAddr,
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
	let config = ReceiverConfig::new().with_addr(args.addr);
	let handle = Receiver::bind(&config, BufferStore::new())?.spawn()?;
	info!(url = %handle.update_url(), "bufbridge.serve.ready");

	tokio::task::spawn_blocking(move || handle.join()).await??;
	Ok(())
}

//! bufbridge command line.
//!
//! - `attach`: host a sync client fed by JSON editor events on stdin
//! - `push`: send one file snapshot
//! - `serve`: run the local receiver

use clap::{Parser, Subcommand};

mod cmd;
mod events;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "bufbridge", version)]
#[command(about = "Mirror editor buffers to a local process over HTTP")]
struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Read editor events from stdin and sync tracked buffers
	Attach(cmd::attach::AttachArgs),
	/// Send a single file snapshot to the receiver
	Push(cmd::push::PushArgs),
	/// Run the receiver in the foreground
	Serve(cmd::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	// Logs go to stderr; stdin carries editor events in `attach`.
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if cli.verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		})
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	match cli.command {
		Command::Attach(args) => cmd::attach::run(args).await,
		Command::Push(args) => cmd::push::run(args).await,
		Command::Serve(args) => cmd::serve::run(args).await,
	}
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use bufbridge_sync::{BufferSyncClient, MemoryDocument};
use clap::Args;
use tracing::info;

use super::EndpointArgs;

#[derive(Args, Debug)]
pub struct PushArgs {
	/// File whose contents are sent
	pub file: PathBuf,

	/// Language identifier. Inferred from the extension when omitted.
	#[arg(long)]
	pub language: Option<String>,

	#[command(flatten)]
	pub endpoint: EndpointArgs,
}

/// Maps a file extension to the editor's language identifier.
fn language_for_path(path: &Path) -> Option<&'static str> {
	let language = match path.extension()?.to_str()? {
		"py" | "pyi" | "pyw" => "python",
		"rs" => "rust",
		"js" | "mjs" | "cjs" => "javascript",
		"ts" => "typescript",
		"go" => "go",
		"md" => "markdown",
		"json" => "json",
		"toml" => "toml",
		"sh" => "shellscript",
		_ => return None,
	};
	Some(language)
}

/// Loads `file` as a document, resolving its absolute path and language.
fn load(file: &Path, language: Option<String>) -> anyhow::Result<std::sync::Arc<MemoryDocument>> {
	let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
	let path = std::path::absolute(file)?;
	let language = match language {
		Some(language) => language,
		None => language_for_path(&path)
			.with_context(|| format!("cannot infer language of {}; pass --language", path.display()))?
			.to_string(),
	};
	Ok(MemoryDocument::new(path, language, text))
}

pub async fn run(args: PushArgs) -> anyhow::Result<()> {
	let document = load(&args.file, args.language)?;
	let client = BufferSyncClient::new(args.endpoint.sync_config()?)?;

	client
		.push_content(&*document)
		.outcome()
		.await
		.with_context(|| format!("pushing to {}", args.endpoint.endpoint))?;
	info!(file = %args.file.display(), "bufbridge.push.sent");
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use bufbridge_sync::TextDocument;

	use super::*;

	#[test]
	fn infers_language_from_extension() {
		assert_eq!(language_for_path(Path::new("/src/app.py")), Some("python"));
		assert_eq!(language_for_path(Path::new("stubs/os.pyi")), Some("python"));
		assert_eq!(language_for_path(Path::new("main.rs")), Some("rust"));
		assert_eq!(language_for_path(Path::new("Makefile")), None);
		assert_eq!(language_for_path(Path::new("notes.unknown")), None);
	}

	#[test]
	fn load_reads_file_with_absolute_path() {
		let mut file = tempfile::Builder::new().suffix(".py").tempfile().unwrap();
		writeln!(file, "print('hi')").unwrap();

		let document = load(file.path(), None).unwrap();
		assert!(document.file_name().is_absolute());
		assert_eq!(document.language_id(), "python");
		assert_eq!(document.text(), "print('hi')\n");
	}

	#[test]
	fn explicit_language_wins() {
		let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
		let document = load(file.path(), Some("python".into())).unwrap();
		assert_eq!(document.language_id(), "python");
		assert_eq!(document.text(), "");
	}

	#[test]
	fn unknown_extension_without_language_fails() {
		let file = tempfile::Builder::new().suffix(".dat").tempfile().unwrap();
		let err = load(file.path(), None).unwrap_err();
		assert!(err.to_string().contains("--language"), "{err}");
	}
}

use std::process::{Command, Stdio};
use std::sync::OnceLock;

use jitcc::{Bridge, BridgeConfig};
use tempfile::TempDir;

/// `cc` when it runs, otherwise `None` and the calling test is skipped.
pub fn c_compiler() -> Option<&'static str> {
	static FOUND: OnceLock<bool> = OnceLock::new();
	let found = *FOUND.get_or_init(|| {
		Command::new("cc")
			.arg("--version")
			.stdout(Stdio::null())
			.stderr(Stdio::null())
			.status()
			.is_ok_and(|status| status.success())
	});
	found.then_some("cc")
}

pub const SHARED: &str = "cc -shared -fPIC";

/// A bridge compiling C into its own temporary directory.
pub fn bridge() -> Option<(Bridge, TempDir)> {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
	let compiler = c_compiler()?;
	let dir = tempfile::tempdir().expect("tempdir");
	let bridge = Bridge::new(BridgeConfig {
		temp_dir: Some(dir.path().to_path_buf()),
		source_extension: "c".into(),
		compiler: Some(compiler.into()),
		..Default::default()
	});
	Some((bridge, dir))
}

macro_rules! require_compiler {
	() => {
		match common::bridge() {
			Some(pair) => pair,
			None => {
				eprintln!("skipping: no C compiler on PATH");
				return;
			}
		}
	};
}
pub(crate) use require_compiler;

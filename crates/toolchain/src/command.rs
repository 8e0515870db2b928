//! Compiler command parsing and discovery.

use std::process::{Command, Stdio};
use std::sync::OnceLock;

/// Splits a command string on whitespace, keeping quoted runs together.
///
/// Single and double quotes group; the quote characters themselves are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
	let mut tokens = Vec::new();
	let mut current = String::new();
	let mut in_token = false;
	let mut quote = None;

	for ch in text.chars() {
		match quote {
			Some(q) if ch == q => quote = None,
			Some(_) => current.push(ch),
			None if ch == '"' || ch == '\'' => {
				quote = Some(ch);
				in_token = true;
			}
			None if ch.is_whitespace() => {
				if in_token {
					tokens.push(std::mem::take(&mut current));
					in_token = false;
				}
			}
			None => {
				current.push(ch);
				in_token = true;
			}
		}
	}
	if in_token {
		tokens.push(current);
	}
	tokens
}

/// Whether a command string carries the `-v` verbosity token.
pub fn requests_verbose(text: &str) -> bool {
	has_verbose_flag(&tokenize(text))
}

fn has_verbose_flag(tokens: &[String]) -> bool {
	tokens.iter().any(|t| t == "-v")
}

/// A parsed compiler invocation, excluding input and output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
	program: String,
	args: Vec<String>,
	verbose: bool,
}

impl CompilerCommand {
	/// Parses `text`. When it is empty or starts with an option,
	/// `default_compiler` is consulted for the program; `None` is returned if
	/// it has none.
	pub fn parse<'a>(text: &str, default_compiler: impl FnOnce() -> Option<&'a str>) -> Option<Self> {
		let mut tokens = tokenize(text);
		let verbose = has_verbose_flag(&tokens);
		if tokens.first().is_none_or(|first| first.starts_with('-')) {
			tokens.insert(0, default_compiler()?.to_string());
		}
		let program = tokens.remove(0);
		Some(Self {
			program,
			args: tokens,
			verbose,
		})
	}

	pub fn program(&self) -> &str {
		&self.program
	}

	pub fn args(&self) -> &[String] {
		&self.args
	}

	/// Whether the command carried the `-v` verbosity token.
	pub fn verbose(&self) -> bool {
		self.verbose
	}

	pub(crate) fn to_command(&self) -> Command {
		let mut cmd = Command::new(&self.program);
		cmd.args(&self.args);
		cmd
	}
}

impl std::fmt::Display for CompilerCommand {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.program)?;
		for arg in &self.args {
			write!(f, " {arg}")?;
		}
		Ok(())
	}
}

fn first_available(candidates: &[&'static str]) -> Option<&'static str> {
	candidates
		.iter()
		.copied()
		.find(|name| Command::new(name).arg("--version").stdout(Stdio::null()).stderr(Stdio::null()).status().is_ok())
}

/// Resolves the compiler used when a command carries only options.
///
/// `$CXX` wins, otherwise common C++ driver names are tried once per process.
pub fn resolve_default_compiler() -> Option<&'static str> {
	static COMPILER: OnceLock<Option<&'static str>> = OnceLock::new();
	*COMPILER.get_or_init(|| {
		#[cfg(windows)]
		const CANDIDATES: &[&str] = &["cl", "clang-cl", "clang++", "g++"];
		#[cfg(not(windows))]
		const CANDIDATES: &[&str] = &["c++", "clang++", "g++"];

		let found = std::env::var("CXX")
			.ok()
			.filter(|cxx| !cxx.trim().is_empty())
			.map(|cxx| cxx.leak() as &str)
			.or_else(|| first_available(CANDIDATES));
		tracing::debug!(compiler = ?found, "resolved default compiler");
		found
	})
}

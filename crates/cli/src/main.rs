//! jitcc command line driver.
//!
//! Compiles a source file into the running process and optionally drives one
//! of the objects it exports, reports the platform, or raises a signal.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use jitcc::signal::{self, Signal, SignalError};
use jitcc::{
	Bridge, BridgeConfig, BridgeError, ConfigError, HostApi, Invocation, InvocationContext, InvokeError, SourceUnit, ThreadMode,
};
use thiserror::Error;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "jitcc")]
#[command(about = "Compile C or C++ at run time, load it, and call into it")]
struct Cli {
	/// Verbose logging; also reports each bridge step
	#[arg(short, long, global = true)]
	verbose: bool,

	/// Bridge configuration file
	#[arg(short, long, global = true, value_name = "PATH")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Compile a source file, load it, and call its entry point
	Run(RunArgs),
	/// Print the platform name and identifying macros
	Os,
	/// Raise an operating system signal by name
	Raise {
		/// One of SIGTERM, SIGSEGV, SIGINT, SIGILL, SIGABRT, SIGFPE
		signal: String,
	},
}

#[derive(Args, Debug)]
struct RunArgs {
	/// Source file to compile
	source: PathBuf,

	/// Entry point called once after loading
	#[arg(short, long)]
	entry: String,

	/// Compiler and flags; a leading option selects the default compiler
	#[arg(long, default_value = "-shared -fPIC", allow_hyphen_values = true)]
	command: String,

	/// Space-delimited libraries loaded globally before the module
	#[arg(long, default_value = "")]
	libs: String,

	/// Prepend the jitcc C header to the source
	#[arg(long)]
	header: bool,

	/// Factory to instantiate after the entry point returns
	#[arg(long)]
	factory: Option<String>,

	/// Update ticks to run on the instance
	#[arg(long, default_value_t = 1)]
	ticks: u32,

	/// Thread mode: 1 init, 2 update, 3 both. With 2, a second call site runs init
	#[arg(long, default_value_t = 3)]
	mode: i32,

	/// Block size passed in the invocation context
	#[arg(long, default_value_t = 32)]
	ksmps: u32,

	/// Number of output slots
	#[arg(long, default_value_t = 1)]
	outputs: usize,

	/// Comma-separated input values
	#[arg(long, value_delimiter = ',')]
	inputs: Vec<f64>,
}

#[derive(Debug, Error)]
enum CliError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error("failed to read {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error(transparent)]
	Bridge(#[from] BridgeError),
	#[error(transparent)]
	Invoke(#[from] InvokeError),
	#[error(transparent)]
	Signal(#[from] SignalError),
}

impl CliError {
	fn status(&self) -> i32 {
		match self {
			Self::Bridge(err) => err.status(),
			Self::Invoke(err) => err.status(),
			_ => 1,
		}
	}
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match execute(cli) {
		Ok(code) => exit_code(code),
		Err(err) => {
			eprintln!("jitcc: {err}");
			exit_code(err.status())
		}
	}
}

fn execute(cli: Cli) -> Result<i32, CliError> {
	match cli.command {
		Command::Os => {
			let platform = jitcc::platform::Platform::identify();
			println!("Macros defined are: \"{}\"", platform.macros());
			println!("Platform ABI is: \"{}\"", platform.name);
			Ok(0)
		}
		Command::Raise { signal: name } => {
			let signal: Signal = name.parse()?;
			signal::raise(signal)?;
			Ok(0)
		}
		Command::Run(args) => {
			let mut config = match &cli.config {
				Some(path) => BridgeConfig::load(path)?,
				None => BridgeConfig::default(),
			}
			.with_env_overrides();
			config.verbose |= cli.verbose;
			run(&Bridge::new(config), args)
		}
	}
}

fn run(bridge: &Bridge, args: RunArgs) -> Result<i32, CliError> {
	let host = HostApi::fallback();
	let source = std::fs::read_to_string(&args.source).map_err(|source| CliError::Read {
		path: args.source.clone(),
		source,
	})?;
	let mut unit = SourceUnit::new(args.entry, source, args.command).dependency_list(&args.libs);
	if args.header {
		unit = unit.with_header();
	}

	let result = bridge.compile_and_run(&unit, host)?;
	info!(entry = %unit.entry_point, result, "entry point returned");
	println!("{} returned {result}", unit.entry_point);

	let Some(factory) = args.factory else {
		return Ok(result);
	};
	let mode = ThreadMode::from_raw(args.mode)?;
	let mut outputs = vec![0.0; args.outputs];
	let ctx = InvocationContext::new(args.ksmps, outputs.len(), args.inputs.len());

	// An update-only site needs a second site that runs init on the same instance.
	let invocation = Invocation::create(bridge, &factory, mode, host)?;
	let init_site = (!mode.runs_init()).then(|| invocation.attach(ThreadMode::INIT));
	init_site
		.as_ref()
		.unwrap_or(&invocation)
		.init(host, &ctx, &mut outputs, &args.inputs)?;
	println!("init: {outputs:?}");

	if mode.runs_update() {
		for tick in 0..args.ticks {
			invocation.kontrol(host, &mut outputs, &args.inputs)?;
			println!("kontrol {tick}: {outputs:?}");
		}
	} else if args.ticks > 0 {
		info!(mode = args.mode, "mode excludes update ticks");
	}
	invocation.noteoff(host)?;
	Ok(result)
}

fn exit_code(status: i32) -> ExitCode {
	match status {
		0 => ExitCode::SUCCESS,
		code => ExitCode::from(u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1)),
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("jitcc=debug,jitcc_abi=debug,jitcc_loader=debug,jitcc_toolchain=debug,info")
		} else {
			EnvFilter::new("warn,jitcc::module=info")
		}
	});
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

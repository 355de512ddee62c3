//! Stratus CLI
//!
//! Entry point of the `stratus` binary. The dynamic command path is
//! resolved against the plugin-merged command tree, so clap only owns the
//! outer frame (version, verbosity, config path) and hands the trailing
//! arguments to the splitter.
//!
//! ## Usage
//!
//! ```bash
//! stratus deploy --stage prod
//! stratus deploy function -f resize
//! stratus info
//! ```

mod args;
mod builtin;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stratus_core::{EngineError, ServiceContext, ServiceDescription};
use stratus_lifecycle::PluginManager;

#[derive(Parser)]
#[command(name = "stratus")]
#[command(about = "Pluggable infrastructure deployment", long_about = None)]
#[command(version)]
struct Cli {
	/// Path to the service configuration file (defaults to probing the
	/// current directory for stratus.yml / stratus.yaml / stratus.json)
	#[arg(long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbosity: u8,

	/// Command path followed by its options, e.g. `deploy --stage prod`
	#[arg(trailing_var_arg = true, allow_hyphen_values = true)]
	command: Vec<String>,
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let code = match run(cli).await {
		Ok(()) => 0,
		Err(err) => report(&err),
	};
	process::exit(code);
}

async fn run(cli: Cli) -> Result<(), EngineError> {
	let (path, options) = args::split(&cli.command)?;
	let service = load_service(cli.config.as_deref())?;

	let ctx = Arc::new(ServiceContext::new(service, options));
	install_interrupt_handler(&ctx);

	let manager = PluginManager::build(&builtin::default_loader(), ctx).await?;

	if path.is_empty() {
		render_help(&manager);
		return Ok(());
	}
	manager.run(&path).await
}

fn load_service(config: Option<&std::path::Path>) -> Result<ServiceDescription, EngineError> {
	match config {
		Some(path) => ServiceDescription::from_file(path),
		None => {
			let cwd = std::env::current_dir()
				.map_err(|err| EngineError::Config(format!("cannot resolve working directory: {err}")))?;
			match ServiceDescription::discover(&cwd) {
				Some(found) => {
					debug!(target: "stratus::cli", config = %found.display(), "service file");
					ServiceDescription::from_file(&found)
				}
				// Service-independent commands still work without a
				// service file; service-dependent hooks reject this.
				None => Ok(ServiceDescription::default()),
			}
		}
	}
}

/// Ctrl-C flips the shared cancel token; the invoker stops scheduling
/// handlers at the next boundary and the run exits with the interrupt
/// code. A second ctrl-c kills the process the hard way.
fn install_interrupt_handler(ctx: &Arc<ServiceContext>) {
	let token = ctx.cancel_token().clone();
	if let Err(err) = ctrlc::set_handler(move || {
		if token.is_cancelled() {
			process::exit(130);
		}
		eprintln!("Interrupt received; finishing the current operation (press again to force quit)");
		token.cancel();
	}) {
		debug!(target: "stratus::cli", "cannot install interrupt handler: {err}");
	}
}

fn render_help(manager: &PluginManager) {
	println!("Commands:");
	for node in manager.public_commands() {
		println!("  {:<24} {}", node.display_path(), node.usage);
	}
	println!("\nOptions follow the command, e.g. \"stratus deploy --stage prod\".");
}

fn report(err: &EngineError) -> i32 {
	match err {
		EngineError::Cancelled => {
			eprintln!("Cancelled");
		}
		EngineError::HandlerFailure { hook, plugin, source } => {
			eprintln!("Error: {err}");
			eprintln!("  hook:   {hook}");
			eprintln!("  plugin: {plugin}");
			eprintln!("  cause:  {source}");
		}
		_ => {
			eprintln!("Error: {err}");
		}
	}
	err.exit_code()
}

fn init_tracing(verbosity: u8) {
	let default = match verbosity {
		0 => "info",
		1 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_env("STRATUS_LOG")
		.unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.init();
}

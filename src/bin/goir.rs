//! `goir`: collect Go declarations under a directory and hand them to plugins.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use goir::config::{ConfigFile, Overrides};
use goir::{Config, Error, Outcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const PREFIX: &str = "[goir]";
const LOG_ENV: &str = "GOIR_LOG";

#[derive(Parser)]
#[command(name = "goir", version, about = "Collect Go declarations into a JSON IR for generator plugins")]
struct Args {
    /// Directory to walk for Go sources [default: .]
    #[arg(long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Print the collected document to stdout instead of running plugins
    #[arg(long)]
    debug: bool,

    /// Plugin to run, as "<program> [args...]:out=<dir>"; repeatable
    #[arg(long = "plugin", value_name = "PLUGIN")]
    plugins: Vec<String>,

    /// TOML file with input, debug and [[plugins]] entries
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level unless GOIR_LOG or RUST_LOG says otherwise
    #[arg(long, short)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("{PREFIX} tracing subscriber already initialized");
    }
}

fn fail(context: &str, err: impl std::fmt::Display) -> ExitCode {
    eprintln!("{PREFIX} {context}: {err}");
    ExitCode::FAILURE
}

fn try_main(args: Args) -> Result<(), Error> {
    let file = args.config.as_deref().map(ConfigFile::load).transpose()?;
    let overrides = Overrides {
        input: args.input,
        debug: args.debug,
        plugins: args.plugins,
    };
    let config = Config::build(file, overrides)?;

    match goir::run(&config)? {
        Outcome::Debug(doc) => println!("{doc}"),
        Outcome::Plugins(report) => report.into_result()?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match try_main(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Plugins(err)) => {
            eprintln!("{PREFIX} accumulated plugin errors:");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
        Err(err @ Error::Config(_)) => fail("config error", err),
        Err(err) => fail("run failed", err),
    }
}

//! # Till Terminal Library
//!
//! The cashier front end: flags, configuration, logging, and the
//! read-eval-redraw loop.
//!
//! ## Module Organization
//! ```text
//! till_terminal/
//! ├── lib.rs          ◄─── You are here (startup & loop)
//! ├── commands.rs     ◄─── Line parsing and execution
//! └── view.rs         ◄─── Lookup and cart panel rendering
//! ```

pub mod commands;
pub mod view;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use till_client::{ClientConfig, HttpBackend, PosBackend, Register};

use commands::{Step, HELP};

/// Command-line flags. Each one overrides the config file and environment.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "till", version, about = "Cashier terminal for a Till POS backend")]
pub struct Args {
    /// Config file (default: the per-user till.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Operator code sent with each purchase
    #[arg(long, value_name = "CODE")]
    pub operator: Option<String>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    pub write_config: bool,
}

/// Runs the terminal until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Terminal Startup                                  │
/// │                                                                         │
/// │  1. Initialize Logging ──── tracing-subscriber to stderr, RUST_LOG     │
/// │  2. Load Configuration ──── defaults → till.toml → TILL_* → flags      │
/// │  3. Build HttpBackend ───── reqwest client with configured timeouts    │
/// │  4. Loop ───────────────── read line → execute → redraw                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(args: Args) -> anyhow::Result<()> {
    init_tracing();

    let config = resolve_config(&args)?;

    if args.write_config {
        config
            .save(args.config.clone())
            .context("writing configuration")?;
        return Ok(());
    }

    info!(base_url = %config.base_url(), "Starting till");

    let backend = HttpBackend::new(&config.api).context("building HTTP client")?;
    let register = Register::new(backend, config.operator_code());

    repl(register, &config).await
}

/// Loads configuration and applies command-line overrides.
pub fn resolve_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::load(args.config.clone()).context("loading configuration")?;

    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(code) = &args.operator {
        config.operator.code = code.clone();
    }

    config.validate().context("invalid command-line override")?;
    Ok(config)
}

async fn repl<B: PosBackend>(mut register: Register<B>, config: &ClientConfig) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", view::render(register.session(), &config.display));
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let step = match commands::parse(&line) {
            Ok(command) => commands::execute(&mut register, command).await,
            Err(e) => Err(e),
        };

        match step {
            Ok(Step::Quit) => break,
            Ok(Step::Help) => println!("{}", HELP),
            Ok(Step::Redraw) => println!("{}", view::render(register.session(), &config.display)),
            Err(e) => println!("{}", e),
        }
        prompt()?;
    }

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they never interleave with the screen on stdout.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Every request and dispatch
/// - `RUST_LOG=till_client=trace` - Trace for the client crate only
/// - Default: warnings, plus info from till crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,till=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("till.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://10.0.0.5:8000\"\n").unwrap();

        let args = Args::parse_from([
            "till",
            "--config",
            path.to_str().unwrap(),
            "--api-url",
            "http://127.0.0.1:9000",
            "--operator",
            "E042",
        ]);
        let config = resolve_config(&args).unwrap();

        assert_eq!(config.base_url(), "http://127.0.0.1:9000");
        assert_eq!(config.operator_code(), "E042");
    }

    #[test]
    fn test_bad_flag_value_is_rejected() {
        let args = Args {
            api_url: Some("ftp://nowhere".into()),
            ..Args::default()
        };
        assert!(resolve_config(&args).is_err());
    }
}

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use redisview_core::config::{ConfigSources, ConnectionConfig, ProfileFile};
use redisview_core::diagnostics::{self, DiagnosticReceiver, Severity};
use redisview_core::Session;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod console;
mod error;
mod output;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        error::diagnose(&e).print();
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag.
    // Diagnostics are printed by the front end, so their tracing mirror is
    // only shown from -vv up.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "redisview=warn,redisview_core=warn,redisview_core::diagnostics=off",
            1 => "redisview=info,redisview_core=info,redisview_core::diagnostics=off",
            2 => "redisview=debug,redisview_core=debug",
            _ => "redisview=trace,redisview_core=trace,redis=debug",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

/// Layer defaults, the config file profile, `REDIS_URL`, flags and `--url`
fn resolve_config(cli: &Cli) -> Result<ConnectionConfig> {
    let file = match &cli.config_file {
        Some(path) => {
            debug!("Loading config from explicit path: {:?}", path);
            ProfileFile::load_from_path(path)?
        }
        None => {
            debug!("Loading config from default location");
            ProfileFile::load()?
        }
    };

    let sources = ConfigSources {
        profile: file.select(cli.profile.as_deref())?.cloned(),
        flags: cli.connection.overrides(),
        url: cli.connection.url.clone(),
        ..Default::default()
    }
    .with_env();

    Ok(sources.resolve()?)
}

async fn print_diagnostics(mut rx: DiagnosticReceiver) {
    while let Some(diagnostic) = rx.recv().await {
        let label = match diagnostic.severity {
            Severity::Debug => "debug".dimmed(),
            Severity::Info => "info".blue(),
            Severity::Warning => "warning".yellow(),
            Severity::Error => "error".red(),
        };
        eprintln!("{}{} {}", label.bold(), ":".bold(), diagnostic.message);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;

    let (tx, rx) = diagnostics::channel(diagnostics::DEFAULT_CAPACITY);
    let printer = tokio::spawn(print_diagnostics(rx));

    let session = Session::new(config, tx)?.with_command_syntax(cli.command_syntax());
    let result = commands::execute(cli, &session).await;

    // Closing the last sender lets the printer finish
    let dropped = session.diagnostics().dropped();
    drop(session);
    if printer.await.is_err() {
        warn!("Diagnostic printer stopped unexpectedly");
    }
    if dropped > 0 {
        warn!("{} diagnostic message(s) were dropped", dropped);
    }

    result
}

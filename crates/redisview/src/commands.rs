//! One-shot subcommands

use anyhow::Result;
use redisview_core::Session;
use tracing::{debug, info};

use crate::cli::{Cli, Commands, OutputFormat};
use crate::console;
use crate::output;

pub async fn execute(cli: &Cli, session: &Session) -> Result<()> {
    let format = cli.output;

    match &cli.command {
        Commands::Keys { pattern } => keys(session, pattern.as_deref(), format).await,
        Commands::Info => {
            let summary = session.server_info().await?;
            println!("{}", output::render_info(&summary, format)?);
            Ok(())
        }
        Commands::Ping => {
            let reply = session.ping().await?;
            println!("{}", reply);
            Ok(())
        }
        Commands::Inspect { key } => {
            let details = session.inspect(key).await?;
            println!("{}", output::render_details(&details, format)?);
            Ok(())
        }
        Commands::Exec { command } => {
            let line = command.join(" ");
            debug!("Executing command line: {}", line);
            let reply = session.execute(&line).await?;
            println!("{}", output::render_reply(&reply, format)?);
            Ok(())
        }
        Commands::Console => console::run(session, format).await,
    }
}

async fn keys(session: &Session, pattern: Option<&str>, format: OutputFormat) -> Result<()> {
    let keys = match pattern {
        Some(pattern) => session.keys(pattern).await?,
        None => {
            let sample = session.all_keys(false).await?;
            info!("Sampled {} key(s); the listing may be incomplete", sample.len());
            sample.to_vec()
        }
    };

    if !keys.is_empty() || format == OutputFormat::Json {
        println!("{}", output::render_keys(&keys, format)?);
    }
    Ok(())
}

//! Fatal error reporting
//!
//! Errors reach `main` as `anyhow::Error`; known core errors get a tip.

use colored::Colorize;
use redisview_core::{ConfigError, CoreError};

/// Cargo-style diagnostic formatter for CLI errors.
///
/// ```text
/// error: invalid scheme: http
///   while resolving the connection settings
///
///   tip: connection URLs look like:
///       redis://[:password@]host[:port][/db][?cluster=true]
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example lines
    pub fn tip(mut self, description: &str, lines: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            lines.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print to stderr
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, lines) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for line in lines {
                eprintln!("      {}", line);
            }
        }
    }
}

const URL_FORMAT: &str = "redis://[:password@]host[:port][/db][?cluster=true]";

fn config_diagnostic(err: &ConfigError) -> CliDiagnostic {
    let diagnostic =
        CliDiagnostic::error(&err.to_string()).detail("while resolving the connection settings");

    match err {
        ConfigError::InvalidScheme(_)
        | ConfigError::InvalidPort(_)
        | ConfigError::InvalidDatabase(_)
        | ConfigError::MalformedUrl { .. } => diagnostic.tip(
            "connection URLs look like this (use rediss:// for TLS):",
            &[URL_FORMAT],
        ),
        ConfigError::ProfileNotFound { .. } => diagnostic.tip(
            "define the profile in the config file, or pick another one:",
            &["redisview --profile <name> ..."],
        ),
        ConfigError::ParseError(_) | ConfigError::LoadError { .. } => diagnostic.tip(
            "point at a different file, or fix this one:",
            &["redisview --config-file <path> ..."],
        ),
        ConfigError::ConfigDirError => diagnostic,
    }
}

/// Build the diagnostic for a fatal error
pub fn diagnose(err: &anyhow::Error) -> CliDiagnostic {
    if let Some(config) = err.downcast_ref::<ConfigError>() {
        return config_diagnostic(config);
    }

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::Config(config)) => config_diagnostic(config),
        Some(core) if core.is_connection_error() || core.is_timeout() => {
            CliDiagnostic::error(&core.to_string()).tip(
                "check that the server is reachable, or pick another one:",
                &["redisview -h <host> -p <port> ping"],
            )
        }
        Some(CoreError::KeyNotFound(_)) => CliDiagnostic::error(&err.to_string())
            .tip("list keys to find the right name:", &["redisview keys '<pattern>'"]),
        Some(core) => CliDiagnostic::error(&core.to_string()),
        None => {
            let diagnostic = CliDiagnostic::error(&err.to_string());
            match err.chain().nth(1) {
                Some(source) => diagnostic.detail(&source.to_string()),
                None => diagnostic,
            }
        }
    }
}

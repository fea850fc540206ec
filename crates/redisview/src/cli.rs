//! CLI structure and command definitions
//!
//! Connection flags follow redis-cli, so `-h` is the host and help is only
//! available as `--help`.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use redisview_core::ConnectionOverrides;
use redisview_core::exec::CommandSyntax;

/// Browse and query a Redis server or cluster
#[derive(Parser, Debug)]
#[command(name = "redisview")]
#[command(version, about = "Browse and query a Redis server or cluster")]
#[command(disable_help_flag = true, disable_help_subcommand = true)]
#[command(long_about = "
Browse and query a Redis server or cluster

Connection settings are layered, lowest to highest:
    built-in defaults (127.0.0.1:6379, db 0)
    profile from the config file
    REDIS_URL
    individual flags (-h, -p, -a, -n, --tls, ...)
    --url

EXAMPLES:
    # Sample the keyspace of a local server
    redisview keys

    # Every key matching a pattern
    redisview -h cache.internal -n 2 keys 'session:*'

    # Server summary over TLS
    redisview --url rediss://:secret@cache.internal:6380/0 info

    # Run a command
    redisview exec SET greeting hello

    # Interactive console with command tracing
    redisview --debug console
")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Profile from the config file
    #[arg(long, global = true, env = "REDISVIEW_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "REDISVIEW_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Split commands on whitespace and honor quotes instead of single spaces
    #[arg(long, global = true)]
    pub quoted_commands: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print help
    #[arg(long, global = true, action = ArgAction::Help)]
    pub help: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn command_syntax(&self) -> CommandSyntax {
        if self.quoted_commands {
            CommandSyntax::Quoted
        } else {
            CommandSyntax::Verbatim
        }
    }
}

/// Connection flags. Each one takes part in resolution only when given.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Server hostname
    #[arg(short = 'h', long, global = true)]
    pub host: Option<String>,

    /// Server port
    #[arg(short = 'p', long, global = true)]
    pub port: Option<u16>,

    /// Password
    #[arg(short = 'a', long, global = true)]
    pub password: Option<String>,

    /// Database number
    #[arg(short = 'n', long, global = true)]
    pub db: Option<u32>,

    /// Connect in cluster mode
    #[arg(short = 'c', long, global = true)]
    pub cluster: bool,

    /// Trace every command sent to the server
    #[arg(long, visible_alias = "vvv", global = true)]
    pub debug: bool,

    /// Use TLS
    #[arg(long, global = true)]
    pub tls: bool,

    /// Client certificate (PEM)
    #[arg(long, global = true, value_name = "FILE")]
    pub tls_cert: Option<PathBuf>,

    /// Client private key (PEM)
    #[arg(long, global = true, value_name = "FILE")]
    pub tls_key: Option<PathBuf>,

    /// CA certificate (PEM)
    #[arg(long, global = true, value_name = "FILE")]
    pub tls_ca_cert: Option<PathBuf>,

    /// Verify the server certificate
    #[arg(long, global = true, value_name = "BOOL")]
    pub tls_verify: Option<bool>,

    /// Connection URL; overrides every other setting
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,
}

impl ConnectionArgs {
    /// Flags the user actually supplied, as a configuration layer
    pub fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            url: None,
            host: self.host.clone(),
            port: self.port,
            password: self.password.clone(),
            db: self.db,
            cluster: self.cluster.then_some(true),
            debug: self.debug.then_some(true),
            tls: self.tls.then_some(true),
            tls_verify: self.tls_verify,
            tls_cert: self.tls_cert.clone(),
            tls_key: self.tls_key.clone(),
            tls_ca_cert: self.tls_ca_cert.clone(),
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// Top-level commands. Each one disables its own `-h` so the global host
/// flag stays usable after the subcommand name.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List keys: every key matching PATTERN, or a sample of the keyspace
    #[command(after_help = "EXAMPLES:
    # Up to 1000 keys, cached for a minute in the console
    redisview keys

    # Full scan for one pattern
    redisview keys 'user:*'
")]
    #[command(disable_help_flag = true)]
    Keys {
        /// Glob-style pattern; omit to sample the whole keyspace
        pattern: Option<String>,
    },

    /// Show server version, memory use and keyspace stats
    #[command(disable_help_flag = true)]
    Info,

    /// Check that the server answers
    #[command(disable_help_flag = true)]
    Ping,

    /// Show a key's type, TTL and value
    #[command(disable_help_flag = true)]
    Inspect {
        key: String,
    },

    /// Send a raw command and print the reply
    #[command(after_help = "EXAMPLES:
    redisview exec SET greeting hello
    redisview exec 'HGETALL user:1'
    redisview --quoted-commands exec 'SET greeting \"hello world\"'
")]
    #[command(disable_help_flag = true)]
    Exec {
        /// Command and arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Read commands from stdin, one per line
    #[command(disable_help_flag = true)]
    Console,
}

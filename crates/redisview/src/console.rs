//! Line-oriented console
//!
//! Each stdin line is either a raw command or a `:`-prefixed console
//! command. Errors are printed and the loop continues.

use std::io::{IsTerminal, Write};

use anyhow::Result;
use redisview_core::Session;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::OutputFormat;
use crate::output;

const PROMPT: &str = "redisview> ";

const HELP: &str = "\
:keys [PATTERN]   sample all keys (cached for 60s) or list keys matching PATTERN
:info             server summary
:inspect KEY      type, TTL and value of KEY
:refresh          drop the cached key sample
:help             this text
quit | exit       leave the console
anything else is sent to the server as a command";

/// What one input line asks for
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Quit,
    Help,
    Keys(Option<&'a str>),
    Info,
    Inspect(&'a str),
    Refresh,
    Unknown(&'a str),
    Command(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
        return Input::Quit;
    }

    let Some(meta) = trimmed.strip_prefix(':') else {
        return Input::Command(trimmed);
    };

    let (name, arg) = match meta.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (meta, None),
    };

    match (name, arg) {
        ("keys", pattern) => Input::Keys(pattern),
        ("info", None) => Input::Info,
        ("inspect", Some(key)) => Input::Inspect(key),
        ("refresh", None) => Input::Refresh,
        ("help", _) => Input::Help,
        _ => Input::Unknown(trimmed),
    }
}

fn prompt(out: &mut impl Write, interactive: bool) {
    if !interactive {
        return;
    }
    if let Err(e) = write!(out, "{}", PROMPT).and_then(|_| out.flush()) {
        debug!("Failed to write prompt: {}", e);
    }
}

async fn handle(session: &Session, input: Input<'_>, format: OutputFormat) -> Result<()> {
    match input {
        Input::Keys(Some(pattern)) => {
            let keys = session.keys(pattern).await?;
            println!("{}", output::render_keys(&keys, format)?);
        }
        Input::Keys(None) => {
            let keys = session.all_keys(true).await?;
            println!("{}", output::render_keys(&keys, format)?);
        }
        Input::Info => {
            let summary = session.server_info().await?;
            println!("{}", output::render_info(&summary, format)?);
        }
        Input::Inspect(key) => {
            let details = session.inspect(key).await?;
            println!("{}", output::render_details(&details, format)?);
        }
        Input::Refresh => session.refresh().await,
        Input::Help => println!("{}", HELP),
        Input::Unknown(line) => println!("(error) unknown console command '{}', try :help", line),
        Input::Command(line) => match session.execute(line).await {
            Ok(reply) => println!("{}", output::render_reply(&reply, format)?),
            Err(e) => println!("(error) {}", e),
        },
        Input::Empty | Input::Quit => {}
    }
    Ok(())
}

/// Run until stdin closes or the user quits
pub async fn run(session: &Session, format: OutputFormat) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();

    if interactive {
        match session.server_info().await {
            Ok(summary) => println!("{}", summary),
            Err(e) => session.diagnostics().warning(e.to_string()),
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(&mut std::io::stdout(), interactive);

    while let Some(line) = lines.next_line().await? {
        let input = parse_input(&line);
        debug!("Console input: {:?}", input);
        if input == Input::Quit {
            break;
        }

        if let Err(e) = handle(session, input, format).await {
            println!("(error) {}", e);
        }
        prompt(&mut std::io::stdout(), interactive);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_command_keeps_inner_spacing() {
        assert_eq!(parse_input("  SET a  b\r"), Input::Command("SET a  b"));
    }

    #[test]
    fn test_console_commands() {
        assert_eq!(parse_input(":keys"), Input::Keys(None));
        assert_eq!(parse_input(":keys user:*"), Input::Keys(Some("user:*")));
        assert_eq!(parse_input(" :inspect  k1 "), Input::Inspect("k1"));
        assert_eq!(parse_input(":refresh"), Input::Refresh);
        assert_eq!(parse_input("EXIT"), Input::Quit);
        assert_eq!(parse_input("   "), Input::Empty);
    }

    struct UnflushableWriter(Vec<u8>);

    impl Write for UnflushableWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_prompt_survives_flush_failure() {
        let mut out = UnflushableWriter(Vec::new());
        prompt(&mut out, true);
        assert_eq!(out.0, PROMPT.as_bytes());
    }

    #[test]
    fn test_no_prompt_when_piped() {
        let mut out = Vec::new();
        prompt(&mut out, false);
        assert!(out.is_empty());
    }

    #[test]
    fn test_bad_console_commands() {
        assert_eq!(parse_input(":inspect"), Input::Unknown(":inspect"));
        assert_eq!(parse_input(":info now"), Input::Unknown(":info now"));
        assert_eq!(parse_input(":flush"), Input::Unknown(":flush"));
    }
}

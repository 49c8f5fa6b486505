//! Diagnostics for the `mockbank` binary.
//!
//! Receipts, balances and listings are the program's output and go to
//! stdout. Everything emitted through `tracing` goes to stderr, filtered by
//! `RUST_LOG` when it is set and by the command's [`LogProfile`] otherwise.

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Commands;

/// Shape of each log line on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    /// One JSON object per line.
    Json,
}

/// How chatty a command is when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogProfile {
    /// A single command whose stdout a person is reading. Only warnings
    /// and errors, without timestamps.
    OneShot,
    /// The long-running HTTP server. Startup, shutdown and one line per
    /// request.
    Server,
}

impl LogProfile {
    pub fn for_command(command: &Commands) -> Self {
        match command {
            Commands::Serve(_) => Self::Server,
            _ => Self::OneShot,
        }
    }

    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub fn default_directives(self) -> &'static str {
        match self {
            Self::OneShot => "mockbank=warn,mockbank_ledger=warn",
            Self::Server => "mockbank=info,mockbank_ledger=info,tower_http=debug",
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directives()))
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(profile: LogProfile, format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(profile.filter());
    let stderr = fmt::layer().with_writer(std::io::stderr);

    match (format, profile) {
        (LogFormat::Json, _) => registry.with(stderr.json()).try_init(),
        (LogFormat::Pretty, LogProfile::Server) => registry.with(stderr).try_init(),
        (LogFormat::Pretty, LogProfile::OneShot) => registry
            .with(stderr.without_time().with_target(false))
            .try_init(),
    }
    .context("failed to install tracing subscriber")?;

    tracing::debug!(?profile, ?format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::MockbankCli;
    use clap::Parser;

    fn profile_of(args: &[&str]) -> LogProfile {
        let cli = MockbankCli::try_parse_from(args).unwrap();
        LogProfile::for_command(&cli.command)
    }

    #[test]
    fn only_serve_logs_requests() {
        assert_eq!(profile_of(&["mockbank", "serve"]), LogProfile::Server);
        assert_eq!(profile_of(&["mockbank", "balance"]), LogProfile::OneShot);
        assert_eq!(
            profile_of(&["mockbank", "top-up", "--amount", "5"]),
            LogProfile::OneShot
        );
        assert!(LogProfile::Server
            .default_directives()
            .contains("tower_http=debug"));
        assert!(!LogProfile::OneShot.default_directives().contains("info"));
    }

    #[test]
    fn default_directives_parse() {
        for profile in [LogProfile::OneShot, LogProfile::Server] {
            assert!(EnvFilter::try_new(profile.default_directives()).is_ok());
        }
    }

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(LogFormat::from_str("JSON", true), Ok(LogFormat::Json));
        assert_eq!(LogFormat::from_str("pretty", true), Ok(LogFormat::Pretty));
        assert!(LogFormat::from_str("xml", true).is_err());
    }
}

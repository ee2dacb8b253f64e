use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::error::{Error, Result};

#[derive(Parser, Debug)]
#[command(name = "skygraph")]
#[command(about = "Fetch and analyze the social graph of a Bluesky account", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Bluesky handle or DID to analyze (e.g. alice.bsky.social)
    #[arg(long)]
    pub actor: String,

    /// Your Bluesky handle, for authenticated access
    #[arg(long, env = "BSKY_HANDLE")]
    pub handle: Option<String>,

    /// Your Bluesky app password (Settings > App Passwords)
    #[arg(long, env = "BSKY_APP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Export format: json or csv (omit for a console summary)
    #[arg(long)]
    pub export: Option<String>,

    /// Output file path (defaults to stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also emit plain follower/follow rows in CSV output
    #[arg(long)]
    pub include_raw: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(Error::Config(format!(
                "unsupported export format '{other}' (expected json or csv)"
            ))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Login credentials for `com.atproto.server.createSession`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

/// Validated run options. Produced before any network activity.
#[derive(Debug)]
pub struct RunOptions {
    pub actor: String,
    pub credentials: Option<Credentials>,
    pub export: Option<ExportFormat>,
    pub output: Option<PathBuf>,
    pub include_raw: bool,
}

impl Cli {
    /// Validate the raw arguments into run options.
    ///
    /// Fails with `Error::Config` on an unknown export format or on a
    /// half-supplied credential pair.
    pub fn into_options(self) -> Result<RunOptions> {
        let export = self.export.as_deref().map(ExportFormat::from_str).transpose()?;

        let credentials = match (self.handle, self.password) {
            (Some(identifier), Some(password)) => Some(Credentials { identifier, password }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "authenticated mode needs both --handle and --password".to_string(),
                ))
            }
        };

        Ok(RunOptions {
            actor: self.actor,
            credentials,
            export,
            output: self.output,
            include_raw: self.include_raw,
        })
    }
}

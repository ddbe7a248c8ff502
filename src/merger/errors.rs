// Error types for each step of a merge run

use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::models::StreamKind;

/// Failure while resolving a URL into a resource with stream variants
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Network timeout while talking to the platform
    #[error("Network timeout: the platform is not responding")]
    NetworkTimeout,

    /// The platform refused the request (429, bot detection, etc.)
    #[error(
        "The platform is temporarily throttling requests from your IP address.\n\
         This usually resolves on its own in a few hours.\n\n\
         What you can do:\n\
         1) Wait and try again later\n\
         2) Use --proxy\n\
         3) Try a different network"
    )]
    Blocked,

    /// yt-dlp not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// URL rejected by the resolver
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Command execution failed
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Unknown error with details
    #[error("Unknown error: {0}")]
    Unknown(String),
}

lazy_static! {
    // "bot" as a word, not inside "robots" or "both"
    static ref BOT_WORD: Regex = Regex::new(r"(?i)\bbot\b").unwrap();
}

// Classify raw resolver stderr
impl From<String> for ResolveError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();
        let timed_out = lower.contains("timeout") || lower.contains("timed out");

        // Timeouts against the platform itself are soft IP blocks
        if timed_out && (lower.contains("youtube.com") || lower.contains("googlevideo")) {
            return Self::Blocked;
        }

        if timed_out {
            return Self::NetworkTimeout;
        }

        if lower.contains("429") || lower.contains("blocked") || BOT_WORD.is_match(&s) {
            return Self::Blocked;
        }

        if is_spawn_failure(&s) {
            return Self::ToolNotFound(s);
        }

        if lower.contains("invalid url") || lower.contains("unsupported url") {
            return Self::InvalidUrl(s);
        }

        if lower.contains("parse") || lower.contains("json") {
            return Self::ParseError(s);
        }

        Self::Unknown(s)
    }
}

/// The resolver binary could not be launched at all.
///
/// yt-dlp's own "HTTP Error 404: Not Found" must not land here.
fn is_spawn_failure(s: &str) -> bool {
    s.starts_with("Failed to start ")
        || s.contains("No such file")
        || s.contains("command not found")
}

/// Failure while writing one stream to disk
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered with status {0}")]
    Status(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of the external muxing process
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", exit_label(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "signal".to_string(),
    }
}

/// Tagged result of a whole merge run, one variant per step
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("No {0} stream available")]
    MissingStream(StreamKind),

    #[error("Transfer of {kind} stream failed: {source}")]
    Transfer {
        kind: StreamKind,
        #[source]
        source: TransferError,
    },

    #[error("Merge failed: {0}")]
    Mux(#[from] MuxError),

    #[error("Failed to remove {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Error types and failure classification for pr-scout
//!
//! Every external command failure is mapped onto a small set of
//! [`ErrorKind`]s; the kind drives both the remediation message shown to the
//! user and whether the retry layer will attempt the call again.

use thiserror::Error;

/// Result type alias for pr-scout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Underlying failure messages longer than this are truncated before being
/// embedded in a user-visible error.
pub const MAX_CAUSE_LEN: usize = 200;

/// Errors that can occur in pr-scout
#[derive(Debug, Error)]
pub enum Error {
    /// The GitHub CLI binary could not be found
    #[error("GitHub CLI (gh) not found; install it from https://cli.github.com")]
    CliMissing,

    /// The GitHub CLI is installed but not authenticated
    #[error("not authenticated with GitHub; run 'gh auth login'")]
    AuthRequired,

    /// The API rate limit was hit
    #[error("rate limited while fetching {repo}; wait and retry later")]
    RateLimited {
        /// Repository the call was scoped to ("owner/name")
        repo: String,
    },

    /// The repository does not exist or is not accessible
    #[error("repository {repo} not found; check access and the configured remote")]
    RepoNotFound {
        /// Repository the call was scoped to ("owner/name")
        repo: String,
    },

    /// A transient connectivity failure
    #[error("network error while fetching {repo}: {cause}")]
    Network {
        /// Repository the call was scoped to ("owner/name")
        repo: String,
        /// Truncated underlying message
        cause: String,
    },

    /// A failure that matched no known pattern
    #[error("fetching {repo} failed: {cause}")]
    Unclassified {
        /// Repository the call was scoped to ("owner/name")
        repo: String,
        /// Truncated underlying message
        cause: String,
    },

    /// A retriable operation failed on every attempt
    #[error("giving up after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts actually performed
        attempts: u32,
        /// The last failure
        #[source]
        source: Box<Error>,
    },

    /// The CLI produced output that could not be parsed
    #[error("failed to parse gh output: {0}")]
    Parse(String),

    /// An external command could not be spawned
    #[error("failed to run '{command}': {cause}")]
    Spawn {
        /// The command that failed to start
        command: String,
        /// Truncated underlying message
        cause: String,
    },

    /// Internal invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// The classified category of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The CLI binary is not installed
    CliMissing,
    /// Authentication is required
    AuthRequired,
    /// The API rate limit was hit
    RateLimited,
    /// The repository could not be resolved
    RepoNotFound,
    /// A transient connectivity failure
    NetworkTransient,
    /// Anything else
    Unclassified,
}

impl Error {
    /// The classified kind of this error
    ///
    /// `RetriesExhausted` reports the kind of the failure it wraps.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CliMissing => ErrorKind::CliMissing,
            Self::AuthRequired => ErrorKind::AuthRequired,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::RepoNotFound { .. } => ErrorKind::RepoNotFound,
            Self::Network { .. } => ErrorKind::NetworkTransient,
            Self::RetriesExhausted { source, .. } => source.kind(),
            Self::Unclassified { .. } | Self::Parse(_) | Self::Spawn { .. } | Self::Internal(_) => {
                ErrorKind::Unclassified
            }
        }
    }

    /// Whether retrying this error can never succeed
    ///
    /// Terminal kinds require user action (install, re-authenticate, wait out
    /// the rate limit, fix repository access) rather than another attempt.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CliMissing
                | ErrorKind::AuthRequired
                | ErrorKind::RateLimited
                | ErrorKind::RepoNotFound
        )
    }
}

/// Truncate a raw failure message to [`MAX_CAUSE_LEN`] characters
#[must_use]
pub fn truncate_cause(message: &str) -> String {
    let message = message.trim();
    if message.chars().count() <= MAX_CAUSE_LEN {
        return message.to_string();
    }
    let truncated: String = message.chars().take(MAX_CAUSE_LEN).collect();
    format!("{truncated}...")
}

/// Classify a raw external-command failure into an [`Error`]
///
/// Inspects the combined error text and captured stderr case-insensitively,
/// in priority order: rate limiting, repository resolution, authentication,
/// connectivity, and finally a catch-all that preserves the (truncated)
/// message. Pure; performs no I/O.
#[must_use]
pub fn classify(message: &str, repo: &str) -> Error {
    let text = message.to_lowercase();

    if text.contains("rate limit") || text.contains("ratelimit") {
        return Error::RateLimited {
            repo: repo.to_string(),
        };
    }

    if text.contains("could not resolve") || text.contains("not found") || text.contains("no such repository") {
        return Error::RepoNotFound {
            repo: repo.to_string(),
        };
    }

    if text.contains("401")
        || text.contains("403")
        || text.contains("not logged in")
        || text.contains("auth")
    {
        return Error::AuthRequired;
    }

    if text.contains("timeout")
        || text.contains("timed out")
        || text.contains("connection")
        || text.contains("dial")
        || text.contains("network")
    {
        return Error::Network {
            repo: repo.to_string(),
            cause: truncate_cause(message),
        };
    }

    Error::Unclassified {
        repo: repo.to_string(),
        cause: truncate_cause(message),
    }
}

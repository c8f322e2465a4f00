//! Core types for pr-scout

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A locally cloned repository, as discovered by the scanner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoDescriptor {
    /// Repository name (e.g. "pr-scout")
    pub name: String,
    /// Absolute path to the local clone
    pub path: PathBuf,
    /// Repository owner (user or organization)
    pub owner: String,
}

impl RepoDescriptor {
    /// Create a new descriptor
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            owner: owner.into(),
        }
    }

    /// The full "owner/name" identifier used to key per-repository results
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl PrState {
    /// Parse the state string reported by the CLI ("OPEN", "CLOSED", "MERGED")
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "MERGED" => Self::Merged,
            "CLOSED" => Self::Closed,
            _ => Self::Open,
        }
    }
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Aggregate CI status across all of a PR's status checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CiStatus {
    /// At least one check failed
    Failing,
    /// No failures, at least one check still running
    Pending,
    /// All checks passed
    Passing,
    /// No checks configured
    None,
}

/// Check states that count as failing
const FAILING_STATES: [&str; 5] = [
    "FAILURE",
    "ERROR",
    "CANCELLED",
    "TIMED_OUT",
    "ACTION_REQUIRED",
];

/// Check states that count as still running
const PENDING_STATES: [&str; 5] = ["PENDING", "EXPECTED", "QUEUED", "IN_PROGRESS", "WAITING"];

impl CiStatus {
    /// Aggregate individual check states with priority
    /// failing > pending > passing > none.
    #[must_use]
    pub fn aggregate<S: AsRef<str>>(states: &[S]) -> Self {
        let mut pending = false;
        for state in states {
            let state = state.as_ref().to_ascii_uppercase();
            if FAILING_STATES.contains(&state.as_str()) {
                return Self::Failing;
            }
            if PENDING_STATES.contains(&state.as_str()) {
                pending = true;
            }
        }
        if pending {
            Self::Pending
        } else if states.is_empty() {
            Self::None
        } else {
            Self::Passing
        }
    }
}

impl std::fmt::Display for CiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failing => write!(f, "failing"),
            Self::Pending => write!(f, "pending"),
            Self::Passing => write!(f, "passing"),
            Self::None => write!(f, "none"),
        }
    }
}

/// A single review submitted on a PR
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    /// Reviewer login
    pub author: String,
    /// Review state string as reported by the CLI (e.g. "APPROVED")
    pub state: String,
    /// When the review was submitted
    pub submitted_at: Option<DateTime<Utc>>,
}

/// An open pull request fetched from one repository
///
/// Immutable once parsed, except for the `repo_name`/`repo_path` annotation
/// fields stamped by the fetch orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Web URL for the PR
    pub url: String,
    /// Author login
    pub author: String,
    /// Current state of the PR
    pub state: PrState,
    /// Whether the PR is a draft
    pub is_draft: bool,
    /// Aggregate CI status across all status checks
    pub ci_status: CiStatus,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// When the PR was created
    pub created_at: DateTime<Utc>,
    /// Requested reviewer logins
    pub reviewers: Vec<String>,
    /// Assignee logins
    pub assignees: Vec<String>,
    /// Raw review history
    pub reviews: Vec<Review>,
    /// Owning repository name, stamped by the fetch orchestrator
    pub repo_name: String,
    /// Owning repository path, stamped by the fetch orchestrator
    pub repo_path: PathBuf,
}

//! GitHub CLI client
//!
//! Shells out to `gh` with `tokio::process`, classifies command failures,
//! and retries the retriable ones. Parsing happens outside the retry loop:
//! a structural failure on an otherwise-successful response is never worth
//! a second network round trip.

use crate::error::{classify, truncate_cause, Error, Result};
use crate::remote::RemoteClient;
use crate::retry::{Retryer, RetryPolicy};
use crate::types::{CiStatus, PrState, PullRequest, RepoDescriptor, Review};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// JSON fields requested from `gh pr list`
const PR_LIST_FIELDS: &str = "number,title,url,author,state,isDraft,createdAt,baseRefName,headRefName,statusCheckRollup,reviewRequests,assignees,reviews";

/// Maximum PRs fetched per repository
const PR_LIST_LIMIT: &str = "100";

// Serde mirrors of the gh JSON contract

#[derive(Debug, Default, Deserialize)]
struct RawActor {
    #[serde(default)]
    login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatusCheck {
    #[serde(default)]
    state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReview {
    #[serde(default)]
    author: RawActor,
    #[serde(default)]
    state: String,
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPullRequest {
    number: u64,
    title: String,
    url: String,
    #[serde(default)]
    author: RawActor,
    state: String,
    #[serde(default)]
    is_draft: bool,
    created_at: DateTime<Utc>,
    base_ref_name: String,
    head_ref_name: String,
    #[serde(default)]
    status_check_rollup: Vec<RawStatusCheck>,
    #[serde(default)]
    review_requests: Vec<RawActor>,
    #[serde(default)]
    assignees: Vec<RawActor>,
    #[serde(default)]
    reviews: Vec<RawReview>,
}

impl From<RawPullRequest> for PullRequest {
    fn from(raw: RawPullRequest) -> Self {
        let states: Vec<&str> = raw
            .status_check_rollup
            .iter()
            .map(|c| c.state.as_str())
            .collect();
        Self {
            number: raw.number,
            title: raw.title,
            url: raw.url,
            author: raw.author.login,
            state: PrState::parse(&raw.state),
            is_draft: raw.is_draft,
            ci_status: CiStatus::aggregate(&states),
            head_ref: raw.head_ref_name,
            base_ref: raw.base_ref_name,
            created_at: raw.created_at,
            reviewers: raw.review_requests.into_iter().map(|a| a.login).collect(),
            assignees: raw.assignees.into_iter().map(|a| a.login).collect(),
            reviews: raw
                .reviews
                .into_iter()
                .map(|r| Review {
                    author: r.author.login,
                    state: r.state,
                    submitted_at: r.submitted_at,
                })
                .collect(),
            repo_name: String::new(),
            repo_path: std::path::PathBuf::new(),
        }
    }
}

/// Parse the raw `gh pr list --json` output into pull requests
///
/// An empty string or an empty JSON array both mean "no open PRs".
pub fn parse_pr_list(raw: &str) -> Result<Vec<PullRequest>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let parsed: Vec<RawPullRequest> =
        serde_json::from_str(raw).map_err(|e| Error::Parse(e.to_string()))?;
    Ok(parsed.into_iter().map(PullRequest::from).collect())
}

/// GitHub client backed by the `gh` CLI
pub struct GhClient {
    program: String,
    retryer: Retryer,
}

impl GhClient {
    /// Create a client invoking `gh` with the default retry policy
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    /// Create a client invoking `gh` with an explicit retry policy
    #[must_use]
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            program: "gh".to_string(),
            retryer: Retryer::new(policy),
        }
    }

    /// Create a client invoking a different executable (for tests)
    #[must_use]
    pub fn with_program(program: impl Into<String>, retryer: Retryer) -> Self {
        Self {
            program: program.into(),
            retryer,
        }
    }

    /// Spawn the CLI with the given arguments, optionally in a directory
    async fn run(&self, args: &[&str], dir: Option<&Path>) -> Result<Output> {
        let mut command = Command::new(&self.program);
        command.args(args);
        if let Some(dir) = dir {
            command.current_dir(dir);
        }
        command.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CliMissing
            } else {
                Error::Spawn {
                    command: format!("{} {}", self.program, args.join(" ")),
                    cause: truncate_cause(&e.to_string()),
                }
            }
        })
    }

    /// One `gh pr list` invocation, returning raw stdout on success
    async fn run_pr_list(&self, repo: &RepoDescriptor) -> Result<String> {
        let output = self
            .run(
                &[
                    "pr",
                    "list",
                    "--json",
                    PR_LIST_FIELDS,
                    "--limit",
                    PR_LIST_LIMIT,
                ],
                Some(&repo.path),
            )
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify(&stderr, &repo.full_name()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for GhClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteClient for GhClient {
    async fn check_installed(&self) -> Result<()> {
        self.run(&["--version"], None).await?;
        debug!("gh CLI found");
        Ok(())
    }

    async fn check_auth(&self) -> Result<()> {
        let output = self.run(&["auth", "status"], None).await?;
        if !output.status.success() {
            debug!("gh auth status reported failure");
            return Err(Error::AuthRequired);
        }
        Ok(())
    }

    async fn current_identity(&self) -> Result<String> {
        let output = self.run(&["api", "user", "--jq", ".login"], None).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify(&stderr, "user"));
        }
        let login = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if login.is_empty() {
            return Err(Error::Parse("empty login from gh api user".to_string()));
        }
        debug!(login = %login, "resolved identity");
        Ok(login)
    }

    async fn list_pull_requests(&self, repo: &RepoDescriptor) -> Result<Vec<PullRequest>> {
        debug!(repo = %repo.full_name(), "listing pull requests");

        // Retry wraps only the command invocation; parse failures on a
        // successful response are structural and never retried.
        let raw = self.retryer.run(|| self.run_pr_list(repo)).await?;
        let prs = parse_pr_list(&raw)?;

        debug!(repo = %repo.full_name(), count = prs.len(), "listed pull requests");
        Ok(prs)
    }
}

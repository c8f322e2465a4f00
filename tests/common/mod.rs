//! Shared test fixtures

#![allow(dead_code)]

pub mod mock_remote;

use chrono::{DateTime, TimeZone, Utc};
use pr_scout::types::{CiStatus, PrState, PullRequest, RepoDescriptor};

/// Build a repository descriptor rooted under /tmp
pub fn make_repo(name: &str) -> RepoDescriptor {
    RepoDescriptor::new(name, format!("/tmp/{name}"), "acme")
}

/// Deterministic creation time derived from the PR number
pub fn created_at(number: u64) -> DateTime<Utc> {
    let secs = 1_700_000_000_i64 + i64::try_from(number).unwrap_or(0);
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

/// Build an open PR with the given branch pair
pub fn make_pr(number: u64, head: &str, base: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("PR #{number}"),
        url: format!("https://github.com/acme/scout/pull/{number}"),
        author: "octocat".to_string(),
        state: PrState::Open,
        is_draft: false,
        ci_status: CiStatus::None,
        head_ref: head.to_string(),
        base_ref: base.to_string(),
        created_at: created_at(number),
        reviewers: Vec::new(),
        assignees: Vec::new(),
        reviews: Vec::new(),
        repo_name: String::new(),
        repo_path: std::path::PathBuf::new(),
    }
}

/// Build a PR in an explicit state
pub fn make_pr_in_state(number: u64, head: &str, base: &str, state: PrState) -> PullRequest {
    PullRequest {
        state,
        ..make_pr(number, head, base)
    }
}

//! Remote hosting-service access
//!
//! Provides a client trait over the hosting service's CLI, so the fetch
//! orchestrator and tests can swap the real GitHub CLI for a mock.

mod gh;

pub use gh::{parse_pr_list, GhClient};

use crate::error::Result;
use crate::types::{PullRequest, RepoDescriptor};
use async_trait::async_trait;

/// Client trait for per-repository hosting-service operations
///
/// Abstracts the external CLI so the orchestrator can be exercised against
/// mock implementations in tests.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Check that the CLI binary is installed and runnable
    ///
    /// Fails with [`crate::error::Error::CliMissing`] when the binary cannot
    /// be spawned; remediation is installing the CLI.
    async fn check_installed(&self) -> Result<()>;

    /// Check that the CLI is authenticated
    ///
    /// Fails with [`crate::error::Error::AuthRequired`]; remediation is
    /// re-authenticating.
    async fn check_auth(&self) -> Result<()>;

    /// The login of the currently authenticated user
    async fn current_identity(&self) -> Result<String>;

    /// List open pull requests for one repository
    ///
    /// An empty result is a valid empty list, not an error.
    async fn list_pull_requests(&self, repo: &RepoDescriptor) -> Result<Vec<PullRequest>>;
}

/// Verify CLI preconditions and resolve the authenticated identity
///
/// The installed check runs first: a missing binary makes everything else
/// moot, so nothing is parallelized past it. The authentication check and
/// the identity lookup are independent and run concurrently; if both fail,
/// the authentication failure is reported since it is the more actionable
/// root cause.
pub async fn check_and_resolve_identity(client: &dyn RemoteClient) -> Result<String> {
    client.check_installed().await?;

    let (auth, identity) = tokio::join!(client.check_auth(), client.current_identity());
    auth?;
    identity
}

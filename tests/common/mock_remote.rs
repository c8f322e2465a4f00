//! Mock remote client for testing
//!
//! Manually implements `RemoteClient` in the same spirit as the rest of the
//! crate's seams: response maps keyed by repository, call tracking for
//! verification, error injection for failure paths, and in-flight counters
//! for concurrency assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use pr_scout::error::{classify, Error, Result};
use pr_scout::remote::RemoteClient;
use pr_scout::types::{PullRequest, RepoDescriptor};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Configurable mock implementation of `RemoteClient`
pub struct MockRemoteClient {
    /// PR lists per "owner/name"; absent repositories list as empty
    list_responses: Mutex<HashMap<String, Vec<PullRequest>>>,
    /// Raw failure text per "owner/name", classified at call time
    list_errors: Mutex<HashMap<String, String>>,
    /// Optional artificial latency per listing call
    list_delay: Option<Duration>,
    /// Fail the installed check
    fail_installed: bool,
    /// Fail the auth check
    fail_auth: bool,
    /// Identity to return, or None to fail the lookup
    identity: Option<String>,
    // Call tracking
    list_calls: Mutex<Vec<String>>,
    installed_calls: AtomicUsize,
    auth_calls: AtomicUsize,
    identity_calls: AtomicUsize,
    // Concurrency tracking
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockRemoteClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteClient {
    /// A mock that succeeds everywhere and lists no PRs
    pub fn new() -> Self {
        Self {
            list_responses: Mutex::new(HashMap::new()),
            list_errors: Mutex::new(HashMap::new()),
            list_delay: None,
            fail_installed: false,
            fail_auth: false,
            identity: Some("octocat".to_string()),
            list_calls: Mutex::new(Vec::new()),
            installed_calls: AtomicUsize::new(0),
            auth_calls: AtomicUsize::new(0),
            identity_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Set the PR list returned for a repository
    pub fn set_prs(&self, full_name: &str, prs: Vec<PullRequest>) {
        self.list_responses
            .lock()
            .unwrap()
            .insert(full_name.to_string(), prs);
    }

    /// Make listing a repository fail with the given raw error text
    pub fn fail_list(&self, full_name: &str, message: &str) {
        self.list_errors
            .lock()
            .unwrap()
            .insert(full_name.to_string(), message.to_string());
    }

    /// Add artificial latency to every listing call
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    /// Make the installed check fail
    #[must_use]
    pub fn with_missing_cli(mut self) -> Self {
        self.fail_installed = true;
        self
    }

    /// Make the auth check fail
    #[must_use]
    pub fn with_auth_failure(mut self) -> Self {
        self.fail_auth = true;
        self
    }

    /// Make the identity lookup fail
    #[must_use]
    pub fn with_identity_failure(mut self) -> Self {
        self.identity = None;
        self
    }

    /// Repositories listed so far, in call order
    pub fn list_calls(&self) -> Vec<String> {
        self.list_calls.lock().unwrap().clone()
    }

    /// Number of installed checks performed
    pub fn installed_calls(&self) -> usize {
        self.installed_calls.load(Ordering::SeqCst)
    }

    /// Number of auth checks performed
    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// Number of identity lookups performed
    pub fn identity_calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously in-flight listing calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteClient for MockRemoteClient {
    async fn check_installed(&self) -> Result<()> {
        self.installed_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_installed {
            return Err(Error::CliMissing);
        }
        Ok(())
    }

    async fn check_auth(&self) -> Result<()> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_auth {
            return Err(Error::AuthRequired);
        }
        Ok(())
    }

    async fn current_identity(&self) -> Result<String> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        self.identity
            .clone()
            .ok_or_else(|| Error::Parse("no identity configured".to_string()))
    }

    async fn list_pull_requests(&self, repo: &RepoDescriptor) -> Result<Vec<PullRequest>> {
        let full_name = repo.full_name();
        self.list_calls.lock().unwrap().push(full_name.clone());

        self.enter();
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        self.exit();

        if let Some(message) = self.list_errors.lock().unwrap().get(&full_name) {
            return Err(classify(message, &full_name));
        }
        Ok(self
            .list_responses
            .lock()
            .unwrap()
            .get(&full_name)
            .cloned()
            .unwrap_or_default())
    }
}

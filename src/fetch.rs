//! Bounded-concurrency fetch orchestration
//!
//! Dispatches one task per repository, admission-limited by a semaphore so
//! at most `concurrency` listings are in flight at once. Failures are
//! isolated per repository; a single collecting loop drains completions and
//! serializes progress callbacks.

use crate::error::Error;
use crate::remote::RemoteClient;
use crate::types::{PullRequest, RepoDescriptor};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::debug;

/// Default admission limit for concurrent fetches
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Terminal state of one repository's fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// The repository has open PRs; each is stamped with the owning
    /// repository's name and path, and the list is number-sorted
    Fetched(Vec<PullRequest>),
    /// The listing succeeded and the repository has no open PRs
    Empty,
    /// The listing failed; the classified error is captured here and never
    /// aborts sibling repositories
    Failed(Error),
}

/// One repository's descriptor paired with its fetch outcome
#[derive(Debug)]
pub struct RepoFetchResult {
    /// The repository that was fetched
    pub repo: RepoDescriptor,
    /// How the fetch ended
    pub outcome: FetchOutcome,
}

/// Fetches PR lists for many repositories with bounded concurrency
#[derive(Debug, Clone, Copy)]
pub struct Fetcher {
    concurrency: usize,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl Fetcher {
    /// Create a fetcher with the given admission limit
    ///
    /// A limit below 1 normalizes to 1 rather than unbounded.
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// The admission limit this fetcher runs with
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetch all repositories without progress reporting
    pub async fn fetch_all(
        &self,
        repos: Vec<RepoDescriptor>,
        client: Arc<dyn RemoteClient>,
    ) -> Vec<RepoFetchResult> {
        self.fetch_all_with_progress(repos, client, |_, _| {}).await
    }

    /// Fetch all repositories, reporting completions as they happen
    ///
    /// `progress` fires exactly once per repository with a monotonically
    /// increasing completed count and the fixed total, in finish order.
    /// The call blocks until every repository has a terminal outcome;
    /// results come back in input order.
    pub async fn fetch_all_with_progress<F>(
        &self,
        repos: Vec<RepoDescriptor>,
        client: Arc<dyn RemoteClient>,
        mut progress: F,
    ) -> Vec<RepoFetchResult>
    where
        F: FnMut(usize, usize),
    {
        let total = repos.len();
        if total == 0 {
            return Vec::new();
        }
        debug!(total, concurrency = self.concurrency, "fetching repositories");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, RepoFetchResult)>();
        let mut tasks = JoinSet::new();

        for (index, repo) in repos.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let client = Arc::clone(&client);
            let tx = tx.clone();
            tasks.spawn(async move {
                // Holding the owned permit for the task scope guarantees
                // release on every exit path, including failure.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let outcome = fetch_one(client.as_ref(), &repo).await;
                let _ = tx.send((index, RepoFetchResult { repo, outcome }));
            });
        }
        drop(tx);

        // Single collecting consumer: progress callbacks are serialized even
        // though the fetches themselves run in parallel.
        let mut slots: Vec<Option<RepoFetchResult>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        let mut done = 0;
        while let Some((index, result)) = rx.recv().await {
            done += 1;
            progress(done, total);
            slots[index] = Some(result);
        }

        while tasks.join_next().await.is_some() {}

        slots.into_iter().flatten().collect()
    }
}

/// Fetch one repository and map the result to a terminal outcome
async fn fetch_one(client: &dyn RemoteClient, repo: &RepoDescriptor) -> FetchOutcome {
    match client.list_pull_requests(repo).await {
        Ok(prs) if prs.is_empty() => {
            debug!(repo = %repo.full_name(), "no open PRs");
            FetchOutcome::Empty
        }
        Ok(mut prs) => {
            for pr in &mut prs {
                pr.repo_name.clone_from(&repo.name);
                pr.repo_path.clone_from(&repo.path);
            }
            prs.sort_by_key(|pr| pr.number);
            debug!(repo = %repo.full_name(), count = prs.len(), "fetched PRs");
            FetchOutcome::Fetched(prs)
        }
        Err(e) => {
            debug!(repo = %repo.full_name(), error = %e, "fetch failed");
            FetchOutcome::Failed(e)
        }
    }
}

/// Fetch all repositories with a default [`Fetcher`]
pub async fn fetch_all(
    repos: Vec<RepoDescriptor>,
    client: Arc<dyn RemoteClient>,
) -> Vec<RepoFetchResult> {
    Fetcher::default().fetch_all(repos, client).await
}

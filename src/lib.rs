//! pr-scout — aggregate open pull requests across local repositories.
//!
//! Given a set of locally cloned repositories, pr-scout fetches their open
//! pull requests through the GitHub CLI with bounded concurrency, classifies
//! and retries transient failures, and detects "stacked" pull requests
//! (PRs whose base branch is another open PR's head branch).
//!
//! The repository scanner and terminal rendering live outside this crate;
//! it consumes [`types::RepoDescriptor`]s and produces
//! [`fetch::RepoFetchResult`]s plus one [`stack::Stack`] per repository.

pub mod error;
pub mod fetch;
pub mod remote;
pub mod retry;
pub mod stack;
pub mod types;

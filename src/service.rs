// Cached GitHub data service.
// Wraps the raw API client with the cache layer and aggregates the
// portfolio's statistics value.

use crate::cache::{self, CacheStore, FileStore, fetch_with_cache};
use crate::error::Result;
use crate::github::{Commit, GitHubClient, GitHubStats, Profile, Repo, RepoSort};

/// Page size requested for repository listings.
const REPO_PAGE_SIZE: u32 = 100;

/// Default number of recent commits fetched for the featured repository.
pub const DEFAULT_COMMIT_LIMIT: u32 = 5;

/// GitHub data access for the portfolio, cached and stale-tolerant.
pub struct GitHubService {
    client: GitHubClient,
    store: Box<dyn CacheStore>,
    username: String,
}

impl GitHubService {
    /// Create a service for `username` backed by the platform cache
    /// directory.
    pub fn new(username: impl Into<String>) -> Result<Self> {
        Self::with_store(username, Box::new(FileStore::new()?))
    }

    /// Create a service with an injected cache store.
    pub fn with_store(username: impl Into<String>, store: Box<dyn CacheStore>) -> Result<Self> {
        Ok(Self::with_client(username, GitHubClient::new()?, store))
    }

    /// Create a service with an injected client and store.
    pub fn with_client(
        username: impl Into<String>,
        client: GitHubClient,
        store: Box<dyn CacheStore>,
    ) -> Self {
        Self {
            client,
            store,
            username: username.into(),
        }
    }

    /// Fetch the user profile, cached.
    pub async fn get_user_profile(&self) -> Result<Profile> {
        fetch_with_cache(self.store.as_ref(), "profile", || async {
            self.client.get_user(&self.username).await
        })
        .await
    }

    /// Fetch the user's repositories with the given sort criterion, cached.
    pub async fn get_repositories(&self, sort: RepoSort) -> Result<Vec<Repo>> {
        let key = format!("repos-{sort}");
        fetch_with_cache(self.store.as_ref(), &key, || async {
            self.client
                .get_user_repos(&self.username, sort, REPO_PAGE_SIZE)
                .await
        })
        .await
    }

    /// Fetch the most recent commits of one repository, cached.
    pub async fn get_recent_commits(&self, repo: &str, limit: u32) -> Result<Vec<Commit>> {
        let key = format!("commits-{repo}");
        fetch_with_cache(self.store.as_ref(), &key, || async {
            self.client
                .get_repo_commits(&self.username, repo, limit)
                .await
        })
        .await
    }

    /// Aggregate the portfolio's GitHub statistics.
    ///
    /// Profile and star-sorted repositories are fetched concurrently and
    /// both must succeed. The featured repository is the exact name match
    /// when one is given, otherwise the highest-starred repository. Its
    /// recent commits are a non-critical extra: a failure there degrades
    /// to an empty list. Callers that must never show an error substitute
    /// [`fallback_stats`](Self::fallback_stats) when this returns `Err`.
    pub async fn get_github_stats(&self, featured_repo: Option<&str>) -> Result<GitHubStats> {
        let (profile, repos) = tokio::try_join!(
            self.get_user_profile(),
            self.get_repositories(RepoSort::Stars)
        )?;

        let total_stars = repos.iter().map(|r| r.stargazers_count).sum();

        let featured = match featured_repo {
            Some(name) => repos.iter().find(|r| r.name == name).cloned(),
            None => repos.iter().max_by_key(|r| r.stargazers_count).cloned(),
        };

        let recent_commits = match &featured {
            Some(repo) => match self.get_recent_commits(&repo.name, DEFAULT_COMMIT_LIMIT).await {
                Ok(commits) => commits,
                Err(e) => {
                    tracing::warn!(repo = %repo.name, error = %e, "failed to fetch recent commits");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Ok(GitHubStats {
            total_repos: profile.public_repos,
            total_stars,
            followers: profile.followers,
            recent_commits,
            featured_repo: featured,
        })
    }

    /// Fixed aggregate shown when the live path and the cache both fail.
    pub fn fallback_stats() -> GitHubStats {
        GitHubStats {
            total_repos: 12,
            total_stars: 24,
            followers: 4,
            recent_commits: Vec::new(),
            featured_repo: None,
        }
    }

    /// Remove expired entries from this service's cache.
    pub fn cleanup_cache(&self) -> Result<usize> {
        cache::cleanup_expired(self.store.as_ref())
    }

    /// Remove every entry from this service's cache, regardless of age.
    pub fn clear_cache(&self) -> Result<usize> {
        cache::clear_all(self.store.as_ref())
    }
}

// GitHub API response types.
// Defines structs for deserializing GitHub REST API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub html_url: String,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// GitHub repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub homepage: Option<String>,
}

/// GitHub commit as returned by the repository commits endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetail,
    pub html_url: String,
    pub author: Option<CommitActor>,
}

/// The git-level commit payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: CommitSignature,
    pub committer: CommitSignature,
}

/// Name/email/date signature on a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSignature {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

/// The GitHub account associated with a commit, when one is linked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitActor {
    pub login: String,
    pub avatar_url: String,
}

/// Sort criterion for repository listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepoSort {
    #[default]
    Updated,
    Stars,
}

impl RepoSort {
    /// The value sent as the `sort` query parameter, also used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoSort::Updated => "updated",
            RepoSort::Stars => "stars",
        }
    }
}

impl std::fmt::Display for RepoSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated GitHub statistics for the portfolio.
///
/// Derived from the profile, repository list, and commit list; recomputed
/// on every request, never itself cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubStats {
    pub total_repos: u32,
    pub total_stars: u64,
    pub followers: u32,
    pub recent_commits: Vec<Commit>,
    pub featured_repo: Option<Repo>,
}

// GitHub API endpoint functions.
// The raw producers behind the cached accessors.

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{Commit, Profile, Repo, RepoSort};

impl GitHubClient {
    /// Get a user's public profile.
    pub async fn get_user(&self, username: &str) -> Result<Profile> {
        let response = self.get(&format!("/users/{}", username)).await?;
        let profile: Profile = response.json().await?;
        Ok(profile)
    }

    /// Get a user's public repositories with the given sort criterion.
    pub async fn get_user_repos(
        &self,
        username: &str,
        sort: RepoSort,
        per_page: u32,
    ) -> Result<Vec<Repo>> {
        let params = [("sort", sort.as_str()), ("per_page", &per_page.to_string())];
        let response = self
            .get_with_params(&format!("/users/{}/repos", username), &params)
            .await?;
        let repos: Vec<Repo> = response.json().await?;
        Ok(repos)
    }

    /// Get the most recent commits of a repository.
    pub async fn get_repo_commits(
        &self,
        username: &str,
        repo: &str,
        per_page: u32,
    ) -> Result<Vec<Commit>> {
        let params = [("per_page", per_page.to_string())];
        let response = self
            .get_with_params(&format!("/repos/{}/{}/commits", username, repo), &params)
            .await?;
        let commits: Vec<Commit> = response.json().await?;
        Ok(commits)
    }
}

//! History service operations over the GitHub REST API

use async_trait::async_trait;
use forksweep_core::{
    CommitPresence, Comparison, HistoryService, IssueRecord, RateBudget, RepoRecord,
    ServiceResult,
};
use octocrab::commits::PullRequestTarget;
use octocrab::params;
use serde_json::json;
use tracing::{debug, info};

use crate::client::PER_PAGE;
use crate::error::api_error;
use crate::models::{comparison, commit_presence, issue_record, rate_budget, repo_record};
use crate::GitHubClient;

#[async_trait]
impl HistoryService for GitHubClient {
    async fn authenticated_login(&self) -> ServiceResult<String> {
        if let Some(login) = self.cached_login() {
            return Ok(login.to_string());
        }
        let user = self.client().current().user().await.map_err(api_error)?;
        debug!(login = %user.login, "Authenticated");
        Ok(self.remember_login(user.login))
    }

    async fn list_owned_repositories(&self, login: &str) -> ServiceResult<Vec<RepoRecord>> {
        // Private repositories only show up on the token owner's own listing.
        let own = self.authenticated_login().await?.eq_ignore_ascii_case(login);
        let first = if own {
            self.client()
                .current()
                .list_repos_for_authenticated_user()
                .affiliation("owner")
                .per_page(PER_PAGE)
                .send()
                .await
        } else {
            self.client()
                .users(login)
                .repos()
                .r#type(params::users::repos::Type::Owner)
                .per_page(PER_PAGE)
                .send()
                .await
        }
        .map_err(api_error)?;

        let repos = self.client().all_pages(first).await.map_err(api_error)?;
        info!(login, own, count = repos.len(), "Listed repositories");
        Ok(repos.into_iter().map(repo_record).collect())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> ServiceResult<RepoRecord> {
        let repo = self
            .client()
            .repos(owner, name)
            .get()
            .await
            .map_err(api_error)?;
        Ok(repo_record(repo))
    }

    async fn list_open_issues_by_creator(
        &self,
        owner: &str,
        name: &str,
        creator: &str,
    ) -> ServiceResult<Vec<IssueRecord>> {
        let first = self
            .client()
            .issues(owner, name)
            .list()
            .creator(creator)
            .state(params::State::Open)
            .per_page(PER_PAGE)
            .send()
            .await
            .map_err(api_error)?;
        let issues = self.client().all_pages(first).await.map_err(api_error)?;
        Ok(issues.iter().map(issue_record).collect())
    }

    async fn compare_commits(
        &self,
        owner: &str,
        name: &str,
        base: &str,
        head: &str,
    ) -> ServiceResult<Comparison> {
        let compare = self
            .client()
            .commits(owner, name)
            .compare(base, head)
            .send()
            .await
            .map_err(api_error)?;
        Ok(comparison(&compare))
    }

    async fn closed_pulls_for_commit(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> ServiceResult<CommitPresence> {
        let answer = match self
            .client()
            .commits(owner, name)
            .associated_pull_requests(PullRequestTarget::Sha(sha.to_string()))
            .per_page(PER_PAGE)
            .send()
            .await
        {
            Ok(first) => self.client().all_pages(first).await,
            Err(e) => Err(e),
        };
        let presence = commit_presence(answer.map_err(api_error))?;
        debug!(repo = %format!("{}/{}", owner, name), sha, ?presence, "Commit lookup");
        Ok(presence)
    }

    async fn delete_repository(&self, owner: &str, name: &str) -> ServiceResult<()> {
        self.client()
            .repos(owner, name)
            .delete()
            .await
            .map_err(api_error)?;
        info!(repo = %format!("{}/{}", owner, name), "Deleted repository");
        Ok(())
    }

    async fn archive_repository(&self, owner: &str, name: &str) -> ServiceResult<()> {
        // octocrab has no typed repository update.
        let _: serde_json::Value = self
            .client()
            .patch(
                format!("/repos/{}/{}", owner, name),
                Some(&json!({ "archived": true })),
            )
            .await
            .map_err(api_error)?;
        info!(repo = %format!("{}/{}", owner, name), "Archived repository");
        Ok(())
    }

    async fn rate_limit(&self) -> ServiceResult<RateBudget> {
        let limits = self.client().ratelimit().get().await.map_err(api_error)?;
        rate_budget(&limits)
    }
}

//! In-memory history service used by unit tests

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use git2::{Repository, RepositoryInitOptions, Signature};

use crate::service::{
    CommitPresence, Comparison, HistoryService, IssueRecord, ParentLink, PullRef, RateBudget,
    RepoRecord, ServiceError, ServiceResult,
};

pub(crate) fn status(code: u16) -> ServiceError {
    ServiceError::Status {
        status: code,
        message: format!("status {}", code),
    }
}

/// A public, idle, unstarred fork owned by `owner`
pub(crate) fn fork_record(owner: &str, name: &str) -> RepoRecord {
    RepoRecord {
        owner: owner.to_string(),
        name: name.to_string(),
        html_url: Some(format!("https://github.com/{}/{}", owner, name)),
        private: false,
        fork: true,
        archived: false,
        forks_count: 0,
        stargazers_count: 0,
        updated_at: Some(Utc::now() - Duration::days(100)),
        default_branch: "main".to_string(),
        parent: None,
    }
}

pub(crate) fn with_parent(mut record: RepoRecord, owner: &str, name: &str) -> RepoRecord {
    record.parent = Some(ParentLink {
        owner: owner.to_string(),
        name: name.to_string(),
        default_branch: "main".to_string(),
    });
    record
}

pub(crate) fn pull(number: u64) -> PullRef {
    PullRef {
        number,
        title: format!("PR {}", number),
        html_url: None,
        merged: true,
    }
}

#[derive(Default)]
pub(crate) struct FakeService {
    pub login: String,
    pub repos: Vec<RepoRecord>,
    pub details: HashMap<String, ServiceResult<RepoRecord>>,
    pub issues: HashMap<String, ServiceResult<Vec<IssueRecord>>>,
    pub comparisons: HashMap<String, ServiceResult<Comparison>>,
    pub commits: HashMap<(String, String), ServiceResult<CommitPresence>>,
    pub fail_on: HashSet<String>,
    pub remaining: u64,
    /// Delay applied to every commit lookup
    pub delay: Option<std::time::Duration>,
    pub calls: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub archived: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            remaining: 5000,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn archived(&self) -> Vec<String> {
        self.archived.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn mutate(&self, owner: &str, name: &str, log: &Mutex<Vec<String>>) -> ServiceResult<()> {
        let full = format!("{}/{}", owner, name);
        if self.fail_on.contains(&full) {
            return Err(status(500));
        }
        log.lock().unwrap().push(full);
        Ok(())
    }
}

#[async_trait]
impl HistoryService for FakeService {
    async fn authenticated_login(&self) -> ServiceResult<String> {
        self.record("user".to_string());
        Ok(self.login.clone())
    }

    async fn list_owned_repositories(&self, login: &str) -> ServiceResult<Vec<RepoRecord>> {
        self.record(format!("list {}", login));
        Ok(self.repos.clone())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> ServiceResult<RepoRecord> {
        let full = format!("{}/{}", owner, name);
        self.record(format!("get {}", full));
        self.details.get(&full).cloned().unwrap_or(Err(status(404)))
    }

    async fn list_open_issues_by_creator(
        &self,
        owner: &str,
        name: &str,
        creator: &str,
    ) -> ServiceResult<Vec<IssueRecord>> {
        let full = format!("{}/{}", owner, name);
        self.record(format!("issues {} {}", full, creator));
        self.issues.get(&full).cloned().unwrap_or(Ok(Vec::new()))
    }

    async fn compare_commits(
        &self,
        owner: &str,
        name: &str,
        base: &str,
        head: &str,
    ) -> ServiceResult<Comparison> {
        let full = format!("{}/{}", owner, name);
        self.record(format!("compare {} {}...{}", full, base, head));
        self.comparisons
            .get(&full)
            .cloned()
            .unwrap_or(Ok(Comparison::default()))
    }

    async fn closed_pulls_for_commit(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> ServiceResult<CommitPresence> {
        let full = format!("{}/{}", owner, name);
        self.record(format!("pulls {} {}", full, sha));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.commits
            .get(&(full, sha.to_string()))
            .cloned()
            .unwrap_or(Ok(CommitPresence::Absent))
    }

    async fn delete_repository(&self, owner: &str, name: &str) -> ServiceResult<()> {
        self.mutate(owner, name, &self.deleted)
    }

    async fn archive_repository(&self, owner: &str, name: &str) -> ServiceResult<()> {
        self.mutate(owner, name, &self.archived)
    }

    async fn rate_limit(&self) -> ServiceResult<RateBudget> {
        Ok(RateBudget {
            limit: 5000,
            remaining: self.remaining,
            reset: Utc::now() + Duration::minutes(30),
        })
    }
}

/// Create a repository at `path` with one committed file on `main`
///
/// Returns the head commit SHA.
pub(crate) fn init_checkout(path: &Path, origin: Option<&str>) -> String {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(path, &opts).unwrap();

    std::fs::write(path.join("README.md"), "hello\n").unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("README.md")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();

    if let Some(url) = origin {
        repo.remote("origin", url).unwrap();
    }
    oid.to_string()
}

//! Conversion of octocrab models into engine records

use chrono::{TimeZone, Utc};
use forksweep_core::{
    CommitPresence, Comparison, IssueRecord, ParentLink, PullRef, RateBudget, RepoRecord,
    ServiceError, ServiceResult,
};
use octocrab::models::commits::CommitComparison;
use octocrab::models::issues::Issue;
use octocrab::models::pulls::PullRequest;
use octocrab::models::{IssueState, RateLimit, Repository};

/// Message GitHub answers with when a commit is unknown to a repository
const NO_COMMIT_FOUND: &str = "No commit found for SHA";

/// Branch assumed when GitHub leaves `default_branch` out
const FALLBACK_BRANCH: &str = "main";

/// Owner login of `repo`, taken from `full_name` before the owner object
fn owner_login(repo: &Repository) -> String {
    repo.full_name
        .as_deref()
        .and_then(|full| full.split_once('/'))
        .map(|(owner, _)| owner.to_string())
        .or_else(|| repo.owner.as_ref().map(|o| o.login.clone()))
        .unwrap_or_default()
}

fn default_branch(repo: &Repository) -> String {
    repo.default_branch
        .clone()
        .unwrap_or_else(|| FALLBACK_BRANCH.to_string())
}

pub(crate) fn repo_record(repo: Repository) -> RepoRecord {
    let parent = repo.parent.as_deref().map(|p| ParentLink {
        owner: owner_login(p),
        name: p.name.clone(),
        default_branch: default_branch(p),
    });

    RepoRecord {
        owner: owner_login(&repo),
        default_branch: default_branch(&repo),
        html_url: repo.html_url.map(|u| u.to_string()),
        private: repo.private.unwrap_or(false),
        fork: repo.fork.unwrap_or(false),
        archived: repo.archived.unwrap_or(false),
        forks_count: repo.forks_count.map_or(0, u64::from),
        stargazers_count: repo.stargazers_count.map_or(0, u64::from),
        updated_at: repo.updated_at,
        parent,
        name: repo.name,
    }
}

pub(crate) fn issue_record(issue: &Issue) -> IssueRecord {
    IssueRecord {
        number: issue.number,
        is_pull_request: issue.pull_request.is_some(),
    }
}

pub(crate) fn comparison(compare: &CommitComparison) -> Comparison {
    // GitHub never reports negative counts.
    Comparison {
        ahead_by: u64::try_from(compare.ahead_by).unwrap_or(0),
        behind_by: u64::try_from(compare.behind_by).unwrap_or(0),
    }
}

/// `Some` for a closed pull request
fn closed_pull(pr: PullRequest) -> Option<PullRef> {
    if pr.state != Some(IssueState::Closed) {
        return None;
    }
    Some(PullRef {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        html_url: pr.html_url.map(|u| u.to_string()),
        merged: pr.merged_at.is_some(),
    })
}

/// Interpret the commit-to-pulls lookup
///
/// An unknown commit is `Absent`. A known commit keeps only its closed pull
/// requests, which may leave none.
pub(crate) fn commit_presence(
    answer: ServiceResult<Vec<PullRequest>>,
) -> ServiceResult<CommitPresence> {
    match answer {
        Ok(pulls) => Ok(CommitPresence::Present(
            pulls.into_iter().filter_map(closed_pull).collect(),
        )),
        Err(ServiceError::Status { status, message })
            if matches!(status, 404 | 422) && message.contains(NO_COMMIT_FOUND) =>
        {
            Ok(CommitPresence::Absent)
        }
        Err(e) => Err(e),
    }
}

/// Core REST budget out of the rate limit answer
pub(crate) fn rate_budget(limits: &RateLimit) -> ServiceResult<RateBudget> {
    let core = &limits.resources.core;
    let reset = i64::try_from(core.reset)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or_else(|| ServiceError::Transport(format!("Invalid reset time {}", core.reset)))?;
    Ok(RateBudget {
        limit: core.limit as u64,
        remaining: core.remaining as u64,
        reset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repository(value: serde_json::Value) -> Repository {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_fork_detail_with_parent() {
        let repo = repository(json!({
            "id": 1,
            "name": "foo",
            "full_name": "alice/foo",
            "url": "https://api.github.com/repos/alice/foo",
            "html_url": "https://github.com/alice/foo",
            "fork": true,
            "stargazers_count": 3,
            "updated_at": "2024-01-02T03:04:05Z",
            "default_branch": "dev",
            "parent": {
                "id": 2,
                "name": "foo",
                "full_name": "upstream/foo",
                "url": "https://api.github.com/repos/upstream/foo",
                "default_branch": "master"
            }
        }));

        let record = repo_record(repo);
        assert_eq!(record.full_name(), "alice/foo");
        assert!(record.fork);
        assert!(!record.private);
        assert_eq!(record.stargazers_count, 3);
        assert_eq!(record.forks_count, 0);
        assert_eq!(record.default_branch, "dev");
        assert_eq!(
            record.html_url.as_deref(),
            Some("https://github.com/alice/foo")
        );
        let parent = record.parent.unwrap();
        assert_eq!(parent.full_name(), "upstream/foo");
        assert_eq!(parent.default_branch, "master");
        assert_eq!(
            record.updated_at.unwrap().to_rfc3339(),
            "2024-01-02T03:04:05+00:00"
        );
    }

    #[test]
    fn test_list_entry_without_parent() {
        let record = repo_record(repository(json!({
            "id": 3,
            "name": "bar",
            "full_name": "alice/bar",
            "url": "https://api.github.com/repos/alice/bar",
            "fork": true
        })));
        assert!(record.parent.is_none());
        assert!(record.updated_at.is_none());
        assert_eq!(record.default_branch, "main");
    }

    fn pr(number: u64, state: &str, merged: bool) -> PullRequest {
        serde_json::from_value(json!({
            "url": format!("https://api.github.com/repos/alice/foo/pulls/{}", number),
            "id": number,
            "number": number,
            "state": state,
            "title": format!("PR {}", number),
            "html_url": format!("https://github.com/alice/foo/pull/{}", number),
            "merged_at": merged.then_some("2024-01-01T00:00:00Z"),
            "head": { "ref": "feature", "sha": "abc" },
            "base": { "ref": "main", "sha": "def" }
        }))
        .unwrap()
    }

    #[test]
    fn test_commit_presence_keeps_closed_pulls() {
        let presence =
            commit_presence(Ok(vec![pr(1, "open", false), pr(2, "closed", true)])).unwrap();
        match presence {
            CommitPresence::Present(pulls) => {
                assert_eq!(pulls.len(), 1);
                assert_eq!(pulls[0].number, 2);
                assert_eq!(pulls[0].title, "PR 2");
                assert!(pulls[0].merged);
            }
            CommitPresence::Absent => panic!("expected present"),
        }

        assert_eq!(
            commit_presence(Ok(vec![pr(1, "open", false)])).unwrap(),
            CommitPresence::Present(Vec::new())
        );
    }

    #[test]
    fn test_unknown_commit_is_absent() {
        for status in [404, 422] {
            let answer = Err(ServiceError::Status {
                status,
                message: "No commit found for SHA: abc123".to_string(),
            });
            assert_eq!(commit_presence(answer).unwrap(), CommitPresence::Absent);
        }

        let not_found = Err(ServiceError::Status {
            status: 404,
            message: "Not Found".to_string(),
        });
        assert!(commit_presence(not_found).unwrap_err().is_not_found());
    }

    #[test]
    fn test_rate_limit_core_budget() {
        let limits: RateLimit = serde_json::from_value(json!({
            "resources": {
                "core": { "limit": 5000, "remaining": 4999, "reset": 1_700_000_000, "used": 1 },
                "search": { "limit": 30, "remaining": 30, "reset": 1_700_000_000, "used": 0 }
            },
            "rate": { "limit": 5000, "remaining": 4999, "reset": 1_700_000_000, "used": 1 }
        }))
        .unwrap();
        let budget = rate_budget(&limits).unwrap();
        assert_eq!(budget.limit, 5000);
        assert_eq!(budget.remaining, 4999);
        assert_eq!(budget.reset.timestamp(), 1_700_000_000);
    }
}

//! Fork discovery for an account

use tracing::{debug, info, warn};

use super::model::{ParentGone, RemoteRepository};
use crate::service::{HistoryService, RepoRecord, ServiceError};
use crate::{Error, Result};

/// Options for listing forks
#[derive(Debug, Clone, Default)]
pub struct EnumerateOptions {
    /// Account to inspect; defaults to the authenticated user
    pub login: Option<String>,
    /// Skip the issue listing and comparison against the parent
    pub skip_upstream: bool,
}

/// List every fork owned by the account, enriched for classification
///
/// Forks are returned in the service's listing order. When a fork cannot be
/// inspected the returned [`Error::Enumeration`] carries the forks gathered
/// before it.
pub async fn find_all_forks(
    service: &dyn HistoryService,
    options: &EnumerateOptions,
) -> Result<Vec<RemoteRepository>> {
    let login = match &options.login {
        Some(login) => login.clone(),
        None => service.authenticated_login().await?,
    };

    let repos = service.list_owned_repositories(&login).await?;
    debug!(login = %login, count = repos.len(), "Listed owned repositories");

    let mut forks = Vec::new();
    for summary in repos.into_iter().filter(|r| r.fork) {
        match inspect_fork(service, &login, summary, options.skip_upstream).await {
            Ok(Some(fork)) => forks.push(fork),
            Ok(None) => {}
            Err(Error::Enumeration { repo, source, .. }) => {
                return Err(Error::Enumeration {
                    repo,
                    source,
                    found: forks,
                })
            }
            Err(e) => return Err(e),
        }
    }

    info!(login = %login, count = forks.len(), "Found forks");
    Ok(forks)
}

async fn inspect_fork(
    service: &dyn HistoryService,
    login: &str,
    summary: RepoRecord,
    skip_upstream: bool,
) -> Result<Option<RemoteRepository>> {
    let full_name = summary.full_name();

    // List responses omit the parent, so look the fork up on its own.
    let detail = match service.get_repository(&summary.owner, &summary.name).await {
        Ok(detail) => detail,
        Err(e) => match e.status() {
            Some(403) => {
                debug!(repo = %full_name, "No access to repository, skipping");
                return Ok(None);
            }
            Some(status) => match ParentGone::from_status(status) {
                Some(gone) => {
                    warn!(repo = %full_name, status, "Repository or parent unavailable");
                    return Ok(Some(RemoteRepository::with_parent_gone(summary, gone)));
                }
                None => {
                    return Err(enumeration_error(full_name, e))
                }
            },
            None => {
                return Err(enumeration_error(full_name, e))
            }
        },
    };

    let Some(parent) = detail.parent.clone() else {
        warn!(repo = %full_name, "Fork has no parent linkage");
        return Ok(Some(RemoteRepository::from_parts(detail, &[], None)));
    };

    if skip_upstream {
        return Ok(Some(RemoteRepository::from_parts(detail, &[], None)));
    }

    let issues = service
        .list_open_issues_by_creator(&parent.owner, &parent.name, login)
        .await
        .map_err(|e| enumeration_error(full_name.clone(), e))?;

    let head = format!("{}:{}", login, detail.default_branch);
    let comparison = match service
        .compare_commits(&parent.owner, &parent.name, &parent.default_branch, &head)
        .await
    {
        Ok(comparison) => Some(comparison),
        Err(e) if e.is_not_found() => {
            debug!(
                repo = %full_name,
                base = %parent.default_branch,
                "Parent branch not found, assuming no commits ahead"
            );
            None
        }
        Err(e) => return Err(enumeration_error(full_name, e)),
    };

    Ok(Some(RemoteRepository::from_parts(detail, &issues, comparison)))
}

// `find_all_forks` fills in `found` on the way out.
fn enumeration_error(repo: String, source: ServiceError) -> Error {
    Error::Enumeration {
        repo,
        source,
        found: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Comparison, IssueRecord};
    use crate::testing::{fork_record, status, with_parent, FakeService};

    fn service_with(forks: &[(&str, std::result::Result<RepoRecord, u16>)]) -> FakeService {
        let mut service = FakeService::new("alice");
        let mut not_fork = fork_record("alice", "own-project");
        not_fork.fork = false;
        service.repos.push(not_fork);
        for (name, detail) in forks {
            service.repos.push(fork_record("alice", name));
            service.details.insert(
                format!("alice/{}", name),
                detail.clone().map_err(status),
            );
        }
        service
    }

    #[tokio::test]
    async fn test_enriches_forks_in_listing_order() {
        let mut service = service_with(&[
            ("foo", Ok(with_parent(fork_record("alice", "foo"), "up", "foo"))),
            ("bar", Ok(with_parent(fork_record("alice", "bar"), "up", "bar"))),
        ]);
        service.issues.insert(
            "up/foo".to_string(),
            Ok(vec![IssueRecord {
                number: 7,
                is_pull_request: true,
            }]),
        );
        service.comparisons.insert(
            "up/bar".to_string(),
            Ok(Comparison {
                ahead_by: 3,
                behind_by: 0,
            }),
        );

        let forks = find_all_forks(&service, &EnumerateOptions::default())
            .await
            .unwrap();

        let names: Vec<_> = forks.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "bar"]);
        assert_eq!(forks[0].open_pull_requests, 1);
        assert_eq!(forks[1].commits_ahead, 3);
        assert!(service.calls().contains(&"user".to_string()));
        assert!(service
            .calls()
            .contains(&"compare up/foo main...alice:main".to_string()));
    }

    #[tokio::test]
    async fn test_forbidden_fork_is_skipped() {
        let service = service_with(&[("secret", Err(403))]);
        let forks = find_all_forks(&service, &EnumerateOptions::default())
            .await
            .unwrap();
        assert!(forks.is_empty());
    }

    #[tokio::test]
    async fn test_gone_parents_are_flagged_without_enrichment() {
        let service = service_with(&[("deleted", Err(404)), ("dmca", Err(451))]);
        let forks = find_all_forks(&service, &EnumerateOptions::default())
            .await
            .unwrap();

        assert_eq!(forks.len(), 2);
        assert!(forks[0].parent_missing());
        assert!(forks[1].parent_legally_unavailable());
        assert!(!service.calls().iter().any(|c| c.starts_with("issues")));
        assert!(!service.calls().iter().any(|c| c.starts_with("compare")));
    }

    #[tokio::test]
    async fn test_other_detail_errors_abort() {
        let service = service_with(&[
            ("broken", Err(500)),
            ("foo", Ok(with_parent(fork_record("alice", "foo"), "up", "foo"))),
        ]);
        let err = find_all_forks(&service, &EnumerateOptions::default())
            .await
            .unwrap_err();
        match err {
            Error::Enumeration {
                repo,
                source,
                found,
            } => {
                assert_eq!(repo, "alice/broken");
                assert_eq!(source.status(), Some(500));
                assert!(found.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!service.calls().contains(&"get alice/foo".to_string()));
    }

    #[tokio::test]
    async fn test_abort_keeps_forks_found_so_far() {
        let service = service_with(&[
            ("good", Ok(with_parent(fork_record("alice", "good"), "up", "good"))),
            ("broken", Err(500)),
            ("later", Ok(with_parent(fork_record("alice", "later"), "up", "later"))),
        ]);
        let err = find_all_forks(&service, &EnumerateOptions::default())
            .await
            .unwrap_err();

        match err {
            Error::Enumeration { repo, found, .. } => {
                assert_eq!(repo, "alice/broken");
                let names: Vec<_> = found.iter().map(|f| f.full_name()).collect();
                assert_eq!(names, vec!["alice/good".to_string()]);
                assert_eq!(found[0].parent_name().as_deref(), Some("up/good"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_comparison_branch_is_zero_ahead() {
        let mut service = service_with(&[(
            "foo",
            Ok(with_parent(fork_record("alice", "foo"), "up", "foo")),
        )]);
        service
            .comparisons
            .insert("up/foo".to_string(), Err(status(404)));

        let forks = find_all_forks(&service, &EnumerateOptions::default())
            .await
            .unwrap();
        assert_eq!(forks[0].commits_ahead, 0);
        assert!(forks[0].parent_gone().is_none());
    }

    #[tokio::test]
    async fn test_comparison_failure_aborts() {
        let mut service = service_with(&[(
            "foo",
            Ok(with_parent(fork_record("alice", "foo"), "up", "foo")),
        )]);
        service
            .comparisons
            .insert("up/foo".to_string(), Err(status(502)));

        let result = find_all_forks(&service, &EnumerateOptions::default()).await;
        assert!(matches!(result, Err(Error::Enumeration { .. })));
    }

    #[tokio::test]
    async fn test_skip_upstream_and_explicit_login() {
        let service = service_with(&[(
            "foo",
            Ok(with_parent(fork_record("alice", "foo"), "up", "foo")),
        )]);
        let options = EnumerateOptions {
            login: Some("alice".to_string()),
            skip_upstream: true,
        };

        let forks = find_all_forks(&service, &options).await.unwrap();
        assert_eq!(forks.len(), 1);
        let calls = service.calls();
        assert!(!calls.contains(&"user".to_string()));
        assert!(!calls.iter().any(|c| c.starts_with("issues") || c.starts_with("compare")));
    }
}

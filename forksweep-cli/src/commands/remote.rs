//! Remote command - classify the account's forks

use std::time::Duration;

use chrono::Utc;
use clap::Args;
use forksweep_core::{
    classify_all, ensure_rate_budget, execute, find_all_forks, select_remote, split_by_selection,
    Action, Classification, Config, EnumerateOptions, Error, Filter, ParentGone, RemoteRepository,
};
use forksweep_github::GitHubClient;

use super::parse_duration;

/// Find forks that can be deleted without losing work
#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// Account to inspect (defaults to the token owner)
    #[arg(long)]
    login: Option<String>,

    /// Do not look at the parent repository for open pull requests or commits ahead
    #[arg(long)]
    pub(crate) skip_upstream: bool,

    /// Consider private forks too
    #[arg(long)]
    include_private: bool,

    /// Consider starred forks too
    #[arg(long)]
    include_starred: bool,

    /// Consider forks that have been forked themselves
    #[arg(long)]
    include_forked: bool,

    /// Keep forks with commits their parent does not have
    #[arg(long)]
    exclude_commits_ahead: bool,

    /// Keep forks updated within this window (e.g. 30d)
    #[arg(long, value_parser = parse_duration)]
    since: Option<Duration>,

    /// Never touch this repository (name or owner/name); repeatable
    #[arg(long, value_name = "NAME")]
    blacklist: Vec<String>,

    /// Also list forks that are kept, with the reason
    #[arg(long)]
    show_excluded: bool,

    /// Only act on these eligible forks (name or owner/name); repeatable
    #[arg(long, value_name = "NAME")]
    only: Vec<String>,

    /// Delete the selected forks
    #[arg(long, conflicts_with = "archive")]
    delete: bool,

    /// Archive the selected forks instead of deleting them
    #[arg(long)]
    archive: bool,
}

impl RemoteArgs {
    /// Merge flags into the configured filter; flags only ever widen it
    fn filter(&self, base: &Filter) -> Filter {
        let mut filter = base.clone();
        filter.include_private |= self.include_private;
        filter.include_starred |= self.include_starred;
        filter.include_forked |= self.include_forked;
        filter.exclude_commits_ahead |= self.exclude_commits_ahead;
        if let Some(since) = self.since {
            filter.since = since;
        }
        filter.blacklist.extend(self.blacklist.iter().cloned());
        filter
    }

    fn action(&self) -> Option<Action> {
        if self.delete {
            Some(Action::Delete)
        } else if self.archive {
            Some(Action::Archive)
        } else {
            None
        }
    }

    /// Execute the remote command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = GitHubClient::from_environment(config.github.api_url.as_deref())?;
        let budget = ensure_rate_budget(&client).await?;
        tracing::info!(remaining = budget.remaining, limit = budget.limit, "Rate budget OK");

        let options = EnumerateOptions {
            login: self.login.clone(),
            skip_upstream: config.github.skip_upstream,
        };
        let forks = match find_all_forks(&client, &options).await {
            Ok(forks) => forks,
            Err(err) => {
                if let Error::Enumeration { found, .. } = &err {
                    report_partial(found);
                }
                return Err(err.into());
            }
        };
        let filter = self.filter(&config.filter);
        let classified = classify_all(forks, &filter, Utc::now());

        let eligible = classified.iter().filter(|(_, c)| c.is_eligible()).count();
        println!();
        println!(
            "{} fork(s), {} eligible for {}",
            classified.len(),
            eligible,
            self.action().unwrap_or(Action::Delete)
        );
        println!();
        for (repo, classification) in &classified {
            if classification.is_eligible() || self.show_excluded {
                println!("  {}", describe(repo, classification));
            }
        }

        let (selected, _) = split_by_selection(select_remote(classified, &self.only));

        let Some(action) = self.action() else {
            println!();
            println!(
                "Dry run: pass --delete or --archive to act on {} fork(s)",
                selected.len()
            );
            return Ok(());
        };

        if selected.is_empty() {
            println!();
            println!("Nothing selected.");
            return Ok(());
        }

        let done = execute(&client, &selected, action).await?;
        println!();
        println!("{} fork(s) processed ({}).", done, action);
        Ok(())
    }
}

/// List the forks inspected before enumeration failed; nothing is acted on
fn report_partial(found: &[RemoteRepository]) {
    if found.is_empty() {
        return;
    }
    eprintln!("Inspected {} fork(s) before the failure:", found.len());
    for repo in found {
        eprintln!("  {}", repo.full_name());
    }
}

fn describe(repo: &RemoteRepository, classification: &Classification) -> String {
    let status = match classification {
        Classification::Eligible { note: None } => "eligible".to_string(),
        Classification::Eligible {
            note: Some(ParentGone::Missing),
        } => "eligible (parent deleted)".to_string(),
        Classification::Eligible {
            note: Some(ParentGone::LegallyUnavailable),
        } => "eligible (parent taken down)".to_string(),
        Classification::Excluded(reason) => format!("kept: {}", reason),
    };

    let mut line = format!("{:<40} {}", repo.full_name(), status);
    if let Some(parent) = repo.parent_name() {
        line.push_str(&format!("  [fork of {}", parent));
        if repo.commits_ahead > 0 {
            line.push_str(&format!(", {} commit(s) ahead", repo.commits_ahead));
        }
        line.push(']');
    }
    line
}

//! Local command - scan checkouts for unmerged work

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use forksweep_core::{
    ensure_rate_budget, execute, select_local, split_by_selection, Action, BranchMergeOutcome,
    Config, Coordinator, HistoryService, LocalCheckout,
};
use forksweep_github::GitHubClient;

use super::parse_duration;

/// Find local checkouts whose work is already on a trusted remote
#[derive(Args, Debug)]
pub struct LocalArgs {
    /// A checkout, or a directory containing checkouts
    path: PathBuf,

    /// Maximum number of checkouts scanned at once
    #[arg(long)]
    pub(crate) workers: Option<usize>,

    /// Give up on a checkout after this long (e.g. 10m, 0s to disable)
    #[arg(long, value_parser = parse_duration)]
    pub(crate) timeout: Option<Duration>,

    /// Only act on these clean checkouts (path or trailing path); repeatable
    #[arg(long, value_name = "PATH")]
    only: Vec<PathBuf>,

    /// Delete the selected checkouts
    #[arg(long)]
    delete: bool,
}

impl LocalArgs {
    /// Execute the local command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = GitHubClient::from_environment(config.github.api_url.as_deref())?;
        let service: Arc<dyn HistoryService> = Arc::new(client);
        ensure_rate_budget(service.as_ref()).await?;

        let coordinator = Coordinator::from_config(Arc::clone(&service), config);
        let mut checkouts = coordinator.scan(&self.path).await?;
        checkouts.sort_by(|a, b| a.path.cmp(&b.path));

        let clean = checkouts.iter().filter(|c| c.is_clean()).count();
        let reclaimable: u64 = checkouts
            .iter()
            .filter(|c| c.is_clean())
            .map(|c| c.size)
            .sum();
        println!();
        println!(
            "{} checkout(s), {} clean ({} reclaimable)",
            checkouts.len(),
            clean,
            format_size(reclaimable)
        );
        println!();
        for checkout in &checkouts {
            print_checkout(checkout);
        }

        let (selected, _) = split_by_selection(select_local(checkouts, &self.only));

        if !self.delete {
            println!();
            println!(
                "Dry run: pass --delete to remove {} checkout(s)",
                selected.len()
            );
            return Ok(());
        }

        if selected.is_empty() {
            println!();
            println!("Nothing selected.");
            return Ok(());
        }

        let done = execute(service.as_ref(), &selected, Action::Delete).await?;
        println!();
        println!("{} checkout(s) deleted.", done);
        Ok(())
    }
}

fn print_checkout(checkout: &LocalCheckout) {
    let state = if checkout.is_clean() { "clean" } else { "dirty" };
    println!(
        "  {:<50} {:>10}  {}",
        checkout.path.display(),
        format_size(checkout.size),
        state
    );

    if !checkout.status_clean {
        println!("      uncommitted changes");
    }
    if !checkout.stash_clean {
        println!("      stashed changes");
    }
    for (branch, outcome) in &checkout.branches {
        match outcome {
            BranchMergeOutcome::MergedViaPullRequest { remote, pull } => {
                println!("      {}: merged via #{} on {}", branch, pull.number, remote)
            }
            BranchMergeOutcome::MergedDirect { remote } => {
                println!("      {}: on {}", branch, remote)
            }
            BranchMergeOutcome::Unmerged => println!("      {}: not on any trusted remote", branch),
        }
    }
}

/// Format a byte count with binary units
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

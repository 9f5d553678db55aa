//! Terminal actions on the selected entries

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::selection::Target;
use crate::service::HistoryService;
use crate::{Error, Result};

/// What to do with each selected entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Delete,
    Archive,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Delete => write!(f, "delete"),
            Action::Archive => write!(f, "archive"),
        }
    }
}

/// Apply `action` to every target, one at a time
///
/// Stops at the first failure. Entries processed before it stay processed and
/// their count is carried in [`Error::Execution`]. Returns the number of
/// entries processed.
pub async fn execute(
    service: &dyn HistoryService,
    targets: &[Target],
    action: Action,
) -> Result<usize> {
    if action == Action::Archive {
        if let Some(local) = targets.iter().find_map(Target::as_local) {
            return Err(Error::Config(format!(
                "Local checkouts cannot be archived: {}",
                local.path.display()
            )));
        }
    }

    let mut completed = 0;
    for target in targets {
        let label = target.label();
        debug!(target = %label, %action, "Processing");

        apply(service, target, action)
            .await
            .map_err(|source| Error::Execution {
                target: label.clone(),
                completed,
                source: Box::new(source),
            })?;

        completed += 1;
        info!(target = %label, %action, "Done");
    }

    info!(count = completed, %action, "Finished");
    Ok(completed)
}

async fn apply(service: &dyn HistoryService, target: &Target, action: Action) -> Result<()> {
    match (target, action) {
        (Target::Remote(repo), Action::Delete) => {
            Ok(service.delete_repository(&repo.owner, &repo.name).await?)
        }
        (Target::Remote(repo), Action::Archive) => {
            Ok(service.archive_repository(&repo.owner, &repo.name).await?)
        }
        (Target::Local(checkout), Action::Delete) => {
            Ok(tokio::fs::remove_dir_all(&checkout.path).await?)
        }
        (Target::Local(checkout), Action::Archive) => Err(Error::Config(format!(
            "Local checkouts cannot be archived: {}",
            checkout.path.display()
        ))),
    }
}

//! Selection stage between classification and execution
//!
//! Remote forks and local checkouts travel through the same list as
//! [`Candidate`]s, each flagged selected or not.

use std::path::PathBuf;

use crate::local::LocalCheckout;
use crate::remote::{Classification, RemoteRepository};

/// Something the executor can act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Remote(RemoteRepository),
    Local(LocalCheckout),
}

impl Target {
    /// `owner/name` for forks, the path for checkouts
    pub fn label(&self) -> String {
        match self {
            Target::Remote(repo) => repo.full_name(),
            Target::Local(checkout) => checkout.path.display().to_string(),
        }
    }

    pub fn as_remote(&self) -> Option<&RemoteRepository> {
        match self {
            Target::Remote(repo) => Some(repo),
            Target::Local(_) => None,
        }
    }

    pub fn as_local(&self) -> Option<&LocalCheckout> {
        match self {
            Target::Local(checkout) => Some(checkout),
            Target::Remote(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub target: Target,
    pub selected: bool,
}

impl Candidate {
    pub fn remote(repo: RemoteRepository, selected: bool) -> Self {
        Self {
            target: Target::Remote(repo),
            selected,
        }
    }

    pub fn local(checkout: LocalCheckout, selected: bool) -> Self {
        Self {
            target: Target::Local(checkout),
            selected,
        }
    }
}

/// Partition candidates into (selected, unselected), preserving order
pub fn split_by_selection(candidates: Vec<Candidate>) -> (Vec<Target>, Vec<Target>) {
    let mut selected = Vec::new();
    let mut unselected = Vec::new();
    for candidate in candidates {
        if candidate.selected {
            selected.push(candidate.target);
        } else {
            unselected.push(candidate.target);
        }
    }
    (selected, unselected)
}

/// Pre-select every eligible fork, narrowed to `only` when it is not empty
///
/// `only` entries match either the name or `owner/name`.
pub fn select_remote(
    classified: Vec<(RemoteRepository, Classification)>,
    only: &[String],
) -> Vec<Candidate> {
    classified
        .into_iter()
        .map(|(repo, classification)| {
            let wanted = only.is_empty()
                || only
                    .iter()
                    .any(|o| *o == repo.name || *o == repo.full_name());
            let selected = classification.is_eligible() && wanted;
            Candidate::remote(repo, selected)
        })
        .collect()
}

/// Pre-select every clean checkout, narrowed to `only` when it is not empty
///
/// `only` entries match a checkout whose path ends with them.
pub fn select_local(checkouts: Vec<LocalCheckout>, only: &[PathBuf]) -> Vec<Candidate> {
    checkouts
        .into_iter()
        .map(|checkout| {
            let wanted = only.is_empty() || only.iter().any(|o| checkout.path.ends_with(o));
            let selected = checkout.is_clean() && wanted;
            Candidate::local(checkout, selected)
        })
        .collect()
}

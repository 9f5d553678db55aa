//! Local checkout scanning
//!
//! A checkout is safe to delete when every branch head is known to a trusted
//! remote and neither the working tree nor the stash hold anything.

mod checkout;
mod resolve;
mod scan;

pub use checkout::{BranchMergeOutcome, LocalCheckout};
pub use resolve::{resolve_branches, ResolvedBranches};
pub use scan::{discover, disk_usage, scan_checkout, stash_is_clean, status_is_clean, ScanTarget};

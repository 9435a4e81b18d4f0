//! Pipeline entry points.
//!
//! - `Monitor::run_once`: fetch, diff against the saved state, notify, save
//! - `run_daily`: repeat `run_once` at a fixed local time of day

pub mod diff;
pub mod monitor;
pub mod schedule;

pub use diff::{PostingDiff, find_new_postings};
pub use monitor::{Delivery, Monitor, RunOutcome, RunSummary};
pub use schedule::{next_run_after, run_daily};

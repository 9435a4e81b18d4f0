// src/pipeline/monitor.rs

//! One watch run: fetch, extract, diff against the saved state, notify, save.

use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Posting, SavePolicy};
use crate::services::{Notifier, PageSource, PostingExtractor, Summary};
use crate::storage::PostingStore;

use super::diff::PostingDiff;

/// Whether the run's message reached the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed(String),
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Postings that passed the filter this run
    pub parsed: usize,
    /// Postings whose titles were not in the saved state
    pub new_postings: Vec<Posting>,
    /// Whether the saved state was rewritten
    pub saved: bool,
    pub delivery: Delivery,
}

/// Result of a single run. Failures are already logged.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunSummary),
    Failed(AppError),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Drives the watch pipeline against its collaborators.
pub struct Monitor {
    source: Box<dyn PageSource>,
    extractor: PostingExtractor,
    store: Box<dyn PostingStore>,
    notifier: Box<dyn Notifier>,
    save_policy: SavePolicy,
    persist: bool,
    run_lock: Mutex<()>,
}

impl Monitor {
    pub fn new(
        source: impl PageSource + 'static,
        extractor: PostingExtractor,
        store: impl PostingStore + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        Self {
            source: Box::new(source),
            extractor,
            store: Box::new(store),
            notifier: Box::new(notifier),
            save_policy: SavePolicy::default(),
            persist: true,
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_save_policy(mut self, save_policy: SavePolicy) -> Self {
        self.save_policy = save_policy;
        self
    }

    /// Never write the saved state.
    pub fn without_saving(mut self) -> Self {
        self.persist = false;
        self
    }

    /// Run the pipeline once. Never panics on pipeline failures.
    pub async fn run_once(&self) -> RunOutcome {
        log::info!("Run started");

        match self.try_run().await {
            Ok(summary) => {
                log::info!(
                    "Run finished: {} parsed, {} new, saved={}",
                    summary.parsed,
                    summary.new_postings.len(),
                    summary.saved
                );
                RunOutcome::Completed(summary)
            }
            Err(e) => {
                log::error!("Error during execution: {e}");
                RunOutcome::Failed(e)
            }
        }
    }

    async fn try_run(&self) -> Result<RunSummary> {
        let _run = self.run_lock.lock().await;

        let html = self.source.fetch().await?;
        let current = self.extractor.extract(&html);

        let _state = self.store.lock().await?;
        let saved = self.store.load().await?;
        log::debug!("Loaded {} saved postings from {}", saved.len(), self.store.location());

        let diff = PostingDiff::calculate(&current, &saved);
        if diff.has_new() {
            log::info!("Found {} new postings", diff.added.len());
        } else {
            log::info!("No new postings found");
        }
        if !diff.removed.is_empty() || !diff.updated.is_empty() {
            log::debug!(
                "{} postings removed, {} changed since last save",
                diff.removed.len(),
                diff.updated.len()
            );
        }

        let delivery = self.deliver(Summary::for_postings(&diff.added)).await;

        let should_save = match self.save_policy {
            SavePolicy::OnNew => diff.has_new(),
            SavePolicy::OnChange => diff.has_changes(),
        };
        let saved = should_save && self.persist;
        if saved {
            self.store.save(&current).await?;
        }

        Ok(RunSummary {
            parsed: current.len(),
            new_postings: diff.added,
            saved,
            delivery,
        })
    }

    /// Send the summary; delivery failures are logged and swallowed.
    async fn deliver(&self, summary: Summary<'_>) -> Delivery {
        match self.notifier.send(&summary.render()).await {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                log::error!("Failed to send notification: {e}");
                Delivery::Failed(e.to_string())
            }
        }
    }
}

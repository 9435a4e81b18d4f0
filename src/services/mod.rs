//! Service layer for the watcher.
//!
//! This module contains the collaborators the pipeline drives:
//! - Page fetching (`HttpFetcher`)
//! - Posting extraction (`PostingExtractor`)
//! - Notification delivery (`TelegramNotifier`)

mod extractor;
mod fetcher;
mod notifier;

pub use extractor::{Extraction, PostingExtractor};
pub use fetcher::{HttpFetcher, PageSource};
pub use notifier::{LogNotifier, NO_NEW_POSTINGS, Notifier, Summary, TelegramNotifier, bold};

// src/models/mod.rs

//! Domain models for the watcher.

mod config;
mod posting;

// Re-export all public types
pub use config::{
    Config, LoggingConfig, NotifierConfig, SavePolicy, ScheduleConfig, SourceConfig,
    StorageConfig, TelegramCredentials, parse_time_of_day,
};
pub use posting::Posting;

// src/utils/log.rs

//! Log line formatting shared by every log target.
//!
//! Lines look like `2026-10-19 09:00:00,123 - INFO - Run started`.

use std::fmt;
use std::io::{self, Write};

use chrono::NaiveDateTime;

/// Timestamp layout, millisecond precision after a comma.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Write one formatted log line, newline included.
pub fn write_line(
    out: &mut impl Write,
    at: NaiveDateTime,
    level: log::Level,
    message: impl fmt::Display,
) -> io::Result<()> {
    writeln!(out, "{} - {} - {}", at.format(TIMESTAMP_FORMAT), level, message)
}

//! Posting data structure.

use serde::{Deserialize, Serialize};

/// A job posting scraped from the careers table.
///
/// Postings are identified by `title` alone; the other fields may drift
/// between fetches without changing identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    /// Posting title, the identity key
    pub title: String,

    /// Absolute URL to the posting
    pub link: String,

    /// Hiring department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Date the posting was advertised
    #[serde(default, rename = "advertised", skip_serializing_if = "Option::is_none")]
    pub advertised_date: Option<String>,

    /// Date the competition closes
    #[serde(default, rename = "closing", skip_serializing_if = "Option::is_none")]
    pub closing_date: Option<String>,
}

impl Posting {
    /// Create a posting with only a title and link.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            department: None,
            advertised_date: None,
            closing_date: None,
        }
    }

    /// Whether any field other than the title differs from `other`.
    pub fn has_drifted_from(&self, other: &Posting) -> bool {
        self.link != other.link
            || self.department != other.department
            || self.advertised_date != other.advertised_date
            || self.closing_date != other.closing_date
    }
}

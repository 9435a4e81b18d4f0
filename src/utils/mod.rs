//! Utility functions and helpers.

pub mod http;
pub mod log;
pub mod url;

pub use self::url::normalize_link;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  Clerk,\n\t Band Level 2 "),
            "Clerk, Band Level 2"
        );
        assert_eq!(normalize_whitespace(" \n "), "");
    }
}

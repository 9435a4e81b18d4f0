// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

use crate::error::{AppError, Result};

/// Turn a link found on the careers page into an absolute URL.
///
/// Parent-relative links (`../careers/123`) are joined onto the site origin,
/// absolute links are returned as-is, and anything else is resolved against
/// the page the link was found on. A link that cannot be resolved is an
/// error, never passed on relative.
///
/// # Examples
/// ```
/// use jobwatch::utils::url::normalize_link;
/// use url::Url;
///
/// let origin = Url::parse("https://www.mun.ca").unwrap();
/// let page = Url::parse("https://www.mun.ca/hr/careers/external-job-postings/").unwrap();
/// assert_eq!(
///     normalize_link("../careers/123", &page, &origin).unwrap(),
///     "https://www.mun.ca/careers/123"
/// );
/// ```
pub fn normalize_link(href: &str, page: &Url, origin: &Url) -> Result<String> {
    let href = href.trim();

    if is_absolute(href) {
        return Ok(href.to_string());
    }

    let base = if href.starts_with("..") { origin } else { page };
    base.join(href)
        .map(|u| u.to_string())
        .map_err(|e| AppError::parse(format!("cannot resolve link '{href}': {e}")))
}

fn is_absolute(href: &str) -> bool {
    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bases() -> (Url, Url) {
        (
            Url::parse("https://www.mun.ca/hr/careers/external-job-postings/").unwrap(),
            Url::parse("https://www.mun.ca").unwrap(),
        )
    }

    #[test]
    fn test_parent_relative_joins_origin() {
        let (page, origin) = bases();
        assert_eq!(
            normalize_link("../careers/123", &page, &origin).unwrap(),
            "https://www.mun.ca/careers/123"
        );
        assert_eq!(
            normalize_link("../../hr/careers/job.php?id=9", &page, &origin).unwrap(),
            "https://www.mun.ca/hr/careers/job.php?id=9"
        );
    }

    #[test]
    fn test_absolute_unchanged() {
        let (page, origin) = bases();
        let link = "https://careers.mun.ca/jobs/456?lang=en";
        assert_eq!(normalize_link(link, &page, &origin).unwrap(), link);
        assert_eq!(
            normalize_link("http://example.com/x", &page, &origin).unwrap(),
            "http://example.com/x"
        );
    }

    #[test]
    fn test_root_relative_resolves_on_page_host() {
        let (page, origin) = bases();
        assert_eq!(
            normalize_link("/hr/careers/789", &page, &origin).unwrap(),
            "https://www.mun.ca/hr/careers/789"
        );
    }

    #[test]
    fn test_plain_relative_resolves_against_page() {
        let (page, origin) = bases();
        assert_eq!(
            normalize_link("posting.php?id=5", &page, &origin).unwrap(),
            "https://www.mun.ca/hr/careers/external-job-postings/posting.php?id=5"
        );
    }

    #[test]
    fn test_unresolvable_link_is_an_error() {
        let (page, origin) = bases();
        let err = normalize_link("//exa mple.com/job", &page, &origin).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }
}

// src/services/extractor.rs

//! Posting extraction from the careers page.
//!
//! The page lists postings per campus in separate tables. Only the configured
//! table is read, and only rows whose title passes the band filter are kept.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Posting, SourceConfig};
use crate::utils::{normalize_link, normalize_whitespace};

/// Column positions within a posting row.
const TITLE_CELL: usize = 1;
const DEPARTMENT_CELL: usize = 2;
const ADVERTISED_CELL: usize = 3;
const CLOSING_CELL: usize = 4;

/// Postings read from one table, plus the rows that could not be read.
#[derive(Debug, Default)]
pub struct Extraction {
    pub postings: Vec<Posting>,
    pub skipped_rows: usize,
}

/// Parses careers page markup into postings.
pub struct PostingExtractor {
    table_id: String,
    table_selector: Selector,
    row_selector: Selector,
    link_selector: Selector,
    title_filter: Regex,
    page_url: Url,
    origin: Url,
}

impl PostingExtractor {
    /// Build an extractor from the source configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let table_selector = format!("table[id=\"{}\"]", config.table_id.replace('"', "\\\""));

        Ok(Self {
            table_id: config.table_id.clone(),
            table_selector: Self::parse_selector(&table_selector)?,
            row_selector: Self::parse_selector("tbody > tr")?,
            link_selector: Self::parse_selector("a")?,
            title_filter: Regex::new(&config.title_pattern)?,
            page_url: Url::parse(&config.url)?,
            origin: Url::parse(&config.origin)?,
        })
    }

    /// Extract filtered postings, logging instead of failing.
    ///
    /// A missing table yields an empty list; malformed rows are skipped.
    pub fn extract(&self, html: &str) -> Vec<Posting> {
        match self.extract_table(html) {
            Ok(extraction) => {
                log::info!(
                    "Parsed {} postings from table #{} matching '{}'",
                    extraction.postings.len(),
                    self.table_id,
                    self.title_filter.as_str()
                );
                if extraction.skipped_rows > 0 {
                    log::warn!("Skipped {} malformed rows", extraction.skipped_rows);
                }
                extraction.postings
            }
            Err(e) => {
                log::error!("{e}");
                Vec::new()
            }
        }
    }

    /// Extract filtered postings, failing when the table is absent.
    pub fn extract_table(&self, html: &str) -> Result<Extraction> {
        let document = Html::parse_document(html);
        let table = document
            .select(&self.table_selector)
            .next()
            .ok_or_else(|| AppError::parse(format!("No job table found with id '{}'", self.table_id)))?;

        let mut extraction = Extraction::default();
        for (index, row) in table.select(&self.row_selector).enumerate() {
            match self.parse_row(row) {
                Ok(Some(posting)) => extraction.postings.push(posting),
                Ok(None) => {}
                Err(e) => {
                    extraction.skipped_rows += 1;
                    log::warn!("Skipping row {} of table #{}: {}", index + 1, self.table_id, e);
                }
            }
        }

        Ok(extraction)
    }

    /// Whether a title passes the band filter.
    pub fn matches_filter(&self, title: &str) -> bool {
        self.title_filter.is_match(title)
    }

    /// Parse one table row.
    ///
    /// `Ok(None)` for header rows and titles rejected by the filter.
    fn parse_row(&self, row: ElementRef<'_>) -> Result<Option<Posting>> {
        let cells: Vec<ElementRef<'_>> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| matches!(cell.value().name(), "td" | "th"))
            .collect();

        if !cells.iter().any(|cell| cell.value().name() == "td") {
            return Ok(None);
        }

        let anchor = cells
            .get(TITLE_CELL)
            .and_then(|cell| cell.select(&self.link_selector).next())
            .ok_or_else(|| AppError::parse("title cell has no link"))?;

        let title = normalize_whitespace(&anchor.text().collect::<String>());
        if title.is_empty() {
            return Err(AppError::parse("title link has no text"));
        }
        if !self.matches_filter(&title) {
            return Ok(None);
        }

        let href = anchor
            .value()
            .attr("href")
            .ok_or_else(|| AppError::parse(format!("'{title}' has no href")))?;

        Ok(Some(Posting {
            link: normalize_link(href, &self.page_url, &self.origin)?,
            department: Self::cell_text(&cells, DEPARTMENT_CELL, &title)?,
            advertised_date: Self::cell_text(&cells, ADVERTISED_CELL, &title)?,
            closing_date: Self::cell_text(&cells, CLOSING_CELL, &title)?,
            title,
        }))
    }

    fn cell_text(cells: &[ElementRef<'_>], index: usize, title: &str) -> Result<Option<String>> {
        let cell = cells.get(index).ok_or_else(|| {
            AppError::parse(format!("'{title}' is missing column {}", index + 1))
        })?;
        let text = normalize_whitespace(&cell.text().collect::<String>());
        Ok((!text.is_empty()).then_some(text))
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

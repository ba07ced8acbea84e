//! HTML parser for extracting links and table rows
//!
//! This module handles scanning fetched pages for:
//! - Links matching a stage's href marker (search results, documentation links)
//! - Document rows of a procedure page's document table
//! - Project rows of the search results table
//!
//! Markup is taken as-is: anchors without a usable href and rows with too few
//! cells are skipped silently rather than reported.

use crate::config::SiteConfig;
use crate::crawler::types::{DocumentRef, ProjectRecord};
use crate::url::{resolve_link, LinkSet};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracts links whose href contains `pattern`, resolved and deduplicated
///
/// # Link Extraction Rules
///
/// - Only `<a href="...">` anchors are considered
/// - The raw href must contain `pattern` (e.g. "/it-IT/Oggetti/Info/")
/// - The href is resolved against `base_url`, the page's own URL
/// - `javascript:`, `mailto:`, `tel:`, `data:`, fragment-only and
///   non-HTTP(S) hrefs are skipped
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use url::Url;
/// use via_harvest::crawler::extract_links;
///
/// let html = Html::parse_document(
///     r#"<a href="/it-IT/Oggetti/Info/1">A</a><a href="/it-IT/Oggetti/Info/1">A again</a>"#,
/// );
/// let base = Url::parse("https://va.mite.gov.it/it-IT/Ricerca/ViaLibera").unwrap();
/// let links = extract_links(&html, &base, "/it-IT/Oggetti/Info/");
/// assert_eq!(links.len(), 1);
/// ```
pub fn extract_links(document: &Html, base_url: &Url, pattern: &str) -> LinkSet {
    let mut links = LinkSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if !href.contains(pattern) {
                continue;
            }

            if let Some(absolute_url) = resolve_link(href, base_url) {
                links.insert(absolute_url);
            }
        }
    }

    links
}

/// Convenience function for extracting matching links straight from HTML text
pub fn extract_links_simple(html: &str, base_url: &Url, pattern: &str) -> LinkSet {
    extract_links(&Html::parse_document(html), base_url, pattern)
}

/// Column layout of the document table on procedure pages
#[derive(Debug, Clone)]
pub struct DocumentTableLayout {
    pub table_class: String,
    pub min_columns: usize,
    pub filename_column: usize,
    pub download_column: usize,
    pub download_title: String,
}

impl DocumentTableLayout {
    /// CSS selector locating the table
    pub fn marker(&self) -> String {
        format!("table.{}", self.table_class)
    }
}

impl From<&SiteConfig> for DocumentTableLayout {
    fn from(site: &SiteConfig) -> Self {
        Self {
            table_class: site.document_table_class.clone(),
            min_columns: site.document_min_columns,
            filename_column: site.filename_column,
            download_column: site.download_column,
            download_title: site.download_link_title.clone(),
        }
    }
}

impl Default for DocumentTableLayout {
    fn default() -> Self {
        Self::from(&SiteConfig::default())
    }
}

/// Rows read from one page of a document table
#[derive(Debug, Clone, Default)]
pub struct DocumentTable {
    /// Data rows seen, header excluded
    pub rows: usize,
    /// Rows that yielded a document
    pub documents: Vec<DocumentRef>,
}

/// Reads the document table of a procedure page
///
/// Returns `None` if the page has no document table. Within the table, the
/// first row is the header; data rows with fewer than `min_columns` cells or
/// without the titled download anchor are skipped.
pub fn extract_document_refs(
    document: &Html,
    base_url: &Url,
    layout: &DocumentTableLayout,
) -> Option<DocumentTable> {
    let table = first_match(document, &layout.marker())?;
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("td").ok()?;
    let anchor_selector = Selector::parse("a[href]").ok()?;

    let required = layout
        .min_columns
        .max(layout.filename_column + 1)
        .max(layout.download_column + 1);
    let mut result = DocumentTable::default();

    for (idx, row) in table.select(&row_selector).skip(1).enumerate() {
        result.rows += 1;
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();

        if cells.len() < required {
            tracing::debug!(
                "Row {}: not enough columns ({}), skipping",
                idx + 1,
                cells.len()
            );
            continue;
        }

        let filename = stripped_text(&cells[layout.filename_column]);

        let download_href = cells[layout.download_column]
            .select(&anchor_selector)
            .find(|a| a.value().attr("title") == Some(layout.download_title.as_str()))
            .and_then(|a| a.value().attr("href"));

        let Some(href) = download_href else {
            tracing::debug!(
                "Row {}: no '{}' link, skipping",
                idx + 1,
                layout.download_title
            );
            continue;
        };

        match resolve_link(href, base_url) {
            Some(download_url) => result.documents.push(DocumentRef {
                download_url,
                filename,
            }),
            None => tracing::debug!("Row {}: unusable download href '{}'", idx + 1, href),
        }
    }

    Some(result)
}

/// Rows read from one page of the search results table
#[derive(Debug, Clone, Default)]
pub struct ProjectTable {
    /// Data rows seen, header excluded
    pub rows: usize,
    /// Rows that yielded a project
    pub projects: Vec<ProjectRecord>,
}

/// Minimum cells of a search results row: title, proponent, status, info, documentation
const PROJECT_ROW_CELLS: usize = 5;

/// Reads the search results table into project records
///
/// Returns `None` if the page has no results table. Rows need five cells and
/// an info link; the documentation link is optional. New records are marked
/// `include = "YES"`.
pub fn extract_project_rows(
    document: &Html,
    base_url: &Url,
    table_class: &str,
) -> Option<ProjectTable> {
    let table = first_match(document, &format!("table.{}", table_class))?;
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("td").ok()?;
    let anchor_selector = Selector::parse("a[href]").ok()?;

    let mut result = ProjectTable::default();

    for row in table.select(&row_selector).skip(1) {
        result.rows += 1;
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() < PROJECT_ROW_CELLS {
            continue;
        }

        let link_in = |cell: &ElementRef| {
            cell.select(&anchor_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| resolve_link(href, base_url))
        };

        let Some(url) = link_in(&cells[3]) else {
            continue;
        };
        let documentation_url = link_in(&cells[4]).unwrap_or_default();
        let id = url.rsplit('/').next().unwrap_or_default().to_string();

        result.projects.push(ProjectRecord {
            id,
            url,
            documentation_url,
            title: trimmed_text(&cells[0]),
            proponent: trimmed_text(&cells[1]),
            status: trimmed_text(&cells[2]),
            include: "YES".to_string(),
        });
    }

    Some(result)
}

fn first_match<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

/// Text of an element with each text node trimmed and concatenated
fn stripped_text(element: &ElementRef) -> String {
    element.text().map(str::trim).collect()
}

/// Text of an element trimmed as a whole
fn trimmed_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

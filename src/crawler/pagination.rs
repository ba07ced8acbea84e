//! Pagination inference for registry listings
//!
//! Listing pages announce their extent in one of two ways:
//! - a label `Pagina <current> di <total>` inside `ul.pagination li.etichettaRicerca`
//! - a result count `(<N>)` inside `h3.risultati`, with a fixed page size
//!
//! A page carrying neither is treated as a single, final page.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

const LABEL_SELECTOR: &str = "ul.pagination li.etichettaRicerca";
const COUNT_SELECTOR: &str = "h3.risultati";

/// Which on-page signal a [`PaginationState`] was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationSignal {
    /// "Pagina X di Y"
    Label,
    /// "(N)" total result count
    Count,
    /// No signal found
    Absent,
}

/// Current and total page of a listing
///
/// Always satisfies `1 <= current <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current: u32,
    pub total: u32,
    pub signal: PaginationSignal,
}

impl PaginationState {
    fn new(current: u32, total: u32, signal: PaginationSignal) -> Self {
        let total = total.max(1);
        Self {
            current: current.clamp(1, total),
            total,
            signal,
        }
    }

    /// The state of a page with no pagination indicator
    pub fn single() -> Self {
        Self::new(1, 1, PaginationSignal::Absent)
    }

    /// Returns true if `page` is at or beyond the advertised total
    pub fn is_last(&self, page: u32) -> bool {
        page >= self.total
    }
}

/// Reads pagination state from listing pages
#[derive(Debug, Clone)]
pub struct PaginationOracle {
    results_per_page: u32,
}

impl Default for PaginationOracle {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PaginationOracle {
    /// Creates an oracle for listings showing `results_per_page` rows per page
    pub fn new(results_per_page: u32) -> Self {
        Self {
            results_per_page: results_per_page.max(1),
        }
    }

    /// Infers the pagination state of a fetched listing page
    ///
    /// The label format is tried first, then the count format. The count
    /// format carries no current page, so the requested page (clamped to the
    /// total) is reported instead.
    ///
    /// # Example
    ///
    /// ```
    /// use scraper::Html;
    /// use via_harvest::crawler::PaginationOracle;
    ///
    /// let html = Html::parse_document(
    ///     r#"<ul class="pagination"><li class="etichettaRicerca">Pagina 2 di 8</li></ul>"#,
    /// );
    /// let state = PaginationOracle::default().infer(&html, 2);
    /// assert_eq!((state.current, state.total), (2, 8));
    /// ```
    pub fn infer(&self, document: &Html, requested_page: u32) -> PaginationState {
        if let Some((current, total)) = first_text(document, LABEL_SELECTOR)
            .as_deref()
            .and_then(parse_label)
        {
            return PaginationState::new(current, total, PaginationSignal::Label);
        }

        if let Some(count) = first_text(document, COUNT_SELECTOR)
            .as_deref()
            .and_then(parse_count)
        {
            let total = pages_for(count, self.results_per_page);
            return PaginationState::new(requested_page, total, PaginationSignal::Count);
        }

        PaginationState::single()
    }
}

/// Number of pages needed for `count` results
fn pages_for(count: u32, per_page: u32) -> u32 {
    count.div_ceil(per_page)
}

/// Parses "Pagina X di Y" anywhere in the text
fn parse_label(text: &str) -> Option<(u32, u32)> {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    let pattern = LABEL
        .get_or_init(|| Regex::new(r"Pagina\s+(\d+)\s+di\s+(\d+)").expect("label pattern is valid"));

    let caps = pattern.captures(text)?;
    let current = caps.get(1)?.as_str().parse().ok()?;
    let total = caps.get(2)?.as_str().parse().ok()?;
    Some((current, total))
}

/// Parses the first parenthesised integer in the text
fn parse_count(text: &str) -> Option<u32> {
    static COUNT: OnceLock<Regex> = OnceLock::new();
    let pattern = COUNT.get_or_init(|| Regex::new(r"\((\d+)\)").expect("count pattern is valid"));

    pattern.captures(text)?.get(1)?.as_str().parse().ok()
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
}

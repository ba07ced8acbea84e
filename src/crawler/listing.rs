//! Paginated listing walk shared by every crawl stage
//!
//! Search results, the project list and procedure document tables are all
//! walked by [`crawl_listing`]: build the URL of page N, fetch it, scan it,
//! and stop when the page counter reaches the total the page itself prints.
//! Stages differ only in how they build URLs and what they scan for.

use crate::crawler::fetcher::{FetchedPage, HttpSession};
use crate::crawler::pagination::PaginationState;
use crate::state::Termination;
use crate::UrlResult;
use url::Url;

/// What a stage found on one listing page
#[derive(Debug)]
pub enum PageScan<T> {
    /// The page was read; `items` may be empty
    Scanned {
        items: Vec<T>,
        pagination: PaginationState,
    },
    /// The structural marker the stage needs is not on the page
    MarkerMissing(String),
    /// The marker is there but holds no data rows
    Empty,
}

/// Items gathered by a listing walk and why it stopped
#[derive(Debug)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// Pages successfully fetched
    pub pages: u32,
    pub termination: Termination,
}

/// Walks a paginated listing from page 1
///
/// Fetch failures and missing markers end the walk early with whatever was
/// gathered; they are reported through [`Listing::termination`], never as an
/// error. The walk also stops after `max_pages` pages.
///
/// # Arguments
///
/// * `session` - Rate-limited HTTP session
/// * `label` - Short name used in log lines (e.g. "search", "documents")
/// * `max_pages` - Hard cap on pages walked
/// * `url_for_page` - Builds the URL of a 1-based page number
/// * `scan` - Reads one fetched page
pub async fn crawl_listing<T, U, S>(
    session: &mut HttpSession,
    label: &str,
    max_pages: u32,
    url_for_page: U,
    mut scan: S,
) -> Listing<T>
where
    U: Fn(u32) -> UrlResult<Url>,
    S: FnMut(&FetchedPage, u32) -> PageScan<T>,
{
    let mut items = Vec::new();
    let mut page: u32 = 1;

    loop {
        let url = match url_for_page(page) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("[{}] Cannot build URL for page {}: {}", label, page, e);
                return Listing {
                    items,
                    pages: page - 1,
                    termination: Termination::FetchFailed {
                        page,
                        error: e.to_string(),
                    },
                };
            }
        };

        let fetched = match session.fetch_page(&url).await.into_page() {
            Ok(fetched) => fetched,
            Err(error) => {
                tracing::warn!("[{}] Could not retrieve {}: {}", label, url, error);
                return Listing {
                    items,
                    pages: page - 1,
                    termination: Termination::FetchFailed { page, error },
                };
            }
        };

        let pagination = match scan(&fetched, page) {
            PageScan::Scanned {
                items: found,
                pagination,
            } => {
                tracing::debug!(
                    "[{}] Page {}/{}: {} items",
                    label,
                    page,
                    pagination.total,
                    found.len()
                );
                items.extend(found);
                pagination
            }
            PageScan::MarkerMissing(marker) => {
                tracing::warn!("[{}] No '{}' found in {}", label, marker, url);
                return Listing {
                    items,
                    pages: page,
                    termination: Termination::MarkerMissing { page, marker },
                };
            }
            PageScan::Empty => {
                tracing::warn!("[{}] No rows found on page {}", label, page);
                return Listing {
                    items,
                    pages: page,
                    termination: Termination::EmptyPage { page },
                };
            }
        };

        tracing::info!("[{}] Processed page {}/{}", label, page, pagination.total);

        if pagination.is_last(page) {
            return Listing {
                items,
                pages: page,
                termination: Termination::LastPage {
                    total: pagination.total,
                },
            };
        }

        if page >= max_pages {
            tracing::warn!(
                "[{}] Stopping at page {} of {}: page limit reached",
                label,
                page,
                pagination.total
            );
            return Listing {
                items,
                pages: page,
                termination: Termination::PageLimit { limit: max_pages },
            };
        }

        page += 1;
    }
}

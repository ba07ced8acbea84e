//! Crawler module for the registry harvest pipeline
//!
//! This module contains the crawling logic, including:
//! - Rate-limited HTTP fetching
//! - HTML parsing, link extraction and table scraping
//! - Pagination inference shared by every listing
//! - The search, detail and procedure stages
//! - Overall harvest coordination

mod coordinator;
mod detail;
mod documents;
mod fetcher;
mod listing;
mod pagination;
mod parser;
mod rate_limit;
mod search;
mod types;

pub use coordinator::Harvester;
pub use detail::{DetailResolver, ResolvedDetail};
pub use documents::{DocumentListCrawler, DocumentListing};
pub use fetcher::{build_http_client, fetch_url, FetchResult, FetchedPage, HttpSession};
pub use listing::{crawl_listing, Listing, PageScan};
pub use pagination::{PaginationOracle, PaginationSignal, PaginationState};
pub use parser::{
    extract_document_refs, extract_links, extract_links_simple, extract_project_rows,
    DocumentTable, DocumentTableLayout, ProjectTable,
};
pub use rate_limit::RateLimiter;
pub use search::{ProjectListing, SearchCrawler, SearchResults};
pub use types::{DocumentRef, ProjectRecord, SearchType};

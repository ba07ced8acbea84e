//! Keyword search stage
//!
//! Walks the registry's free-text search page by page, either collecting the
//! result links (detail pages or documentation pages, depending on the search
//! type) or reading the results table into project records for the list export.

use crate::config::Config;
use crate::crawler::fetcher::HttpSession;
use crate::crawler::listing::{crawl_listing, Listing, PageScan};
use crate::crawler::pagination::PaginationOracle;
use crate::crawler::parser::{extract_links, extract_project_rows};
use crate::crawler::types::{ProjectRecord, SearchType};
use crate::state::Termination;
use crate::url::{build_search_url, LinkSet};

/// Result links of a keyword search
#[derive(Debug)]
pub struct SearchResults {
    /// Every distinct result link, in discovery order
    pub links: LinkSet,
    /// Result pages successfully fetched
    pub pages: u32,
    pub termination: Termination,
}

/// Project records read from a keyword search
pub type ProjectListing = Listing<ProjectRecord>;

/// Drives keyword search pagination
pub struct SearchCrawler<'a> {
    config: &'a Config,
    oracle: PaginationOracle,
}

impl<'a> SearchCrawler<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            oracle: PaginationOracle::new(config.site.results_per_page),
        }
    }

    fn search_url(
        &self,
        keyword: &str,
        search_type: SearchType,
        page: u32,
    ) -> crate::UrlResult<url::Url> {
        let site = &self.config.site;
        build_search_url(
            &site.base_url,
            &site.search_path,
            keyword,
            search_type.code(),
            &site.page_param,
            page,
        )
    }

    /// Collects the result links of a keyword search
    ///
    /// Links are those whose href contains the search type's marker. A page
    /// that fails to load ends the walk with the links gathered so far.
    pub async fn crawl(
        &self,
        session: &mut HttpSession,
        keyword: &str,
        search_type: SearchType,
    ) -> SearchResults {
        let marker = search_type.link_marker(&self.config.site);
        tracing::info!(
            "Searching '{}' [{}] for links containing '{}'",
            keyword,
            search_type,
            marker
        );

        let mut seen = LinkSet::new();
        let listing = crawl_listing(
            session,
            "search",
            self.config.crawler.max_pages,
            |page| self.search_url(keyword, search_type, page),
            |fetched, page| {
                let document = fetched.document();
                let found = extract_links(&document, &fetched.url, marker);
                let fresh = seen.merge(found.clone());

                tracing::debug!(
                    "Found {} links on page {} ({} new, {} so far)",
                    found.len(),
                    page,
                    fresh,
                    seen.len()
                );

                PageScan::Scanned {
                    items: found.into_vec(),
                    pagination: self.oracle.infer(&document, page),
                }
            },
        )
        .await;

        // Links repeated across pages keep their first position
        let links: LinkSet = listing.items.into_iter().collect();
        tracing::info!(
            "Collected {} result links over {} pages ({})",
            links.len(),
            listing.pages,
            listing.termination
        );

        SearchResults {
            links,
            pages: listing.pages,
            termination: listing.termination,
        }
    }

    /// Reads the project search results table into records
    ///
    /// A page without the results table, or whose table has no data rows,
    /// ends the walk.
    pub async fn list_projects(&self, session: &mut HttpSession, keyword: &str) -> ProjectListing {
        let table_class = &self.config.site.results_table_class;
        let marker = format!("table.{}", table_class);
        tracing::info!("Listing projects for '{}'", keyword);

        let listing = crawl_listing(
            session,
            "projects",
            self.config.crawler.max_pages,
            |page| self.search_url(keyword, SearchType::Projects, page),
            |fetched, page| {
                let document = fetched.document();
                match extract_project_rows(&document, &fetched.url, table_class) {
                    None => PageScan::MarkerMissing(marker.clone()),
                    Some(table) if table.rows == 0 => PageScan::Empty,
                    Some(table) => {
                        for project in &table.projects {
                            tracing::debug!("Found project {}: {}", project.id, project.title);
                        }
                        PageScan::Scanned {
                            items: table.projects,
                            pagination: self.oracle.infer(&document, page),
                        }
                    }
                }
            },
        )
        .await;

        tracing::info!(
            "Listed {} projects over {} pages ({})",
            listing.items.len(),
            listing.pages,
            listing.termination
        );
        listing
    }
}

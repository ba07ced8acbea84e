//! Procedure page stage
//!
//! Walks the document table of one procedure page across its own pagination,
//! independent of the search pagination, collecting download links and file
//! names.

use crate::config::Config;
use crate::crawler::fetcher::HttpSession;
use crate::crawler::listing::{crawl_listing, Listing, PageScan};
use crate::crawler::pagination::PaginationOracle;
use crate::crawler::parser::{extract_document_refs, DocumentTableLayout};
use crate::crawler::types::DocumentRef;
use crate::url::with_page_param;

/// Documents listed by one procedure page
pub type DocumentListing = Listing<DocumentRef>;

/// Collects document references from procedure pages
pub struct DocumentListCrawler<'a> {
    config: &'a Config,
    layout: DocumentTableLayout,
    oracle: PaginationOracle,
}

impl<'a> DocumentListCrawler<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            layout: DocumentTableLayout::from(&config.site),
            oracle: PaginationOracle::new(config.site.results_per_page),
        }
    }

    /// Collects every document of a procedure page, following its pagination
    ///
    /// A page without the document table ends the walk; on the first page
    /// that simply means the procedure has no documents.
    pub async fn crawl(&self, session: &mut HttpSession, procedure_url: &str) -> DocumentListing {
        tracing::info!("Parsing procedure page {}", procedure_url);
        let marker = self.layout.marker();

        let listing = crawl_listing(
            session,
            "documents",
            self.config.crawler.max_pages,
            |page| with_page_param(procedure_url, &self.config.site.page_param, page),
            |fetched, page| {
                let document = fetched.document();
                match extract_document_refs(&document, &fetched.url, &self.layout) {
                    None => PageScan::MarkerMissing(marker.clone()),
                    Some(table) => {
                        if table.documents.len() < table.rows {
                            tracing::debug!(
                                "Skipped {} of {} rows on page {}",
                                table.rows - table.documents.len(),
                                table.rows,
                                page
                            );
                        }
                        PageScan::Scanned {
                            items: table.documents,
                            pagination: self.oracle.infer(&document, page),
                        }
                    }
                }
            },
        )
        .await;

        tracing::info!(
            "Found {} documents in {} ({})",
            listing.items.len(),
            procedure_url,
            listing.termination
        );
        listing
    }
}

//! Detail page stage
//!
//! Turns one search result into a project ID and the documentation
//! (procedure) pages linked from it. Only the detail page itself is scanned.

use crate::config::Config;
use crate::crawler::fetcher::HttpSession;
use crate::crawler::parser::extract_links;
use crate::url::{LinkSet, ProjectId};
use url::Url;

/// A detail page resolved to its project and procedure links
#[derive(Debug, Clone)]
pub struct ResolvedDetail {
    pub project_id: ProjectId,
    /// Procedure page URLs, in page order
    pub procedures: LinkSet,
    /// Set when the detail page could not be fetched
    pub error: Option<String>,
}

/// Resolves detail pages
pub struct DetailResolver<'a> {
    config: &'a Config,
}

impl<'a> DetailResolver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Fetches a detail page and collects its documentation links
    ///
    /// Never fails: a page that cannot be fetched yields an empty link set
    /// with [`ResolvedDetail::error`] set.
    pub async fn resolve(&self, session: &mut HttpSession, detail_url: &str) -> ResolvedDetail {
        let project_id = ProjectId::from_detail_url(detail_url);
        tracing::info!("Parsing detail page {} (project {})", detail_url, project_id);

        let fetched = match Url::parse(detail_url) {
            Ok(url) => session.fetch_page(&url).await.into_page(),
            Err(e) => Err(e.to_string()),
        };

        let page = match fetched {
            Ok(page) => page,
            Err(error) => {
                tracing::warn!("Could not retrieve {}: {}", detail_url, error);
                return ResolvedDetail {
                    project_id,
                    procedures: LinkSet::new(),
                    error: Some(error),
                };
            }
        };

        let procedures = extract_links(
            &page.document(),
            &page.url,
            &self.config.site.documentation_link_marker,
        );
        tracing::info!(
            "Found {} procedure links in {}",
            procedures.len(),
            detail_url
        );

        ResolvedDetail {
            project_id,
            procedures,
            error: None,
        }
    }
}

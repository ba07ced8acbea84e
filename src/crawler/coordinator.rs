//! Harvest coordinator - main pipeline orchestration
//!
//! This module chains the crawl stages into the two harvest flows:
//! - keyword harvest: search, then each result's detail page, its procedure
//!   pages and finally every listed document
//! - project list harvest: the procedure page of each selected CSV row
//! - single project harvest: the detail page built from a known project ID
//!
//! Everything runs as one sequential chain of awaits over a single
//! [`HttpSession`], so the politeness delay covers every request.

use crate::config::Config;
use crate::crawler::detail::DetailResolver;
use crate::crawler::documents::DocumentListCrawler;
use crate::crawler::fetcher::HttpSession;
use crate::crawler::search::{ProjectListing, SearchCrawler, SearchResults};
use crate::crawler::types::{ProjectRecord, SearchType};
use crate::download::Downloader;
use crate::output::{select_included, HarvestStats};
use crate::url::{build_detail_url, sanitize_filename, ProjectId};
use crate::{HarvestError, Result};
use std::path::{Path, PathBuf};

/// Drives a harvest run
pub struct Harvester {
    config: Config,
    session: HttpSession,
    downloader: Downloader,
}

impl Harvester {
    /// Creates a harvester with its own HTTP session
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration, already validated
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        let session = HttpSession::new(&config)?;
        Ok(Self::with_session(config, session))
    }

    /// Creates a harvester around an existing session
    pub fn with_session(config: Config, session: HttpSession) -> Self {
        Self {
            config,
            session,
            downloader: Downloader::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of requests sent so far
    pub fn requests_sent(&self) -> u64 {
        self.session.requests_sent()
    }

    /// Folder a keyword harvest saves into: `<root>/<keyword>/<Progetti|Documenti>`
    pub fn keyword_dir(&self, keyword: &str, search_type: SearchType) -> PathBuf {
        Path::new(&self.config.output.download_root)
            .join(sanitize_filename(keyword.trim()))
            .join(search_type.folder_label())
    }

    /// Folder a project list harvest saves into: `<root>/<folder>`
    pub fn list_dir(&self, folder: &str) -> PathBuf {
        Path::new(&self.config.output.download_root).join(sanitize_filename(folder.trim()))
    }

    /// Collects the result links of a keyword search without downloading
    pub async fn search(&mut self, keyword: &str, search_type: SearchType) -> Result<SearchResults> {
        let keyword = require_keyword(keyword)?;
        let results = SearchCrawler::new(&self.config)
            .crawl(&mut self.session, keyword, search_type)
            .await;
        Ok(results)
    }

    /// Runs the full keyword pipeline
    ///
    /// Only a blank keyword or an unusable base folder fail the run. A
    /// detail page that cannot be fetched, a project folder that cannot be
    /// created and a document that cannot be saved are logged, counted and
    /// skipped.
    pub async fn harvest_keyword(
        &mut self,
        keyword: &str,
        search_type: SearchType,
    ) -> Result<HarvestStats> {
        let keyword = require_keyword(keyword)?;
        let base_dir = self.keyword_dir(keyword, search_type);
        ensure_dir(&base_dir).await?;
        tracing::info!("Saving into {}", base_dir.display());

        let mut stats = HarvestStats::new();

        let results = SearchCrawler::new(&self.config)
            .crawl(&mut self.session, keyword, search_type)
            .await;
        stats.listing_pages = results.pages;
        stats.listing_termination = Some(results.termination.clone());
        stats.projects = results.links.len() as u64;

        if results.links.is_empty() {
            tracing::warn!("No results for '{}'", keyword);
        }

        let total = results.links.len();
        for (index, detail_url) in results.links.iter().enumerate() {
            let project_id = ProjectId::from_detail_url(detail_url);
            tracing::info!(
                "[{}/{}] Project {} ({})",
                index + 1,
                total,
                project_id,
                detail_url
            );

            let project_dir = base_dir.join(sanitize_filename(project_id.as_str()));
            if let Err(e) = ensure_dir(&project_dir).await {
                tracing::error!("Skipping {}: {}", detail_url, e);
                stats.failed_projects += 1;
                continue;
            }

            let resolved = DetailResolver::new(&self.config)
                .resolve(&mut self.session, detail_url)
                .await;
            if resolved.error.is_some() {
                stats.failed_projects += 1;
                continue;
            }

            for procedure_url in resolved.procedures.iter() {
                self.harvest_procedure(procedure_url, &project_dir, &mut stats)
                    .await;
            }
        }

        stats.finish();
        tracing::info!(
            "Harvest of '{}' finished: {} downloaded, {} skipped, {} failed",
            keyword,
            stats.downloaded,
            stats.skipped,
            stats.failed
        );
        Ok(stats)
    }

    /// Reads the project search results table for the list export
    pub async fn list_projects(&mut self, keyword: &str) -> Result<ProjectListing> {
        let keyword = require_keyword(keyword)?;
        let listing = SearchCrawler::new(&self.config)
            .list_projects(&mut self.session, keyword)
            .await;
        Ok(listing)
    }

    /// Downloads the documents of every project list row marked `YES`
    ///
    /// Each row's `doc_url` is walked as a procedure page and saved under
    /// `<root>/<folder>/<id>`. Rows without a `doc_url` are skipped.
    pub async fn harvest_project_list(
        &mut self,
        records: &[ProjectRecord],
        folder: &str,
    ) -> Result<HarvestStats> {
        if sanitize_filename(folder.trim()).is_empty() {
            return Err(HarvestError::EmptyFolder);
        }
        let base_dir = self.list_dir(folder);
        ensure_dir(&base_dir).await?;

        let mut stats = HarvestStats::new();
        let selected = select_included(records);
        stats.projects = selected.len() as u64;
        tracing::info!(
            "{} of {} projects marked for download, saving into {}",
            selected.len(),
            records.len(),
            base_dir.display()
        );

        let total = selected.len();
        for (index, record) in selected.into_iter().enumerate() {
            let project_id = ProjectId::from_raw(&record.id);
            tracing::info!(
                "[{}/{}] Project {}: {}",
                index + 1,
                total,
                project_id,
                record.title
            );

            let procedure_url = record.documentation_url.trim();
            if procedure_url.is_empty() {
                tracing::warn!("Project {} has no documentation link, skipping", project_id);
                stats.failed_projects += 1;
                continue;
            }

            let project_dir = base_dir.join(sanitize_filename(project_id.as_str()));
            if let Err(e) = ensure_dir(&project_dir).await {
                tracing::error!("Skipping project {}: {}", project_id, e);
                stats.failed_projects += 1;
                continue;
            }

            self.harvest_procedure(procedure_url, &project_dir, &mut stats)
                .await;
        }

        stats.finish();
        Ok(stats)
    }

    /// Downloads every document of one project, given its registry ID
    ///
    /// The detail page URL is built from the configured base URL and detail
    /// link marker. Documents land in `<dest>/<id>`, where `dest` defaults
    /// to the download root. A detail page that cannot be fetched is counted
    /// as a failed project, not an error.
    pub async fn harvest_project(
        &mut self,
        id: &str,
        output_dir: Option<&Path>,
    ) -> Result<HarvestStats> {
        let project_id = ProjectId::from_raw(id);
        if project_id.is_unknown() {
            return Err(HarvestError::InvalidProjectId(id.trim().to_string()));
        }

        let detail_url = build_detail_url(
            &self.config.site.base_url,
            &self.config.site.detail_link_marker,
            project_id.as_str(),
        )?;

        let project_dir = self
            .project_dir(output_dir)
            .join(sanitize_filename(project_id.as_str()));
        ensure_dir(&project_dir).await?;
        tracing::info!("Saving project {} into {}", project_id, project_dir.display());

        let mut stats = HarvestStats::new();
        stats.projects = 1;

        let resolved = DetailResolver::new(&self.config)
            .resolve(&mut self.session, detail_url.as_str())
            .await;
        if resolved.error.is_some() {
            stats.failed_projects += 1;
        } else if resolved.procedures.is_empty() {
            tracing::warn!("Project {} lists no documentation pages", project_id);
        }

        for procedure_url in resolved.procedures.iter() {
            self.harvest_procedure(procedure_url, &project_dir, &mut stats)
                .await;
        }

        stats.finish();
        Ok(stats)
    }

    /// Folder a single project harvest saves under, before the `<id>` folder
    pub fn project_dir(&self, output_dir: Option<&Path>) -> PathBuf {
        output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.config.output.download_root))
    }

    /// Walks one procedure page and saves every document it lists
    async fn harvest_procedure(
        &mut self,
        procedure_url: &str,
        project_dir: &Path,
        stats: &mut HarvestStats,
    ) {
        let listing = DocumentListCrawler::new(&self.config)
            .crawl(&mut self.session, procedure_url)
            .await;
        stats.record_procedure(listing.pages, listing.items.len(), &listing.termination);

        for document in &listing.items {
            let saved = self
                .downloader
                .save(
                    &mut self.session,
                    &document.download_url,
                    &document.filename,
                    project_dir,
                )
                .await;

            match saved {
                Ok(outcome) => stats.record_outcome(&outcome),
                Err(e) if e.is_filesystem() => {
                    tracing::error!("Failed to save {}: {}", document.download_url, e);
                    stats.failed += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to download {}: {}", document.download_url, e);
                    stats.failed += 1;
                }
            }
        }
    }
}

fn require_keyword(keyword: &str) -> Result<&str> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(HarvestError::EmptyKeyword);
    }
    Ok(keyword)
}

async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| HarvestError::Filesystem {
            path: path.to_path_buf(),
            source,
        })
}

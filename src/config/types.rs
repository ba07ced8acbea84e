use serde::Deserialize;

/// Main configuration structure for VIA-Harvest
///
/// Every section is optional in the TOML file; missing keys fall back to the
/// values the public registry currently uses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site layout: endpoints and the structural markers scraped on each page
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Scheme and host of the registry (e.g., "https://va.mite.gov.it")
    pub base_url: String,

    /// Path of the free-text search endpoint
    pub search_path: String,

    /// Query parameter carrying the page number on every listing
    pub page_param: String,

    /// Href marker of project detail links
    pub detail_link_marker: String,

    /// Href marker of documentation (procedure) links
    pub documentation_link_marker: String,

    /// Class of the search results table used by the project list export
    pub results_table_class: String,

    /// Class of the document table on procedure pages
    pub document_table_class: String,

    /// Title attribute identifying the download anchor of a document row
    pub download_link_title: String,

    /// Rows with fewer cells than this are skipped
    pub document_min_columns: usize,

    /// Index of the cell holding the file name
    pub filename_column: usize,

    /// Index of the cell holding the download anchor
    pub download_column: usize,

    /// Results per page when only a total result count is printed
    pub results_per_page: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://va.mite.gov.it".to_string(),
            search_path: "/it-IT/Ricerca/ViaLibera".to_string(),
            page_param: "pagina".to_string(),
            detail_link_marker: "/it-IT/Oggetti/Info/".to_string(),
            documentation_link_marker: "/it-IT/Oggetti/Documentazione/".to_string(),
            results_table_class: "ElencoViaVasRicerca".to_string(),
            document_table_class: "Documentazione".to_string(),
            download_link_title: "Scarica il documento".to_string(),
            document_min_columns: 9,
            filename_column: 1,
            download_column: 8,
            results_per_page: 10,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Pause inserted before every outbound request (milliseconds)
    pub request_delay_ms: u64,

    /// Timeout for listing and detail page fetches (seconds)
    pub page_timeout_secs: u64,

    /// Timeout for a download request and for each body read (seconds)
    pub download_timeout_secs: u64,

    /// Upper bound on pages walked by any single listing
    pub max_pages: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1000,
            page_timeout_secs: 10,
            download_timeout_secs: 20,
            max_pages: 10_000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "via-harvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`, with the
    /// parenthesised part reduced to whatever contact details are configured.
    pub fn header_value(&self) -> String {
        let base = format!("{}/{}", self.crawler_name, self.crawler_version);
        match (&self.contact_url, &self.contact_email) {
            (Some(url), Some(email)) => format!("{} (+{}; {})", base, url, email),
            (Some(url), None) => format!("{} (+{})", base, url),
            (None, Some(email)) => format!("{} ({})", base, email),
            (None, None) => base,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory all downloads are written under
    pub download_root: String,

    /// Default path of the project list CSV
    pub project_list_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_root: "downloads".to_string(),
            project_list_path: "projects_list.csv".to_string(),
        }
    }
}

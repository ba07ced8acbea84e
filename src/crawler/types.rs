use crate::config::SiteConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which registry search to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchType {
    /// Project search ("Ricerca Progetti"), results link to detail pages
    Projects,
    /// Document search ("Ricerca Documenti"), results link to documentation pages
    Documents,
}

impl SearchType {
    /// Value of the `t` query parameter
    pub fn code(&self) -> &'static str {
        match self {
            Self::Projects => "o",
            Self::Documents => "d",
        }
    }

    /// Folder name used under the keyword directory
    pub fn folder_label(&self) -> &'static str {
        match self {
            Self::Projects => "Progetti",
            Self::Documents => "Documenti",
        }
    }

    /// Href marker identifying result links for this search
    pub fn link_marker<'a>(&self, site: &'a SiteConfig) -> &'a str {
        match self {
            Self::Projects => &site.detail_link_marker,
            Self::Documents => &site.documentation_link_marker,
        }
    }

    /// Parses a user-facing name or code
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "o" | "projects" | "progetti" => Some(Self::Projects),
            "d" | "documents" | "documenti" => Some(Self::Documents),
            _ => None,
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_label())
    }
}

/// A downloadable document listed on a procedure page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Absolute download URL
    pub download_url: String,
    /// File name as printed by the registry; untrusted
    pub filename: String,
}

/// One row of the project list export
///
/// Serialized with the column names `id,url,doc_url,title,proponent,status,include`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub id: String,
    pub url: String,
    #[serde(rename = "doc_url")]
    pub documentation_url: String,
    pub title: String,
    pub proponent: String,
    pub status: String,
    pub include: String,
}

impl ProjectRecord {
    /// Returns true if the row is marked for download (`YES`, any case)
    pub fn is_included(&self) -> bool {
        self.include.trim().eq_ignore_ascii_case("yes")
    }
}

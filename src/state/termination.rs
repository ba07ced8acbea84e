//! Termination reasons for paginated listing walks
//!
//! Every listing walk (keyword search, project list, document table) ends in
//! exactly one of these states. Only [`Termination::LastPage`] means the
//! server said there was nothing more to read.

use std::fmt;

/// Why a listing walk stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    // ===== Complete =====
    /// The walked page reached the printed total
    LastPage {
        /// Total page count printed by the last fetched page
        total: u32,
    },

    // ===== Soft failures =====
    /// A page could not be fetched (transport error or non-2xx status)
    FetchFailed {
        /// The page number that failed
        page: u32,
        /// Error description
        error: String,
    },

    /// An otherwise successful page lacked the expected structural marker
    MarkerMissing {
        /// The page number missing the marker
        page: u32,
        /// The marker that was looked for (e.g., "table.Documentazione")
        marker: String,
    },

    /// The listing table was present but carried no data rows
    EmptyPage {
        /// The empty page number
        page: u32,
    },

    // ===== Guards =====
    /// The configured page cap was reached before the printed total
    PageLimit {
        /// The cap that was hit
        limit: u32,
    },
}

impl Termination {
    /// Returns true if the walk read every page the server advertised
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::LastPage { .. })
    }

    /// Returns true if the walk may have missed data because of an error
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::PageLimit { .. })
    }

    /// Short machine-friendly label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastPage { .. } => "last_page",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::MarkerMissing { .. } => "marker_missing",
            Self::EmptyPage { .. } => "empty_page",
            Self::PageLimit { .. } => "page_limit",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastPage { total } => write!(f, "last page reached ({} total)", total),
            Self::FetchFailed { page, error } => {
                write!(f, "fetch failed on page {}: {}", page, error)
            }
            Self::MarkerMissing { page, marker } => {
                write!(f, "'{}' missing on page {}", marker, page)
            }
            Self::EmptyPage { page } => write!(f, "no rows on page {}", page),
            Self::PageLimit { limit } => write!(f, "page limit of {} reached", limit),
        }
    }
}

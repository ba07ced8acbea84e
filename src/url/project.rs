use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Identifier of a registry entry, used only to name its download folder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectId(String);

impl ProjectId {
    /// Sentinel used when a detail URL carries no recognisable identifier
    pub const UNKNOWN: &'static str = "UnknownProject";

    /// Extracts the numeric identifier following `Info/` or `Documentazione/`
    ///
    /// Falls back to [`ProjectId::UNKNOWN`] rather than failing.
    ///
    /// # Examples
    ///
    /// ```
    /// use via_harvest::ProjectId;
    ///
    /// let id = ProjectId::from_detail_url("https://va.mite.gov.it/it-IT/Oggetti/Info/10217");
    /// assert_eq!(id.as_str(), "10217");
    /// assert!(ProjectId::from_detail_url("https://va.mite.gov.it/").is_unknown());
    /// ```
    pub fn from_detail_url(detail_url: &str) -> Self {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"(?:Info|Documentazione)/(\d+)").expect("project id pattern is valid")
        });

        pattern
            .captures(detail_url)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
            .unwrap_or_else(Self::unknown)
    }

    /// Builds an identifier from a value already known, e.g. a project list row
    ///
    /// Blank values and `.`/`..` fall back to [`ProjectId::UNKNOWN`], since the
    /// identifier names a folder.
    pub fn from_raw(id: &str) -> Self {
        match id.trim() {
            "" | "." | ".." => Self::unknown(),
            id => Self(id.to_string()),
        }
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! URL handling module for VIA-Harvest
//!
//! This module provides link resolution against a page URL, the deduplicating
//! [`LinkSet`], listing/search URL construction, project ID extraction, and
//! filename sanitization for the download layout.

mod link_set;
mod project;
mod resolve;
mod sanitize;

pub use link_set::LinkSet;
pub use project::ProjectId;
pub use resolve::{build_detail_url, build_search_url, resolve_link, with_page_param};
pub use sanitize::sanitize_filename;

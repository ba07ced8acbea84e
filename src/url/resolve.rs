use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be skipped:
/// - empty hrefs and fragment-only links
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use via_harvest::url::resolve_link;
/// use url::Url;
///
/// let page = Url::parse("https://va.mite.gov.it/it-IT/Ricerca/ViaLibera?Testo=eolico").unwrap();
/// let link = resolve_link("/it-IT/Oggetti/Info/10217", &page).unwrap();
/// assert_eq!(link, "https://va.mite.gov.it/it-IT/Oggetti/Info/10217");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Builds the free-text search URL for one results page
///
/// Produces `<base><search_path>?Testo=<keyword>&t=<type>&<page_param>=<page>`
/// with the keyword form-encoded.
pub fn build_search_url(
    base_url: &str,
    search_path: &str,
    keyword: &str,
    type_code: &str,
    page_param: &str,
    page: u32,
) -> UrlResult<Url> {
    let base = Url::parse(base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
    let mut url = base
        .join(search_path)
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    url.query_pairs_mut()
        .clear()
        .append_pair("Testo", keyword)
        .append_pair("t", type_code)
        .append_pair(page_param, &page.to_string());

    Ok(url)
}

/// Builds the detail page URL of a project: `<base><detail_marker><id>`
///
/// `detail_marker` is the detail link marker (`/it-IT/Oggetti/Info/`), so
/// the URL matches the ones search results link to. The ID is pushed as a
/// single, percent-encoded path segment.
pub fn build_detail_url(base_url: &str, detail_marker: &str, project_id: &str) -> UrlResult<Url> {
    let base = Url::parse(base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
    let mut url = base
        .join(detail_marker)
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| UrlError::CannotBeABase(base_url.to_string()))?
        .pop_if_empty()
        .push(project_id);

    Ok(url)
}

/// Returns the URL of page `page` of a paginated listing
///
/// Page 1 is the listing URL itself. Later pages append `?<param>=<page>`, or
/// `&<param>=<page>` when the URL already carries a query.
pub fn with_page_param(listing_url: &str, page_param: &str, page: u32) -> UrlResult<Url> {
    let url = Url::parse(listing_url).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if page <= 1 {
        return Ok(url);
    }

    if url.cannot_be_a_base() {
        return Err(UrlError::CannotBeABase(listing_url.to_string()));
    }

    let mut paged = url;
    paged
        .query_pairs_mut()
        .append_pair(page_param, &page.to_string());
    Ok(paged)
}

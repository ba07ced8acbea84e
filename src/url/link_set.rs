use std::collections::HashSet;

/// Insertion-ordered collection of absolute URLs with set semantics
///
/// Scoped to one crawl stage's accumulation: all detail URLs for a keyword,
/// or all procedure URLs for one detail page. URLs are compared by exact
/// string equality after resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl LinkSet {
    /// Creates an empty link set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a URL, returning true if it was not already present
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        true
    }

    /// Merges another set into this one, returning the number of new URLs
    pub fn merge(&mut self, other: LinkSet) -> usize {
        other
            .order
            .into_iter()
            .filter(|url| self.insert(url.as_str()))
            .count()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over the URLs in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.order.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = LinkSet::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

impl Extend<String> for LinkSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for url in iter {
            self.insert(url);
        }
    }
}

impl IntoIterator for LinkSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

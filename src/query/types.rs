use crate::index::types::Letter;
use crate::record::Entry;
use serde::{Deserialize, Serialize};

/// Answer to a page or search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub entries: Vec<Entry>,
    /// Size of the filtered universe, or the match count for searches.
    /// A lower bound when `approximate` is set.
    pub total: u64,
    pub has_more: bool,
    pub page: usize,
    /// True when `total` is an estimate because the scan stopped early
    #[serde(default)]
    pub approximate: bool,
}

impl QueryResult {
    pub fn empty(page: usize) -> Self {
        Self {
            entries: Vec::new(),
            total: 0,
            has_more: false,
            page,
            approximate: false,
        }
    }
}

/// Normalized search text: trimmed and lowercased, `None` when blank
pub fn normalize_search(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// A paginated listing request, optionally restricted to one letter and
/// optionally post-filtered by text on the returned page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: usize,
    pub limit: usize,
    pub letter: Option<Letter>,
    /// Page-local filter; applied to the page after it is read
    pub search: Option<String>,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page,
            limit,
            letter: None,
            search: None,
        }
    }

    pub fn with_letter(mut self, letter: Letter) -> Self {
        self.letter = Some(letter);
        self
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = normalize_search(search);
        self
    }

    /// Number of records before this page
    pub fn skip(&self) -> u64 {
        (self.page.saturating_sub(1) as u64).saturating_mul(self.limit as u64)
    }

    /// Canonical cache signature
    pub fn signature(&self) -> String {
        signature(
            QueryKind::Page,
            self.page,
            self.limit,
            self.letter,
            self.search.as_deref(),
        )
    }
}

/// A global substring search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Lowercased, trimmed query text
    pub query: String,
    pub page: usize,
    pub limit: usize,
}

impl SearchRequest {
    /// `None` when the query is blank
    pub fn new(query: &str, page: usize, limit: usize) -> Option<Self> {
        normalize_search(query).map(|query| Self { query, page, limit })
    }

    pub fn skip(&self) -> u64 {
        (self.page.saturating_sub(1) as u64).saturating_mul(self.limit as u64)
    }

    pub fn signature(&self) -> String {
        signature(QueryKind::Search, self.page, self.limit, None, Some(&self.query))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryKind {
    Page,
    Search,
}

/// Build a signature from the effective parameters. Fields appear in a
/// fixed order with the free-text part last, so distinct parameter sets can
/// never collide.
fn signature(
    kind: QueryKind,
    page: usize,
    limit: usize,
    letter: Option<Letter>,
    search: Option<&str>,
) -> String {
    let kind = match kind {
        QueryKind::Page => "page",
        QueryKind::Search => "search",
    };
    let letter = letter.map(|l| l.as_char()).unwrap_or('*');
    let search = search.unwrap_or("");
    format!("{kind}|p={page}|l={limit}|k={letter}|q={search}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(c: char) -> Letter {
        Letter::from_char(c).unwrap()
    }

    #[test]
    fn test_signature_ignores_presentation() {
        let a = PageRequest::new(2, 50)
            .with_search("  Tazi ")
            .with_letter(letter('a'));
        let b = PageRequest::new(2, 50)
            .with_letter(letter('A'))
            .with_search("tazi");
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_signature_distinguishes_parameters() {
        let base = PageRequest::new(1, 50);
        assert_ne!(base.signature(), PageRequest::new(2, 50).signature());
        assert_ne!(base.signature(), PageRequest::new(1, 51).signature());
        assert_ne!(
            base.signature(),
            PageRequest::new(1, 50).with_letter(letter('B')).signature()
        );
        assert_ne!(
            base.signature(),
            PageRequest::new(1, 50).with_search("x").signature()
        );
    }

    #[test]
    fn test_blank_search_is_absent() {
        let req = PageRequest::new(1, 10).with_search("   ");
        assert!(req.search.is_none());
        assert_eq!(req.signature(), PageRequest::new(1, 10).signature());
        assert!(SearchRequest::new(" \t", 1, 10).is_none());
    }

    #[test]
    fn test_page_and_search_signatures_differ() {
        let page = PageRequest::new(1, 10).with_search("tazi");
        let search = SearchRequest::new("tazi", 1, 10).unwrap();
        assert_ne!(page.signature(), search.signature());
    }

    #[test]
    fn test_skip() {
        assert_eq!(PageRequest::new(1, 50).skip(), 0);
        assert_eq!(PageRequest::new(3, 50).skip(), 100);
        assert_eq!(SearchRequest::new("a", 4, 10).unwrap().skip(), 30);
        assert_eq!(PageRequest::new(usize::MAX, 500).skip(), u64::MAX);
        assert_eq!(SearchRequest::new("a", usize::MAX, 500).unwrap().skip(), u64::MAX);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_value(QueryResult::empty(3)).unwrap();
        assert_eq!(json["hasMore"], false);
        assert_eq!(json["page"], 3);
        assert!(json["entries"].as_array().unwrap().is_empty());
    }
}

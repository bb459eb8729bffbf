//! Single-pass filtered scans.
//!
//! A scan walks the dataset once, rejects most lines with a cheap test on
//! the raw text, parses only the survivors and re-checks them against the
//! parsed fields. Paging skips matches without buffering them and the scan
//! stops the moment one match more than the page holds has been seen.

use crate::dataset::DatasetReader;
use crate::error::QueryError;
use crate::index::types::Letter;
use crate::record::{CONTACT_DOMAIN, Entry, parse_line};
use memchr::memmem;
use tracing::debug;

/// Decides which data lines a scan yields
pub trait LineMatcher {
    /// Cheap test on the trimmed raw line. Returning false must imply that
    /// [`accept`](LineMatcher::accept) would also reject the parsed entry.
    fn prefilter(&mut self, line: &str) -> bool;

    /// Exact test on the parsed entry
    fn accept(&self, entry: &Entry) -> bool;
}

/// Case-insensitive substring match on display name or derived contact.
pub struct SubstringMatcher {
    /// Lowercased query
    query: String,
    /// Finder over the query's ASCII alphanumerics; `None` when it has none
    finder: Option<memmem::Finder<'static>>,
    haystack: Vec<u8>,
    domain: Vec<u8>,
}

impl SubstringMatcher {
    pub fn new(query: &str) -> Self {
        let query = query.to_lowercase();

        let mut needle = Vec::with_capacity(query.len());
        fold_alphanumeric(&query, &mut needle);
        let finder = (!needle.is_empty()).then(|| memmem::Finder::new(&needle).into_owned());

        let mut domain = Vec::new();
        fold_alphanumeric(CONTACT_DOMAIN, &mut domain);

        Self {
            query,
            finder,
            haystack: Vec::with_capacity(128),
            domain,
        }
    }
}

impl LineMatcher for SubstringMatcher {
    fn prefilter(&mut self, line: &str) -> bool {
        let Some(finder) = &self.finder else {
            return true;
        };

        // The derived fields keep the raw line's ASCII alphanumerics in
        // order, and the contact appends the domain. Comparing on that
        // folded form rejects lines without ever missing a real match.
        self.haystack.clear();
        fold_alphanumeric(line, &mut self.haystack);
        self.haystack.extend_from_slice(&self.domain);
        finder.find(&self.haystack).is_some()
    }

    fn accept(&self, entry: &Entry) -> bool {
        entry.matches(&self.query)
    }
}

/// Lines whose first character falls in one letter bucket
pub struct LetterMatcher {
    letter: Letter,
}

impl LetterMatcher {
    pub fn new(letter: Letter) -> Self {
        Self { letter }
    }
}

impl LineMatcher for LetterMatcher {
    fn prefilter(&mut self, line: &str) -> bool {
        Letter::of_line(line) == Some(self.letter)
    }

    fn accept(&self, _entry: &Entry) -> bool {
        true
    }
}

/// Lowercase `text` and keep only ASCII letters and digits
fn fold_alphanumeric(text: &str, out: &mut Vec<u8>) {
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c as u8);
        }
    }
}

/// Lazy producer of matching entries in file order.
///
/// Dropping it, or hitting end of file or an error, closes the dataset.
pub struct Matches<M> {
    reader: Option<DatasetReader>,
    matcher: M,
}

impl<M: LineMatcher> Matches<M> {
    pub fn new(reader: DatasetReader, matcher: M) -> Self {
        Self {
            reader: Some(reader),
            matcher,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }
}

impl<M: LineMatcher> Iterator for Matches<M> {
    type Item = Result<Entry, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        match next_match(reader, &mut self.matcher) {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.reader = None;
                None
            }
            Err(e) => {
                self.reader = None;
                Some(Err(e))
            }
        }
    }
}

fn next_match<M: LineMatcher>(
    reader: &mut DatasetReader,
    matcher: &mut M,
) -> Result<Option<Entry>, QueryError> {
    while let Some(line) = reader.next_line()? {
        if !matcher.prefilter(line.text) {
            continue;
        }
        if let Some(entry) = parse_line(line.text, line.ordinal + 1)
            && matcher.accept(&entry)
        {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// One page of scan results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    pub entries: Vec<Entry>,
    /// At least one more match exists after this page
    pub has_more: bool,
    /// Matches seen before the scan stopped, skipped ones included
    pub matches_seen: u64,
}

impl ScanPage {
    /// Exact match count when the scan reached end of file, otherwise the
    /// running count plus `padding` as a lower-bound estimate.
    pub fn total(&self, padding: u64) -> u64 {
        if self.has_more {
            self.matches_seen + padding
        } else {
            self.matches_seen
        }
    }
}

/// Scan for one page: skip the first `skip` matches, keep the next `limit`,
/// and stop at the first match beyond them.
pub fn scan_page<M: LineMatcher>(
    reader: DatasetReader,
    matcher: M,
    skip: u64,
    limit: usize,
) -> Result<ScanPage, QueryError> {
    let mut matches = Matches::new(reader, matcher);
    let mut entries = Vec::with_capacity(limit.min(1024));
    let mut matches_seen = 0u64;
    let mut has_more = false;

    for entry in matches.by_ref() {
        let entry = entry?;
        matches_seen += 1;

        if matches_seen <= skip {
            continue;
        }
        if entries.len() < limit {
            entries.push(entry);
        } else {
            has_more = true;
            break;
        }
    }

    if has_more {
        debug!(matches_seen, skip, limit, "page filled; scan stopped early");
    }
    drop(matches);

    Ok(ScanPage {
        entries,
        has_more,
        matches_seen,
    })
}

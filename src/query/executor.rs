use crate::cache::ResultCache;
use crate::dataset::{CancelToken, DatasetReader};
use crate::error::QueryError;
use crate::index::reader::IndexStore;
use crate::index::types::{Letter, LetterRange, LetterSummary, Ordinal};
use crate::query::range::RangeReader;
use crate::query::search::{LetterMatcher, SubstringMatcher, scan_page};
use crate::query::types::{PageRequest, QueryResult, SearchRequest};
use crate::record::Entry;
use crate::utils::AppConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Query engine over one dataset and its persisted alphabet index.
///
/// Every query opens its own read stream, so a `Directory` can be shared
/// across threads; the result cache is the only shared mutable state.
pub struct Directory {
    dataset: PathBuf,
    index: IndexStore,
    cache: ResultCache,
    search_total_padding: u64,
}

impl Directory {
    /// Open the dataset with the index persisted in `index_dir`
    pub fn open(dataset: &Path, index_dir: &Path, config: &AppConfig) -> Result<Self, QueryError> {
        let index = IndexStore::open(index_dir)?;
        if index.is_stale(dataset) {
            warn!(
                dataset = %dataset.display(),
                index = %index_dir.display(),
                "dataset changed since it was indexed; rebuild the index"
            );
        }
        Ok(Self::with_index(dataset, index, config))
    }

    pub fn with_index(dataset: &Path, index: IndexStore, config: &AppConfig) -> Self {
        Self {
            dataset: dataset.to_path_buf(),
            index,
            cache: ResultCache::new(config.cache_capacity),
            search_total_padding: config.search_total_padding,
        }
    }

    pub fn index(&self) -> &IndexStore {
        &self.index
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// One page of the full listing or of a single letter.
    ///
    /// `total` is the size of the listed universe. A search text on the
    /// request only filters the entries of the page that was read.
    pub fn get_page(
        &self,
        request: &PageRequest,
        cancel: &CancelToken,
    ) -> Result<QueryResult, QueryError> {
        self.cached(request.signature(), || self.compute_page(request, cancel))
    }

    /// Global substring search over display names and contacts
    pub fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancelToken,
    ) -> Result<QueryResult, QueryError> {
        self.cached(request.signature(), || {
            let reader = DatasetReader::open(&self.dataset)?.with_cancel(cancel.clone());
            let page = scan_page(
                reader,
                SubstringMatcher::new(&request.query),
                request.skip(),
                request.limit,
            )?;

            Ok(QueryResult {
                total: page.total(self.search_total_padding),
                has_more: page.has_more,
                approximate: page.has_more,
                entries: page.entries,
                page: request.page,
            })
        })
    }

    /// First page of a letter
    pub fn jump_to_letter(
        &self,
        letter: Letter,
        limit: usize,
        cancel: &CancelToken,
    ) -> Result<QueryResult, QueryError> {
        self.get_page(&PageRequest::new(1, limit).with_letter(letter), cancel)
    }

    /// Count and first ordinal per letter, zeros for letters without entries
    pub fn alphabet_stats(&self) -> BTreeMap<Letter, LetterSummary> {
        self.index.alphabet_stats()
    }

    /// Look up one entry by its 1-based id
    pub fn entry_by_id(&self, id: u64, cancel: &CancelToken) -> Result<Option<Entry>, QueryError> {
        let Some(ordinal) = id.checked_sub(1) else {
            return Ok(None);
        };

        let checkpoint = self.index.checkpoint_before(ordinal);
        RangeReader::open_at(&self.dataset, checkpoint, ordinal, ordinal + 1)?
            .with_cancel(cancel.clone())
            .next()
            .transpose()
    }

    fn cached(
        &self,
        key: String,
        compute: impl FnOnce() -> Result<QueryResult, QueryError>,
    ) -> Result<QueryResult, QueryError> {
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let result = compute()?;
        self.cache.set(key, result.clone());
        Ok(result)
    }

    fn compute_page(
        &self,
        request: &PageRequest,
        cancel: &CancelToken,
    ) -> Result<QueryResult, QueryError> {
        let (start, end) = match request.letter {
            Some(letter) => match self.index.letter_range(letter) {
                None => return Ok(QueryResult::empty(request.page)),
                Some(range) if !range.contiguous => {
                    return self.scan_letter(letter, range, request, cancel);
                }
                Some(range) => (range.start, range.end),
            },
            None => (0, self.index.stats().total),
        };

        let (actual_start, actual_end) = page_window(start, end, request);
        let checkpoint = self.index.checkpoint_before(actual_start);

        let mut entries = RangeReader::open_at(&self.dataset, checkpoint, actual_start, actual_end)?
            .with_cancel(cancel.clone())
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(search) = &request.search {
            entries.retain(|e| e.matches(search));
        }

        Ok(QueryResult {
            has_more: actual_end < end && !entries.is_empty(),
            total: end - start,
            entries,
            page: request.page,
            approximate: false,
        })
    }

    /// Page through a letter whose lines are not contiguous by scanning for
    /// them; the index still supplies the exact count.
    fn scan_letter(
        &self,
        letter: Letter,
        range: &LetterRange,
        request: &PageRequest,
        cancel: &CancelToken,
    ) -> Result<QueryResult, QueryError> {
        debug!(letter = %letter, "letter is not contiguous; paging by scan");

        let reader =
            DatasetReader::open_at(&self.dataset, range.checkpoint())?.with_cancel(cancel.clone());
        let page = scan_page(reader, LetterMatcher::new(letter), request.skip(), request.limit)?;

        let mut entries = page.entries;
        if let Some(search) = &request.search {
            entries.retain(|e| e.matches(search));
        }

        Ok(QueryResult {
            has_more: page.has_more && !entries.is_empty(),
            total: range.count,
            entries,
            page: request.page,
            approximate: false,
        })
    }
}

/// `[actual_start, actual_end)` of the requested page inside `[start, end)`
fn page_window(start: Ordinal, end: Ordinal, request: &PageRequest) -> (Ordinal, Ordinal) {
    let actual_start = start.saturating_add(request.skip());
    let actual_end = actual_start.saturating_add(request.limit as u64).min(end);
    (actual_start, actual_end.max(actual_start))
}

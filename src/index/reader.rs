use crate::dataset::Checkpoint;
use crate::error::QueryError;
use crate::index::types::*;
use crate::index::writer::{META_FILE, STATS_FILE, letter_file_name};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read-only view of a persisted alphabet index.
///
/// The records are tiny (27 small JSON files), so they are loaded once when
/// the store opens and served from memory afterwards.
#[derive(Debug, Clone)]
pub struct IndexStore {
    index_path: PathBuf,
    index: AlphabetIndex,
    meta: Option<IndexMeta>,
}

impl IndexStore {
    /// Load the index at `index_path`.
    ///
    /// Missing letter records are normal (the letter has no entries). A
    /// missing stats record reads as an empty dataset.
    pub fn open(index_path: &Path) -> Result<Self, QueryError> {
        let mut index = AlphabetIndex::default();

        for letter in Letter::all() {
            index.ranges[letter.index()] =
                read_record(&index_path.join(letter_file_name(letter)))?;
        }

        index.stats = match read_record::<DatasetStats>(&index_path.join(STATS_FILE))? {
            Some(stats) => stats,
            None => {
                warn!(path = %index_path.display(), "no stats record found; treating dataset as empty");
                DatasetStats::default()
            }
        };

        let meta = read_record::<IndexMeta>(&index_path.join(META_FILE))?;

        debug!(
            path = %index_path.display(),
            total = index.stats.total,
            letters = index.iter().count(),
            "index loaded"
        );

        Ok(Self {
            index_path: index_path.to_path_buf(),
            index,
            meta,
        })
    }

    pub fn path(&self) -> &Path {
        &self.index_path
    }

    pub fn letter_range(&self, letter: Letter) -> Option<&LetterRange> {
        self.index.range(letter)
    }

    pub fn stats(&self) -> DatasetStats {
        self.index.stats
    }

    pub fn meta(&self) -> Option<&IndexMeta> {
        self.meta.as_ref()
    }

    /// Count and start for every letter; letters without a record report zeros.
    pub fn alphabet_stats(&self) -> BTreeMap<Letter, LetterSummary> {
        Letter::all()
            .map(|letter| {
                let summary = self
                    .letter_range(letter)
                    .map(|r| LetterSummary {
                        count: r.count,
                        start: r.start,
                    })
                    .unwrap_or_default();
                (letter, summary)
            })
            .collect()
    }

    /// Closest persisted seek point at or before `ordinal`
    pub fn checkpoint_before(&self, ordinal: Ordinal) -> Checkpoint {
        self.index
            .iter()
            .map(|(_, range)| range.checkpoint())
            .filter(|c| c.ordinal <= ordinal)
            .max_by_key(|c| c.ordinal)
            .unwrap_or(Checkpoint::START)
    }

    /// True when the dataset's size no longer matches the one indexed.
    /// Without a meta record staleness cannot be judged and this is false.
    pub fn is_stale(&self, dataset: &Path) -> bool {
        match (&self.meta, dataset.metadata()) {
            (Some(meta), Ok(m)) => m.len() != meta.dataset_bytes,
            _ => false,
        }
    }
}

/// Read one JSON record; `Ok(None)` when the file does not exist.
fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, QueryError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(QueryError::IndexUnavailable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|source| QueryError::IndexCorrupt {
            path: path.to_path_buf(),
            source,
        })
}

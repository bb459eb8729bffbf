use crate::dataset::DatasetReader;
use crate::index::types::{AlphabetIndex, DatasetStats, INDEX_VERSION, IndexMeta, Letter, LetterRange};
use crate::index::reader::IndexStore;
use crate::index::writer::{IndexWriter, META_FILE};
use crate::utils::progress::{ProgressBar, ProgressStyle};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Lines between progress updates
const PROGRESS_INTERVAL: u64 = 1 << 16;

/// Single-pass builder of the per-letter range table.
///
/// Feed every data line in file order. Memory stays at the 26-entry table
/// regardless of dataset size.
#[derive(Debug, Default)]
pub struct AlphabetIndexer {
    ranges: [Option<LetterRange>; 26],
    /// Bucket of the previous data line (`None` for a non-letter line)
    previous: Option<Letter>,
    total: u64,
}

impl AlphabetIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one data line starting at byte `offset`.
    pub fn observe(&mut self, text: &str, offset: u64) {
        let ordinal = self.total;
        self.total += 1;

        let Some(letter) = Letter::of_line(text) else {
            self.previous = None;
            return;
        };

        let slot = &mut self.ranges[letter.index()];
        if let Some(range) = slot.as_mut() {
            if self.previous != Some(letter) && range.contiguous {
                warn!(
                    letter = %letter,
                    ordinal,
                    "letter reappears after its run ended; dataset is not grouped by first letter"
                );
                range.contiguous = false;
            }
            range.count += 1;
            range.end = ordinal + 1;
        } else {
            *slot = Some(LetterRange {
                start: ordinal,
                end: ordinal + 1,
                count: 1,
                offset: Some(offset),
                contiguous: true,
            });
        }

        self.previous = Some(letter);
    }

    /// Number of data lines observed so far
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn finish(self) -> AlphabetIndex {
        AlphabetIndex {
            ranges: self.ranges,
            stats: DatasetStats { total: self.total },
        }
    }
}

/// Scan the dataset once and return its alphabet table without persisting it.
pub fn scan_dataset(dataset: &Path, progress: Option<&ProgressBar>) -> Result<AlphabetIndex> {
    let mut reader = DatasetReader::open(dataset)
        .with_context(|| format!("Failed to open dataset {}", dataset.display()))?;
    let mut indexer = AlphabetIndexer::new();

    while let Some(line) = reader.next_line()? {
        indexer.observe(line.text, line.offset);

        if let Some(pb) = progress
            && indexer.total() % PROGRESS_INTERVAL == 0
        {
            pb.set_message(format!("Indexed {} lines...", indexer.total()));
        }
    }

    Ok(indexer.finish())
}

/// Build the index for `dataset` and persist it into `index_dir`.
pub fn build_index(dataset: &Path, index_dir: &Path, silent: bool) -> Result<AlphabetIndex> {
    let dataset = dataset
        .canonicalize()
        .with_context(|| format!("Invalid dataset path {}", dataset.display()))?;
    let dataset_bytes = dataset
        .metadata()
        .context("Failed to stat dataset")?
        .len();

    let spinner = if !silent {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.set_message("Scanning dataset...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        Some(spinner)
    } else {
        None
    };

    let index = scan_dataset(&dataset, spinner.as_ref())?;

    if let Some(spinner) = spinner {
        spinner.finish_with_message(format!("Scanned {} lines", index.stats.total));
    }

    let meta = IndexMeta {
        version: INDEX_VERSION,
        dataset_path: dataset.clone(),
        dataset_bytes,
        built_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
    };

    IndexWriter::new(index_dir).write(&index, &meta)?;

    info!(
        dataset = %dataset.display(),
        index = %index_dir.display(),
        total = index.stats.total,
        letters = index.iter().count(),
        "index built"
    );

    Ok(index)
}

/// Build the index unless an up-to-date one already exists in `index_dir`.
/// Returns `None` when the existing index was kept.
pub fn ensure_index(
    dataset: &Path,
    index_dir: &Path,
    force: bool,
    silent: bool,
) -> Result<Option<AlphabetIndex>> {
    if !force
        && index_dir.join(META_FILE).exists()
        && let Ok(store) = IndexStore::open(index_dir)
        && !store.is_stale(dataset)
    {
        info!(index = %index_dir.display(), "index is up to date");
        return Ok(None);
    }
    build_index(dataset, index_dir, silent).map(Some)
}

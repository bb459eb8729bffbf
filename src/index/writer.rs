use crate::index::types::{AlphabetIndex, IndexMeta, Letter};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const STATS_FILE: &str = "stats.json";
pub const META_FILE: &str = "meta.json";

/// File holding the range record for one letter
pub fn letter_file_name(letter: Letter) -> String {
    format!("{}.json", letter)
}

/// Persists an [`AlphabetIndex`] as one JSON record per letter plus the
/// stats and meta records.
///
/// Records are written to a staging directory which then replaces the live
/// one, so readers never see a half-written index and letters that vanished
/// from the dataset do not leave stale records behind.
pub struct IndexWriter {
    index_path: PathBuf,
}

impl IndexWriter {
    pub fn new(index_path: &Path) -> Self {
        Self {
            index_path: index_path.to_path_buf(),
        }
    }

    pub fn write(&self, index: &AlphabetIndex, meta: &IndexMeta) -> Result<()> {
        let staging = self.staging_path();
        ensure_replaceable(&self.index_path)?;
        ensure_replaceable(&staging)?;
        if staging.exists() {
            fs::remove_dir_all(&staging).context("Failed to clear staging directory")?;
        }
        fs::create_dir_all(&staging)
            .with_context(|| format!("Failed to create {}", staging.display()))?;

        for (letter, range) in index.iter() {
            write_json(&staging.join(letter_file_name(letter)), range)?;
        }
        write_json(&staging.join(STATS_FILE), &index.stats)?;
        write_json(&staging.join(META_FILE), meta)?;

        if self.index_path.exists() {
            fs::remove_dir_all(&self.index_path).context("Failed to replace previous index")?;
        }
        fs::rename(&staging, &self.index_path)
            .with_context(|| format!("Failed to move index into {}", self.index_path.display()))?;

        debug!(path = %self.index_path.display(), "index records written");
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .index_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "index".into());
        name.push(".building");
        self.index_path.with_file_name(name)
    }
}

/// Refuse to clear a path that holds anything besides index records.
/// Index directories are user-chosen and may point at real data.
fn ensure_replaceable(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if !path.is_dir() {
        bail!("{} exists and is not a directory", path.display());
    }
    for entry in fs::read_dir(path).with_context(|| format!("Failed to read {}", path.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() || !is_record_name(&entry.file_name()) {
            bail!(
                "{} contains {:?}, which is not an index record; refusing to replace it",
                path.display(),
                entry.file_name()
            );
        }
    }
    Ok(())
}

fn is_record_name(name: &OsStr) -> bool {
    let Some(name) = name.to_str() else {
        return false;
    };
    name == STATS_FILE || name == META_FILE || Letter::all().any(|l| letter_file_name(l) == name)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut file = BufWriter::new(
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
    );
    serde_json::to_writer_pretty(&mut file, value)?;
    file.flush()?;
    Ok(())
}

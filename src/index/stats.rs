use crate::index::reader::IndexStore;
use crate::index::types::LetterSummary;
use crate::utils::list_indexed_datasets;
use anyhow::Result;
use std::path::Path;

/// Display index statistics and the per-letter breakdown
pub fn show_stats(dataset: &Path, store: &IndexStore) -> Result<()> {
    let total = store.stats().total;

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Dataset:          {}", dataset.display());
    println!("Index location:   {}", store.path().display());
    if let Some(meta) = store.meta() {
        println!("Index version:    {}", meta.version);
        println!("Dataset size:     {}", format_size(meta.dataset_bytes));
    }
    println!("Entry count:      {}", total);
    if store.is_stale(dataset) {
        println!("Status:           stale (dataset changed, run `namedex index --force`)");
    }

    let stats = store.alphabet_stats();
    let widest = stats.values().map(|s| s.count).max().unwrap_or(0);

    println!();
    println!("Entries by letter:");
    for (letter, summary) in &stats {
        if summary.count == 0 {
            continue;
        }
        println!(
            "  {}  {:>10}  {:>6}  {}",
            letter,
            summary.count,
            format_share(summary.count, total),
            bar(summary, widest)
        );
    }

    let empty: String = stats
        .iter()
        .filter(|(_, s)| s.count == 0)
        .map(|(l, _)| l.as_char())
        .collect();
    if !empty.is_empty() {
        println!("  (no entries: {})", empty);
    }

    if let Ok(size) = dir_size(store.path()) {
        println!();
        println!("Index size:       {}", format_size(size));
    }

    if let Some(meta) = store.meta() {
        println!("Built:            {}", format_timestamp(meta.built_at));
    }

    Ok(())
}

/// List all indexed datasets
pub fn list_indexes() -> Result<()> {
    let datasets = list_indexed_datasets()?;

    if datasets.is_empty() {
        println!("No indexed datasets found.");
        return Ok(());
    }

    println!("Indexed Datasets");
    println!("================");
    println!();

    for dataset in datasets {
        let exists = dataset.dataset_path.exists();
        let status = if exists { "" } else { " [missing]" };
        println!("  {}{}", dataset.dataset_path.display(), status);
        println!("    Index: {}", dataset.index_dir.display());
        println!();
    }

    Ok(())
}

const BAR_WIDTH: u64 = 30;

fn bar(summary: &LetterSummary, widest: u64) -> String {
    if widest == 0 {
        return String::new();
    }
    let len = (summary.count * BAR_WIDTH).div_ceil(widest);
    "#".repeat(len as usize)
}

fn format_share(count: u64, total: u64) -> String {
    if total == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

/// Calculate directory size recursively
fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut size = 0;
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                size += entry.metadata()?.len();
            } else if path.is_dir() {
                size += dir_size(&path)?;
            }
        }
    }
    Ok(size)
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format unix timestamp
fn format_timestamp(ts: u64) -> String {
    use std::time::{Duration, UNIX_EPOCH};
    let datetime = UNIX_EPOCH + Duration::from_secs(ts);
    format!("{:?}", datetime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(1, 4), "25.0%");
        assert_eq!(format_share(0, 0), "-");
    }

    #[test]
    fn test_bar_scales_to_widest() {
        let full = LetterSummary { count: 10, start: 0 };
        let small = LetterSummary { count: 1, start: 0 };
        assert_eq!(bar(&full, 10).len(), BAR_WIDTH as usize);
        assert_eq!(bar(&small, 10).len(), 3);
        assert!(bar(&small, 0).is_empty());
    }
}

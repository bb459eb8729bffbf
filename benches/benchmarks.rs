//! Performance benchmarks for namedex
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use namedex::dataset::CancelToken;
use namedex::index::types::Letter;
use namedex::query::{Directory, PageRequest, SearchRequest};
use namedex::utils::AppConfig;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const FIRST: &[&str] = &[
    "Adam", "Amina", "Bilal", "Chaimae", "Driss", "Fatima", "Hamza", "Imane", "Karim", "Leila",
    "Mehdi", "Nadia", "Omar", "Rachid", "Salma", "Walid", "Yasmine", "Zakaria",
];
const LAST: &[&str] = &["Naciri", "Tazi", "Idrissi", "Alaoui", "Bennani", "Chraibi", "El Fassi"];

/// Lines per first name
const PER_NAME: usize = 5_000;

/// Create a sorted dataset of ~90k names with its index
fn create_benchmark_fixtures() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dataset = temp_dir.path().join("names.txt");
    let index_dir = temp_dir.path().join("index");

    let mut content = String::new();
    for first in FIRST {
        for i in 0..PER_NAME {
            let last = LAST[i % LAST.len()];
            writeln!(content, "{} {} {}", first, last, i).expect("Failed to format line");
        }
    }
    fs::write(&dataset, content).expect("Failed to write dataset");

    namedex::index::build::build_index(&dataset, &index_dir, true)
        .expect("Failed to build index");

    (temp_dir, dataset, index_dir)
}

fn uncached() -> AppConfig {
    AppConfig {
        cache_capacity: 0,
        ..AppConfig::default()
    }
}

fn bench_parse_line(c: &mut Criterion) {
    let lines = ["Ahmed Naciri", "Chaimae,Alaoui", "Sean   O'Brien-Smith", "Zakaria"];

    c.bench_function("parse_line", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(namedex::record::parse_line(black_box(line), 1));
            }
        })
    });
}

fn bench_indexing(c: &mut Criterion) {
    let (_temp_dir, dataset, _) = create_benchmark_fixtures();

    let mut group = c.benchmark_group("indexing");
    group.sample_size(10);
    group.bench_function("scan_dataset", |b| {
        b.iter(|| namedex::index::build::scan_dataset(black_box(&dataset), None))
    });
    group.finish();
}

fn bench_pages(c: &mut Criterion) {
    let (_temp_dir, dataset, index_dir) = create_benchmark_fixtures();
    let directory = Directory::open(&dataset, &index_dir, &uncached()).expect("Failed to open");

    let mut group = c.benchmark_group("page");

    for letter in ['A', 'K', 'Z'] {
        let letter = Letter::from_char(letter).expect("letter");
        group.bench_with_input(BenchmarkId::new("letter_first", letter), &letter, |b, l| {
            let request = PageRequest::new(1, 50).with_letter(*l);
            b.iter(|| directory.get_page(black_box(&request), &CancelToken::new()))
        });
    }

    group.bench_function("deep_unfiltered", |b| {
        let request = PageRequest::new(1500, 50);
        b.iter(|| directory.get_page(black_box(&request), &CancelToken::new()))
    });

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let (_temp_dir, dataset, index_dir) = create_benchmark_fixtures();
    let directory = Directory::open(&dataset, &index_dir, &uncached()).expect("Failed to open");

    let mut group = c.benchmark_group("search");

    // Common term: the first page fills almost immediately
    group.bench_function("early_stop", |b| {
        let request = SearchRequest::new("tazi", 1, 50).expect("query");
        b.iter(|| directory.search(black_box(&request), &CancelToken::new()))
    });

    // Term near the end of the file
    group.bench_function("late_match", |b| {
        let request = SearchRequest::new("zakaria el", 1, 50).expect("query");
        b.iter(|| directory.search(black_box(&request), &CancelToken::new()))
    });

    // No match at all: full scan, nearly every line rejected by the prefilter
    group.bench_function("full_scan_miss", |b| {
        let request = SearchRequest::new("nobody", 1, 50).expect("query");
        b.iter(|| directory.search(black_box(&request), &CancelToken::new()))
    });

    group.finish();
}

fn bench_index_open(c: &mut Criterion) {
    let (_temp_dir, _, index_dir) = create_benchmark_fixtures();

    c.bench_function("index_open", |b| {
        b.iter(|| namedex::index::reader::IndexStore::open(black_box(&index_dir)))
    });
}

criterion_group!(
    benches,
    bench_parse_line,
    bench_indexing,
    bench_pages,
    bench_search,
    bench_index_open,
);

criterion_main!(benches);

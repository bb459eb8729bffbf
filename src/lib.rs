//! # namedex - Letter-indexed name directory
//!
//! namedex serves paginated, letter-filtered and searchable views over a
//! plain-text directory of names (one per line) that is far too large to
//! hold in memory. An offline pass records where every first-letter bucket
//! lives in the file; queries then stream only the lines they need.
//!
//! ## Architecture
//!
//! - [`record`] - Turning a raw line into an [`record::Entry`]
//! - [`dataset`] - Buffered line source shared by every reader, plus cancellation
//! - [`index`] - Building, persisting and loading the per-letter range table
//! - [`query`] - Range reads, filtered scans and the [`query::Directory`] facade
//! - [`cache`] - Bounded LRU cache of query results
//! - [`output`] - Terminal and JSON rendering for the CLI
//! - [`utils`] - App data locations, configuration and progress display
//!
//! ## Quick Start
//!
//! ```ignore
//! use namedex::dataset::CancelToken;
//! use namedex::index::build_index;
//! use namedex::query::{Directory, PageRequest};
//! use namedex::utils::AppConfig;
//! use std::path::Path;
//!
//! let dataset = Path::new("names.txt");
//! let index_dir = Path::new("names.index");
//! build_index(dataset, index_dir, true)?;
//!
//! let directory = Directory::open(dataset, index_dir, &AppConfig::default())?;
//! let letter = "A".parse().unwrap();
//! let page = directory.get_page(&PageRequest::new(1, 50).with_letter(letter), &CancelToken::new())?;
//!
//! for entry in page.entries {
//!     println!("{} {}", entry.id, entry.display_name);
//! }
//! ```

pub mod cache;
pub mod dataset;
pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod record;
pub mod utils;

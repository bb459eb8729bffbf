pub mod build;
pub mod reader;
pub mod stats;
pub mod types;
pub mod writer;

pub use build::{AlphabetIndexer, build_index};
pub use reader::IndexStore;
pub use types::*;
pub use writer::IndexWriter;

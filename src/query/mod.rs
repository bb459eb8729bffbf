pub mod executor;
pub mod range;
pub mod search;
pub mod types;

pub use executor::Directory;
pub use range::{RangeReader, read_range};
pub use search::{LetterMatcher, LineMatcher, ScanPage, SubstringMatcher, scan_page};
pub use types::{PageRequest, QueryResult, SearchRequest};

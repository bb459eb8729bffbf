use crate::dataset::Checkpoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Current on-disk index format version
pub const INDEX_VERSION: u32 = 1;

/// Data line ordinal (0-based, blank and comment lines excluded)
pub type Ordinal = u64;

/// An uppercase ASCII letter A–Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Letter(u8);

impl Letter {
    /// Bucket a character, case-insensitively. Anything outside A–Z is `None`.
    #[inline]
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Some(Self(upper as u8))
        } else {
            None
        }
    }

    /// Bucket of a data line, by its first character
    #[inline]
    pub fn of_line(line: &str) -> Option<Self> {
        line.chars().next().and_then(Self::from_char)
    }

    pub fn as_char(self) -> char {
        self.0 as char
    }

    /// Position in the alphabet, 0 for A
    pub fn index(self) -> usize {
        (self.0 - b'A') as usize
    }

    /// All 26 letters in order
    pub fn all() -> impl Iterator<Item = Letter> {
        (b'A'..=b'Z').map(Letter)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Letter {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Letter::from_char(c).ok_or_else(|| format!("'{}' is not a letter A-Z", c))
    }
}

impl From<Letter> for char {
    fn from(letter: Letter) -> char {
        letter.as_char()
    }
}

impl std::str::FromStr for Letter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::try_from(c),
            _ => Err(format!("'{}' is not a single letter", s)),
        }
    }
}

/// Persisted line range for one first-letter bucket.
///
/// `start` is inclusive and `end` exclusive, both in data line ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterRange {
    pub start: Ordinal,
    pub end: Ordinal,
    pub count: u64,
    /// Byte offset of the `start` line in the dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// False when the letter's lines are interleaved with other lines, in
    /// which case `start..end` spans foreign lines and must not be paged
    /// directly.
    #[serde(default = "default_contiguous")]
    pub contiguous: bool,
}

fn default_contiguous() -> bool {
    true
}

impl LetterRange {
    /// Where a reader should seek to get close to `start`. Records written
    /// without an offset fall back to the beginning of the file.
    pub fn checkpoint(&self) -> Checkpoint {
        match self.offset {
            Some(offset) => Checkpoint {
                offset,
                ordinal: self.start,
            },
            None => Checkpoint::START,
        }
    }
}

/// Dataset-wide statistics (stats.json)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasetStats {
    /// Number of data lines in the dataset
    pub total: u64,
}

/// Index metadata stored in meta.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub version: u32,
    pub dataset_path: PathBuf,
    /// Dataset size when the index was built; a mismatch means a stale index
    pub dataset_bytes: u64,
    pub built_at: u64,
}

/// The full alphabet table produced by one indexing pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlphabetIndex {
    pub ranges: [Option<LetterRange>; 26],
    pub stats: DatasetStats,
}

impl AlphabetIndex {
    pub fn range(&self, letter: Letter) -> Option<&LetterRange> {
        self.ranges[letter.index()].as_ref()
    }

    /// Non-empty ranges in alphabetical order
    pub fn iter(&self) -> impl Iterator<Item = (Letter, &LetterRange)> {
        Letter::all().filter_map(|l| self.range(l).map(|r| (l, r)))
    }
}

/// Per-letter summary reported by alphabet stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterSummary {
    pub count: u64,
    pub start: Ordinal,
}

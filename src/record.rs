//! Record parsing: one raw dataset line into one [`Entry`].

use serde::{Deserialize, Serialize};

/// Lines starting with this marker are ignored everywhere.
pub const COMMENT_MARKER: char = '#';

/// Suffix appended to every derived contact address.
pub const CONTACT_DOMAIN: &str = "@example.com";

/// One parsed directory record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// 1-based position among the dataset's data lines
    pub id: u64,
    pub display_name: String,
    pub first_part: String,
    pub last_part: String,
    pub derived_contact: String,
}

impl Entry {
    /// Case-insensitive containment check against the display name and the
    /// derived contact. `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.display_name.to_lowercase().contains(needle) || self.derived_contact.contains(needle)
    }
}

/// Returns the trimmed line if it carries data, `None` for blank and
/// comment lines.
#[inline]
pub fn data_line(raw: &str) -> Option<&str> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with(COMMENT_MARKER) {
        None
    } else {
        Some(line)
    }
}

/// Parse a raw line into an entry with the given id.
pub fn parse_line(raw: &str, id: u64) -> Option<Entry> {
    let line = data_line(raw)?;

    let (display_name, first_part, last_part) = if let Some((first, rest)) = line.split_once(',') {
        // "First,Last[,more]": everything after the first comma is the last part
        let first = first.trim().to_string();
        let last = rest.trim().to_string();
        (format!("{} {}", first, last), first, last)
    } else if line.contains(char::is_whitespace) {
        let mut tokens = line.split_whitespace();
        let first = tokens.next().unwrap_or_default().to_string();
        let last = tokens.collect::<Vec<_>>().join(" ");
        (line.to_string(), first, last)
    } else {
        (line.to_string(), line.to_string(), String::new())
    };

    let derived_contact = derive_contact(&display_name);

    Some(Entry {
        id,
        display_name,
        first_part,
        last_part,
        derived_contact,
    })
}

/// Build the synthetic contact address for a display name.
///
/// Lowercases, collapses whitespace runs into `.`, drops everything outside
/// `[a-z0-9.]` and appends [`CONTACT_DOMAIN`].
pub fn derive_contact(display_name: &str) -> String {
    let mut local = String::with_capacity(display_name.len() + CONTACT_DOMAIN.len());
    let mut in_whitespace = false;

    for c in display_name.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            if !in_whitespace {
                local.push('.');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' {
            local.push(c);
        }
    }

    local.push_str(CONTACT_DOMAIN);
    local
}

//! Output formatting for query results

use crate::query::types::QueryResult;
use crate::record::Entry;
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print a page of entries followed by a one-line summary
pub fn print_result(result: &QueryResult, limit: usize, color: bool) -> io::Result<()> {
    let mut stdout = stdout(color);
    let width = id_width(&result.entries);

    for entry in &result.entries {
        print_entry(&mut stdout, entry, width)?;
    }

    if result.entries.is_empty() {
        writeln!(stdout, "No entries.")?;
    }

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    write!(stdout, "{}", page_footer(result, limit))?;
    stdout.reset()?;
    writeln!(stdout)?;

    Ok(())
}

/// Print a single entry looked up by id
pub fn print_single(entry: Option<&Entry>, color: bool) -> io::Result<()> {
    let mut stdout = stdout(color);
    match entry {
        Some(entry) => print_entry(&mut stdout, entry, 0),
        None => writeln!(stdout, "No entry with that id."),
    }
}

/// Serialize any result as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)
}

fn print_entry(stdout: &mut StandardStream, entry: &Entry, width: usize) -> io::Result<()> {
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(stdout, "{:>width$}", entry.id, width = width)?;
    stdout.reset()?;
    write!(stdout, "  ")?;

    stdout.set_color(ColorSpec::new().set_bold(true))?;
    write!(stdout, "{}", entry.display_name)?;
    stdout.reset()?;
    write!(stdout, "  ")?;

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Blue)))?;
    write!(stdout, "<{}>", entry.derived_contact)?;
    stdout.reset()?;
    writeln!(stdout)
}

fn id_width(entries: &[Entry]) -> usize {
    entries
        .iter()
        .map(|e| e.id.to_string().len())
        .max()
        .unwrap_or(1)
}

fn page_footer(result: &QueryResult, limit: usize) -> String {
    let total = if result.approximate {
        format!("at least {}", result.total)
    } else {
        result.total.to_string()
    };

    let mut footer = format!(
        "page {} ({} shown, limit {}), total {}",
        result.page,
        result.entries.len(),
        limit,
        total
    );
    if result.has_more {
        footer.push_str(", more available");
    }
    footer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_line;

    #[test]
    fn test_page_footer() {
        let mut result = QueryResult::empty(2);
        result.total = 40;
        assert_eq!(
            page_footer(&result, 10),
            "page 2 (0 shown, limit 10), total 40"
        );

        result.has_more = true;
        result.approximate = true;
        assert_eq!(
            page_footer(&result, 10),
            "page 2 (0 shown, limit 10), total at least 40, more available"
        );
    }

    #[test]
    fn test_id_width() {
        let entries: Vec<_> = [(7, "Ahmed"), (1234, "Amine")]
            .iter()
            .filter_map(|(id, line)| parse_line(line, *id))
            .collect();
        assert_eq!(id_width(&entries), 4);
        assert_eq!(id_width(&[]), 1);
    }
}

//! Sort key generation.
//!
//! Sort keys are comparable strings of the form
//! `[parent bit][directory bit][column value]`. The bit polarity flips with
//! the sort direction so the parent marker stays first and directories stay
//! ahead of files regardless of direction.

use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// Width numeric runs and numeric columns are zero-padded to.
const NUMERIC_PAD: usize = 12;

/// Column the list is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortColumn {
    #[default]
    Name,
    Extension,
    Size,
    Mode,
    Time,
}

/// Active sort settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SortConfig {
    /// Sort direction.
    pub ascending: bool,
    /// Column sorted by.
    pub column: SortColumn,
    /// Pad numeric runs in names so `file2` precedes `file10`.
    pub number_sensitive: bool,
    /// Compare text without lower-casing first.
    pub case_sensitive: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            ascending: true,
            column: SortColumn::Name,
            number_sensitive: false,
            case_sensitive: false,
        }
    }
}

/// Generate the composite sort key for an entry.
pub fn sort_key(entry: &Entry, config: &SortConfig) -> String {
    let bits = if config.ascending { ['1', '0'] } else { ['0', '1'] };
    let parent_bit = bits[entry.is_parent() as usize];
    let dir_bit = bits[entry.is_dir() as usize];

    let value = match config.column {
        SortColumn::Name => text_value(&entry.name, config),
        SortColumn::Extension => text_value(entry.extension(), config),
        SortColumn::Size => numeric_value(entry.size),
        SortColumn::Mode => numeric_value(entry.mode as i64),
        SortColumn::Time => numeric_value(entry.mtime),
    };

    let mut key = String::with_capacity(value.len() + 2);
    key.push(parent_bit);
    key.push(dir_bit);
    key.push_str(&value);
    key
}

fn text_value(text: &str, config: &SortConfig) -> String {
    let value = if config.number_sensitive && config.column == SortColumn::Name {
        pad_numeric_runs(text)
    } else {
        text.to_string()
    };

    if config.case_sensitive {
        value
    } else {
        value.to_lowercase()
    }
}

fn numeric_value(value: i64) -> String {
    format!("{value:0>width$}", width = NUMERIC_PAD)
}

/// Left-pad runs of ASCII digits with zeros to a fixed width so numbers
/// compare numerically within otherwise lexical keys.
fn pad_numeric_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + NUMERIC_PAD);
    let mut run = String::new();

    for ch in text.chars() {
        if ch.is_ascii_digit() {
            run.push(ch);
        } else {
            flush_run(&mut out, &mut run);
            out.push(ch);
        }
    }
    flush_run(&mut out, &mut run);
    out
}

fn flush_run(out: &mut String, run: &mut String) {
    if run.is_empty() {
        return;
    }
    for _ in run.len()..NUMERIC_PAD {
        out.push('0');
    }
    out.push_str(run);
    run.clear();
}

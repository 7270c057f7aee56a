//! Markdown tables from heterogeneous report records.
//!
//! A [`Report`] is an ordered list of named cells. Records in one table
//! need not share the same fields: the column set is the union of every
//! record's keys in first-seen order, and a record without a column leaves
//! a blank, width-padded cell.
//!
//! ```text
//! | trials| sample mean| status|
//! |:-----:|:----------:|:-----:|
//! | 100   | 31.52      |       |
//! | 1000  | 31.61      | ok    |
//! ```

use std::fmt;
use std::io::{self, Write};

/// Display value of a report cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Value::Float(v as f64), Value::Int)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::from(v as u64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Ordered mapping from field name to [`Value`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    fields: Vec<(String, Value)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Report {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut report = Report::new();
        for (k, v) in iter {
            report.insert(k, v);
        }
        report
    }
}

/// Column titles: `known_titles` first, then every report key not seen yet.
pub fn columns(reports: &[Report], known_titles: Option<&[&str]>) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    let seeds = known_titles.unwrap_or_default().iter().copied();
    let keys = reports.iter().flat_map(Report::keys);
    for title in seeds.chain(keys) {
        if !titles.iter().any(|t| t == title) {
            titles.push(title.to_owned());
        }
    }
    titles
}

/// Renders `reports` as a Markdown table.
///
/// Each column is as wide as its title or its widest cell, whichever is
/// larger. Every row walks the full column list, so a report missing a
/// field still gets a blank cell of the right width.
///
/// # Examples
/// ```
/// use simstats::report::{render, Report};
/// let reports = vec![
///     Report::new().with("n", 100).with("mean", 31.5),
///     Report::new().with("n", 1000).with("note", "ok"),
/// ];
/// let table = render(&reports, None);
/// assert_eq!(
///     table,
///     "| n   | mean| note|\n\
///      |:---:|:---:|:---:|\n\
///      | 100 | 31.5|     |\n\
///      | 1000|     | ok  |\n"
/// );
/// ```
pub fn render(reports: &[Report], known_titles: Option<&[&str]>) -> String {
    let titles = columns(reports, known_titles);
    let cells: Vec<Vec<Option<String>>> = reports
        .iter()
        .map(|report| {
            titles
                .iter()
                .map(|t| report.get(t).map(ToString::to_string))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = titles
        .iter()
        .enumerate()
        .map(|(col, title)| {
            cells
                .iter()
                .filter_map(|row| row[col].as_deref())
                .map(display_len)
                .fold(display_len(title), usize::max)
                .max(1)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, titles.iter().zip(&widths).map(|(t, &w)| pad(t, w)));
    push_row(
        &mut out,
        widths.iter().map(|&w| format!(":{}:", "-".repeat(w - 1))),
    );
    for row in &cells {
        push_row(
            &mut out,
            row.iter()
                .zip(&widths)
                .map(|(cell, &w)| pad(cell.as_deref().unwrap_or(""), w)),
        );
    }
    out
}

/// Renders `reports` and writes the table to `writer`, returning it too.
///
/// # Errors
/// Propagates any I/O error from `writer`.
pub fn render_to<W: Write>(
    writer: &mut W,
    reports: &[Report],
    known_titles: Option<&[&str]>,
) -> io::Result<String> {
    let table = render(reports, known_titles);
    writer.write_all(table.as_bytes())?;
    writer.flush()?;
    Ok(table)
}

/// `|` + cells joined by `|` + `|`, so an empty column set still closes
/// the row as `||`.
fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    out.push('|');
    out.push_str(&cells.collect::<Vec<_>>().join("|"));
    out.push_str("|\n");
}

/// ` text` left-aligned in a cell `width + 1` characters wide.
fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_len(text));
    format!(" {text}{}", " ".repeat(fill))
}

#[inline]
fn display_len(s: &str) -> usize {
    s.chars().count()
}

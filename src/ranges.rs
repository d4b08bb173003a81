//! Single-column cell-range notation ("F6:F30", "B6").
//!
//! Laboratory workbooks address their data by fixed column spans, so only
//! single-column ranges are supported. Anything else in a configuration is a
//! setup mistake and is rejected before a workbook is opened.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("cannot parse cell range '{0}'")]
    Malformed(String),

    #[error("range '{0}' spans more than one column; only single-column ranges are supported")]
    MultiColumn(String),

    #[error("range '{0}' has its rows in descending order")]
    ReversedRows(String),
}

/// A parsed single-column range: one column, a contiguous inclusive row span.
///
/// Row and column accessors are zero-based so they can be used directly as
/// absolute calamine positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RangeRef {
    col: u32,
    row_start: u32,
    row_end: u32,
}

impl RangeRef {
    /// Parse A1-style notation. A bare cell reference ("B6") is a one-row range.
    pub fn parse(text: &str) -> Result<Self, RangeParseError> {
        let trimmed = text.trim();
        let malformed = || RangeParseError::Malformed(text.to_string());

        let (first, second) = match trimmed.split_once(':') {
            Some((a, b)) => (a.trim(), Some(b.trim())),
            None => (trimmed, None),
        };

        let (col, row_start) = parse_cell(first).ok_or_else(malformed)?;
        let (end_col, row_end) = match second {
            Some(cell) => parse_cell(cell).ok_or_else(malformed)?,
            None => (col, row_start),
        };

        if end_col != col {
            return Err(RangeParseError::MultiColumn(text.to_string()));
        }
        if row_end < row_start {
            return Err(RangeParseError::ReversedRows(text.to_string()));
        }

        Ok(RangeRef {
            col,
            row_start,
            row_end,
        })
    }

    /// Zero-based column index.
    pub fn col(&self) -> u32 {
        self.col
    }

    /// Zero-based absolute row indices covered by the range, in order.
    pub fn rows(&self) -> impl Iterator<Item = u32> {
        self.row_start..=self.row_end
    }

    /// Number of rows in the span.
    pub fn len(&self) -> usize {
        (self.row_end - self.row_start + 1) as usize
    }

    /// Absolute position of the first cell, for single-cell lookups.
    pub fn start(&self) -> (u32, u32) {
        (self.row_start, self.col)
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let col = column_letters(self.col);
        if self.row_start == self.row_end {
            write!(f, "{}{}", col, self.row_start + 1)
        } else {
            write!(
                f,
                "{}{}:{}{}",
                col,
                self.row_start + 1,
                col,
                self.row_end + 1
            )
        }
    }
}

impl TryFrom<String> for RangeRef {
    type Error = RangeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RangeRef::parse(&value)
    }
}

impl From<RangeRef> for String {
    fn from(value: RangeRef) -> Self {
        value.to_string()
    }
}

/// Split "F6" into zero-based (column, row). None if the text is not a
/// plain letters-then-digits cell reference.
fn parse_cell(cell: &str) -> Option<(u32, u32)> {
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);

    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        let v = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(v)?;
    }
    // XFD is the last Excel column
    if col > 16_384 {
        return None;
    }

    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((col - 1, row - 1))
}

fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ascii letters")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_column_span() {
        let r = RangeRef::parse("F6:F30").unwrap();
        assert_eq!(r.col(), 5);
        assert_eq!(r.rows().next(), Some(5));
        assert_eq!(r.rows().last(), Some(29));
        assert_eq!(r.len(), 25);
    }

    #[test]
    fn parses_single_cell() {
        let r = RangeRef::parse("B6").unwrap();
        assert_eq!(r.start(), (5, 1));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn parses_lowercase_and_whitespace() {
        let r = RangeRef::parse("  m6:m30 ").unwrap();
        assert_eq!(r.col(), 12);
    }

    #[test]
    fn parses_multi_letter_columns() {
        let r = RangeRef::parse("AA1:AA3").unwrap();
        assert_eq!(r.col(), 26);
    }

    #[test]
    fn rejects_multi_column_span() {
        assert_eq!(
            RangeRef::parse("F6:G30"),
            Err(RangeParseError::MultiColumn("F6:G30".to_string()))
        );
    }

    #[test]
    fn rejects_reversed_rows() {
        assert_eq!(
            RangeRef::parse("F30:F6"),
            Err(RangeParseError::ReversedRows("F30:F6".to_string()))
        );
    }

    #[test]
    fn rejects_garbage() {
        for text in ["", "6F", "F", "F0", "F6:", ":F6", "F6:G", "1:2"] {
            assert!(matches!(
                RangeRef::parse(text),
                Err(RangeParseError::Malformed(_))
            ));
        }
    }

    #[test]
    fn display_round_trips() {
        for text in ["F6:F30", "B6", "AA10:AA12"] {
            let r = RangeRef::parse(text).unwrap();
            assert_eq!(r.to_string(), text);
            assert_eq!(RangeRef::parse(&r.to_string()).unwrap(), r);
        }
    }
}

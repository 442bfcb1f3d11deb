//! Cell identifier parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell ids
//! (e.g., "a1", "b2", "aa100") and zero-indexed column/row coordinates.
//! Input is case-insensitive; the canonical rendering is lower-case.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A cell identifier by row and column indices (0-indexed).
///
/// Ordering is row-major (`a1`, `b1`, ..., `a2`, ...), which fixes the
/// deterministic ordering used for dumps and cascade tie-breaks.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellId {
    pub row: usize,
    pub col: usize,
}

fn cell_id_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$")
            .expect("cell id regex must compile")
    })
}

impl CellId {
    pub fn new(col: usize, row: usize) -> CellId {
        CellId { row, col }
    }

    /// Parse a cell id from spreadsheet notation (e.g., "a1", "B2", "aa10").
    /// Returns None if the input is invalid or the coordinates overflow.
    pub fn parse(name: &str) -> Option<CellId> {
        let caps = cell_id_re().captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.to_ascii_lowercase().bytes() {
            let digit = (c - b'a') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellId::new(col, row))
    }

    /// Convert column index to spreadsheet-style letters (0 -> a, 25 -> z, 26 -> aa).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'a' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

impl std::str::FromStr for CellId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid cell id: {}", s))
    }
}

impl TryFrom<String> for CellId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CellId> for String {
    fn from(id: CellId) -> String {
        id.to_string()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellId::col_to_letters(self.col), self.row + 1)
    }
}

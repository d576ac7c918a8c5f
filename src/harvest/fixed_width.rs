//! Parser for fixed-width text tables framed by dash border lines.
//!
//! ```text
//! ID | Schema Name | Table Name | ...        <- ignored (outside)
//! ----------------------------------         <- border: enter table
//! 1  | schema_7    | table_12   | ...        <- first line inside: header slot
//! 2  | schema_7    | table_40   | ...        <- data row
//! ----------------------------------         <- border: leave table
//! ```

use regex::Regex;
use std::sync::LazyLock;

static DATA_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*\|").expect("data row pattern is valid"));

const DELIMITER: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableState {
    Outside,
    HeaderPending,
    InsideData,
}

fn is_border(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Extracts data rows with exactly `width` trimmed fields.
///
/// Rows of any other width are dropped without error.
pub fn parse_rows(text: &str, width: usize) -> Vec<Vec<String>> {
    let mut state = TableState::Outside;
    let mut rows = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();

        if is_border(line) {
            state = match state {
                TableState::Outside => TableState::HeaderPending,
                TableState::HeaderPending | TableState::InsideData => TableState::Outside,
            };
            continue;
        }

        match state {
            TableState::Outside => {}
            TableState::HeaderPending => state = TableState::InsideData,
            TableState::InsideData => {
                if !DATA_ROW.is_match(line) {
                    continue;
                }
                let fields: Vec<String> = line
                    .split(DELIMITER)
                    .map(|field| field.trim().to_string())
                    .collect();
                if fields.len() == width {
                    rows.push(fields);
                }
            }
        }
    }

    rows
}

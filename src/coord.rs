//! Conversions between A1-style addresses and numeric coordinates.
//!
//! Columns are 0-based ("A" = 0, "Z" = 25, "AA" = 26). Table rows are numbered
//! from 1, so a row number maps to itself in an address while a 0-based row
//! index is shifted by one.

use crate::error::{Result, StatementError};

/// A 0-based (row, column) coordinate.
pub type CellCoord = (u32, usize);

/// Last worksheet column.
pub const MAX_COLUMN: &str = "XFD";
const MAX_COLUMNS: usize = 16_384;

/// Converts column letters to a 0-based index. Fails on empty input, anything
/// but ASCII letters, and columns past `XFD`.
pub fn col_to_index(col_str: &str) -> Result<usize> {
    let invalid = || StatementError::InvalidCoordinate(col_str.to_string());

    if col_str.is_empty() {
        return Err(invalid());
    }

    let mut result: usize = 0;
    for c in col_str.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(invalid());
        }
        let digit = (c.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
        result = result
            .checked_mul(26)
            .and_then(|shifted| shifted.checked_add(digit))
            .filter(|index| *index <= MAX_COLUMNS)
            .ok_or_else(invalid)?;
    }
    Ok(result - 1)
}

/// Converts a 0-based column index to letters: 0 -> "A", 26 -> "AA".
pub fn index_to_col(mut col_index: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}

/// Address of a cell given its 1-based row number and 0-based column.
pub fn cell_address(row_number: u32, col: usize) -> String {
    format!("{}{}", index_to_col(col), row_number)
}

/// (0, 0) -> "A1", (99, 26) -> "AA100"
pub fn coord_to_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    cell_address(row + 1, col)
}

/// Parses an address such as "B12" or "$B$12" into (row number, column index).
pub fn parse_address(address: &str) -> Result<(u32, usize)> {
    let cleaned: String = address.chars().filter(|c| *c != '$').collect();
    let split = cleaned
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| StatementError::InvalidCoordinate(address.to_string()))?;
    let (letters, digits) = cleaned.split_at(split);

    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(StatementError::InvalidCoordinate(address.to_string()));
    }

    let row_number: u32 = digits
        .parse()
        .map_err(|_| StatementError::InvalidCoordinate(address.to_string()))?;
    if row_number == 0 {
        return Err(StatementError::InvalidCoordinate(address.to_string()));
    }

    Ok((row_number, col_to_index(letters)?))
}

/// "A1" -> (0, 0), "AA100" -> (99, 26)
pub fn a1_to_coord(address: &str) -> Result<CellCoord> {
    let (row_number, col) = parse_address(address)?;
    Ok((row_number - 1, col))
}

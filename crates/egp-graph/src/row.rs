//! Row letters and endpoint class.
use egp_error::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// A single-letter row identifier. Semantics are kind-dependent;
/// this type only knows the closed letter set and which of the two row
/// classes (source / destination) each letter may play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Row {
    I,
    L,
    S,
    A,
    B,
    W,
    F,
    T,
    X,
    O,
    P,
    /// JSON-format-only row collecting otherwise unconnected source
    /// endpoints.
    U,
}

/// All rows that may appear as a *source* interface.
pub const SOURCE_ROWS: [Row; 6] = [Row::I, Row::L, Row::S, Row::A, Row::B, Row::W];
/// All rows that may appear as a *destination* interface,
/// including the JSON-only `U`.
pub const DEST_ROWS: [Row; 11] = [
    Row::A,
    Row::B,
    Row::F,
    Row::L,
    Row::S,
    Row::T,
    Row::W,
    Row::X,
    Row::O,
    Row::P,
    Row::U,
];
/// Rows permitted at most one endpoint in a stable graph.
pub const SINGLE_ONLY_ROWS: [Row; 6] = [Row::F, Row::L, Row::S, Row::T, Row::W, Row::X];

impl Row {
    pub fn as_char(self) -> char {
        match self {
            Row::I => 'I',
            Row::L => 'L',
            Row::S => 'S',
            Row::A => 'A',
            Row::B => 'B',
            Row::W => 'W',
            Row::F => 'F',
            Row::T => 'T',
            Row::X => 'X',
            Row::O => 'O',
            Row::P => 'P',
            Row::U => 'U',
        }
    }

    pub fn from_char(c: char) -> Result<Self> {
        Ok(match c {
            'I' => Row::I,
            'L' => Row::L,
            'S' => Row::S,
            'A' => Row::A,
            'B' => Row::B,
            'W' => Row::W,
            'F' => Row::F,
            'T' => Row::T,
            'X' => Row::X,
            'O' => Row::O,
            'P' => Row::P,
            'U' => Row::U,
            other => {
                return Err(GraphError::Core(CoreError::GraphShape(format!(
                    "unknown row letter '{other}'"
                ))))
            }
        })
    }

    pub fn is_valid_source(self) -> bool {
        SOURCE_ROWS.contains(&self)
    }

    pub fn is_valid_dest(self) -> bool {
        DEST_ROWS.contains(&self)
    }

    pub fn is_single_only(self) -> bool {
        SINGLE_ONLY_ROWS.contains(&self)
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Endpoint/interface class: produces (`Src`) or consumes (`Dst`) a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Class {
    Src,
    Dst,
}

impl Class {
    pub fn as_char(self) -> char {
        match self {
            Class::Src => 's',
            Class::Dst => 'd',
        }
    }

    pub fn from_char(c: char) -> Result<Self> {
        match c {
            's' => Ok(Class::Src),
            'd' => Ok(Class::Dst),
            other => Err(GraphError::Core(CoreError::GraphShape(format!(
                "unknown endpoint class '{other}'"
            )))),
        }
    }
}

impl std::fmt::Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Interface key `(row, class)`, textually `row + class` (e.g. `As`, `Od`).
pub type InterfaceKey = (Row, Class);

pub fn interface_key_to_string(key: InterfaceKey) -> String {
    format!("{}{}", key.0, key.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_round_trips_through_char() {
        for row in DEST_ROWS {
            assert_eq!(Row::from_char(row.as_char()).unwrap(), row);
        }
    }

    #[test]
    fn unknown_row_char_is_graph_shape_error() {
        assert!(Row::from_char('Z').is_err());
    }

    #[test]
    fn single_only_rows_permit_at_most_one_endpoint() {
        for row in [Row::F, Row::L, Row::S, Row::T, Row::W, Row::X] {
            assert!(row.is_single_only());
        }
        assert!(!Row::A.is_single_only());
        assert!(!Row::I.is_single_only());
    }
}

//! Metadata structures for introspected tables and columns

use serde::{Deserialize, Serialize};

/// A table row from `information_schema.TABLES`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name
    pub name: String,

    /// Table comment (empty when none)
    pub comment: String,
}

/// Index flag of a column, as reported in `COLUMN_KEY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyKind {
    #[default]
    None,
    Primary,
    Unique,
    Multiple,
}

impl KeyKind {
    /// Classify a `COLUMN_KEY` value. Only exact spellings are recognised.
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "PRI" => KeyKind::Primary,
            "UNI" => KeyKind::Unique,
            "MUL" => KeyKind::Multiple,
            _ => KeyKind::None,
        }
    }

    /// The flag string as MySQL reports it
    pub fn as_flag(&self) -> &'static str {
        match self {
            KeyKind::None => "",
            KeyKind::Primary => "PRI",
            KeyKind::Unique => "UNI",
            KeyKind::Multiple => "MUL",
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, KeyKind::Primary)
    }

    /// True for primary, unique and non-unique indexes
    pub fn is_indexed(&self) -> bool {
        !matches!(self, KeyKind::None)
    }
}

/// A column row from `information_schema.COLUMNS`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// Data type without length or modifiers (e.g., "varchar")
    pub data_type: String,

    /// Index flag
    pub key: KeyKind,

    /// Column comment (empty when none)
    pub comment: String,
}

impl ColumnInfo {
    /// Build a column from the raw strings returned by introspection
    pub fn from_row(name: String, data_type: String, key_flag: &str, comment: String) -> Self {
        Self {
            name,
            data_type,
            key: KeyKind::from_flag(key_flag),
            comment,
        }
    }
}

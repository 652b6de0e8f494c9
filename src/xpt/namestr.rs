//! NAMESTR records: one variable descriptor per record, big-endian

use super::header::text_field;
use crate::error::XptError;
use crate::types::{Column, ColumnKind};

/// A variable as declared in its NAMESTR record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    /// Variable name
    pub name: String,
    /// Variable label
    pub label: String,
    /// Numeric or character
    pub kind: ColumnKind,
    /// Bytes per value in an observation
    pub length: usize,
    /// Byte offset of the value within an observation
    pub position: usize,
    /// Display format name, empty when none
    pub format: String,
}

impl Variable {
    /// Column metadata for the decoded table
    #[must_use]
    pub fn to_column(&self) -> Column {
        Column {
            name: self.name.clone(),
            label: self.label.clone(),
            kind: self.kind,
            format: (!self.format.is_empty()).then(|| self.format.clone()),
        }
    }
}

/// Parse one NAMESTR record (136 or 140 bytes; the fields used sit in the common prefix)
pub fn parse_namestr(record: &[u8]) -> Result<Variable, XptError> {
    if record.len() < 88 {
        return Err(XptError::Truncated("NAMESTR record"));
    }

    let name = text_field(&record[8..16]);
    let kind = match be_i16(record, 0) {
        1 => ColumnKind::Numeric,
        2 => ColumnKind::Text,
        other => {
            return Err(XptError::InvalidVariable {
                name,
                reason: format!("unknown variable type {other}"),
            });
        }
    };

    let length = usize::try_from(be_i16(record, 4)).unwrap_or(0);
    let valid_length = match kind {
        ColumnKind::Numeric => (2..=8).contains(&length),
        ColumnKind::Text => length > 0,
    };
    if !valid_length {
        return Err(XptError::InvalidVariable {
            name,
            reason: format!("invalid length {length}"),
        });
    }

    let position = usize::try_from(be_i32(record, 84)).map_err(|_| XptError::InvalidVariable {
        name: name.clone(),
        reason: "negative observation offset".to_string(),
    })?;

    Ok(Variable {
        label: text_field(&record[16..56]),
        format: text_field(&record[56..64]),
        name,
        kind,
        length,
        position,
    })
}

/// Parse `count` consecutive NAMESTR records of `namestr_len` bytes
pub fn parse_namestr_records(
    block: &[u8],
    count: usize,
    namestr_len: usize,
) -> Result<Vec<Variable>, XptError> {
    block
        .chunks_exact(namestr_len)
        .take(count)
        .map(parse_namestr)
        .collect()
}

fn be_i16(buf: &[u8], at: usize) -> i16 {
    i16::from_be_bytes([buf[at], buf[at + 1]])
}

fn be_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

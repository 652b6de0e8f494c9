//! XPORT header records
//!
//! A transport file is a sequence of 80-byte records. Structural records
//! start with a fixed 48-byte banner naming the header kind; some carry a
//! number in the trailing zero field.

use crate::error::XptError;

/// Every structural record is this long; data sections are padded to it
pub const RECORD_LEN: usize = 80;

const BANNER_LEN: usize = 48;

/// Library header, the first record of every v5 transport file
pub const LIBRARY_HEADER: &[u8; BANNER_LEN] = b"HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!";
/// Starts each dataset (member) in the library
pub const MEMBER_HEADER: &[u8; BANNER_LEN] = b"HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!";
/// Precedes the two member descriptor records
pub const DSCRPTR_HEADER: &[u8; BANNER_LEN] = b"HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!";
/// Precedes the variable descriptors
pub const NAMESTR_HEADER: &[u8; BANNER_LEN] = b"HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!";
/// Precedes the observation data
pub const OBS_HEADER: &[u8; BANNER_LEN] = b"HEADER RECORD*******OBS     HEADER RECORD!!!!!!!";

/// Standard NAMESTR record length
pub const NAMESTR_LEN: usize = 140;
/// NAMESTR record length written by VAX/VMS hosts
pub const NAMESTR_LEN_VAX: usize = 136;

/// Sequential reader over the 80-byte records of a transport file
pub(crate) struct Records<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Records<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Next whole record
    pub(crate) fn record(&mut self, what: &'static str) -> Result<&'a [u8], XptError> {
        self.take(RECORD_LEN, what)
    }

    /// Next record, which must be the header `banner` names
    pub(crate) fn header(
        &mut self,
        banner: &[u8; BANNER_LEN],
        expected: &'static str,
    ) -> Result<&'a [u8], XptError> {
        let offset = self.offset;
        let record = self.record(expected)?;
        if !is_header(record, banner) {
            return Err(XptError::InvalidHeader { expected, offset });
        }
        Ok(record)
    }

    /// Next `len` bytes, then skip to the following record boundary
    pub(crate) fn padded_block(
        &mut self,
        len: usize,
        what: &'static str,
    ) -> Result<&'a [u8], XptError> {
        let block = self.take(len, what)?;
        let pad = (RECORD_LEN - len % RECORD_LEN) % RECORD_LEN;
        // The last block of a file may omit its padding
        self.offset = (self.offset + pad).min(self.bytes.len());
        Ok(block)
    }

    /// Everything not yet consumed
    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }

    fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], XptError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(XptError::Truncated(what))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }
}

/// Whether `record` starts with `banner`
#[must_use]
pub fn is_header(record: &[u8], banner: &[u8; BANNER_LEN]) -> bool {
    record.len() >= BANNER_LEN && &record[..BANNER_LEN] == banner
}

/// NAMESTR length declared in a member header (columns 75-78)
pub fn parse_namestr_len(member_header: &[u8]) -> Result<usize, XptError> {
    let len = ascii_number(&member_header[74..78]).unwrap_or(0);
    match len {
        NAMESTR_LEN | NAMESTR_LEN_VAX => Ok(len),
        other => Err(XptError::InvalidNamestrLength(other)),
    }
}

/// Variable count declared in a NAMESTR header (columns 55-58)
pub fn parse_variable_count(namestr_header: &[u8]) -> Result<usize, XptError> {
    let field = &namestr_header[54..58];
    match ascii_number(field) {
        Some(0) => Err(XptError::NoVariables),
        Some(n) => Ok(n),
        None => Err(XptError::InvalidVariableCount(
            String::from_utf8_lossy(field).into_owned(),
        )),
    }
}

/// Dataset name from the first member descriptor record
#[must_use]
pub fn parse_dataset_name(descriptor: &[u8]) -> String {
    text_field(&descriptor[8..16])
}

/// Dataset label from the second member descriptor record
#[must_use]
pub fn parse_dataset_label(descriptor: &[u8]) -> String {
    text_field(&descriptor[32..72])
}

fn ascii_number(field: &[u8]) -> Option<usize> {
    std::str::from_utf8(field).ok()?.trim().parse().ok()
}

/// Decode a blank-padded text field
///
/// Trailing blanks and NULs are dropped. Bytes that are not valid UTF-8 are
/// read as Latin-1, the encoding SAS hosts most commonly write.
#[must_use]
pub fn text_field(raw: &[u8]) -> String {
    let end = raw
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    let raw = &raw[..end];
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(_) => raw.iter().map(|&b| char::from(b)).collect(),
    }
}

//! SAS transport (XPORT v5) decoding
//!
//! NHANES publishes every dataset as a version 5 transport file. The layout
//! is:
//!
//! - library header plus two records of library metadata
//! - member header (declares the NAMESTR length), descriptor header and two
//!   member descriptor records (dataset name and label)
//! - NAMESTR header (declares the variable count) and one NAMESTR record per
//!   variable, padded to a record boundary
//! - OBS header followed by fixed-width observations, packed back to back and
//!   blank-padded to a record boundary
//!
//! Only the first member of a library is read.

pub mod header;
pub mod ibm;
pub mod namestr;

pub use header::{NAMESTR_LEN, NAMESTR_LEN_VAX, RECORD_LEN};
pub use ibm::{decode_numeric, encode_ibm, ibm_to_f64};
pub use namestr::{Variable, parse_namestr, parse_namestr_records};

use crate::error::{Error, Result, XptError};
use crate::types::{ColumnKind, Table, Value};
use header::{
    DSCRPTR_HEADER, LIBRARY_HEADER, MEMBER_HEADER, NAMESTR_HEADER, OBS_HEADER, Records,
};
use std::path::Path;
use tracing::debug;

/// Read and decode the transport file at `path`
pub fn read_file(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path)?;
    decode(&bytes).map_err(|e| Error::xpt(path, e))
}

/// Decode the first member of an in-memory transport file
pub fn decode(bytes: &[u8]) -> std::result::Result<Table, XptError> {
    let mut records = Records::new(bytes);

    records.header(LIBRARY_HEADER, "LIBRARY")?;
    records.record("library metadata")?;
    records.record("library metadata")?;

    let member = records.header(MEMBER_HEADER, "MEMBER")?;
    let namestr_len = header::parse_namestr_len(member)?;
    records.header(DSCRPTR_HEADER, "DSCRPTR")?;
    let name = header::parse_dataset_name(records.record("member descriptor")?);
    let label = header::parse_dataset_label(records.record("member descriptor")?);

    let namestr_header = records.header(NAMESTR_HEADER, "NAMESTR")?;
    let count = header::parse_variable_count(namestr_header)?;
    let block = records.padded_block(count * namestr_len, "NAMESTR records")?;
    let variables = parse_namestr_records(block, count, namestr_len)?;

    records.header(OBS_HEADER, "OBS")?;
    let obs_len = observation_len(&variables)?;
    let data = observation_data(records.rest());

    debug!(
        dataset = %name,
        variables = variables.len(),
        obs_len,
        offset = records.offset(),
        "decoding observations"
    );

    let rows = decode_observations(data, &variables, obs_len)?;

    Ok(Table {
        name,
        label,
        columns: variables.iter().map(Variable::to_column).collect(),
        rows,
    })
}

/// Observation width, after checking each variable lies inside it
fn observation_len(variables: &[Variable]) -> std::result::Result<usize, XptError> {
    let obs_len: usize = variables.iter().map(|v| v.length).sum();
    for var in variables {
        if var.position + var.length > obs_len {
            return Err(XptError::InvalidVariable {
                name: var.name.clone(),
                reason: format!(
                    "bytes {}..{} fall outside the {obs_len}-byte observation",
                    var.position,
                    var.position + var.length
                ),
            });
        }
    }
    Ok(obs_len)
}

/// The observation section, cut at the next member header if another follows
fn observation_data(rest: &[u8]) -> &[u8] {
    let next_member = rest
        .chunks(RECORD_LEN)
        .position(|record| header::is_header(record, MEMBER_HEADER));
    match next_member {
        Some(i) => &rest[..i * RECORD_LEN],
        None => rest,
    }
}

fn decode_observations(
    data: &[u8],
    variables: &[Variable],
    obs_len: usize,
) -> std::result::Result<Vec<Vec<Value>>, XptError> {
    let mut rows = Vec::with_capacity(data.len() / obs_len);
    let mut pos = 0;

    while pos < data.len() {
        let remaining = &data[pos..];
        // Blank padding out to the final record boundary
        if remaining.len() < RECORD_LEN && remaining.iter().all(|&b| b == b' ') {
            break;
        }
        if remaining.len() < obs_len {
            return Err(XptError::Truncated("observation"));
        }

        let obs = &remaining[..obs_len];
        rows.push(variables.iter().map(|var| decode_cell(obs, var)).collect());
        pos += obs_len;
    }

    Ok(rows)
}

fn decode_cell(obs: &[u8], var: &Variable) -> Value {
    let raw = &obs[var.position..var.position + var.length];
    match var.kind {
        ColumnKind::Numeric => decode_numeric(raw).map_or(Value::Missing, Value::Number),
        ColumnKind::Text => Value::Text(header::text_field(raw)),
    }
}

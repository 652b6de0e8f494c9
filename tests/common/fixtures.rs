//! Transport file fixtures
//!
//! [`XptBuilder`] writes small version 5 transport files in the layout SAS
//! produces, so the decoder and the pipeline can be exercised without
//! network access or checked-in binaries.

use nhanes_dl::xpt::{NAMESTR_LEN, NAMESTR_LEN_VAX, RECORD_LEN, encode_ibm};
use nhanes_dl::{ColumnKind, Value};

const LIBRARY_HEADER: &[u8] = b"HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!";
const MEMBER_HEADER: &[u8] = b"HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!";
const DSCRPTR_HEADER: &[u8] = b"HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!";
const NAMESTR_HEADER: &[u8] = b"HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!";
const OBS_HEADER: &[u8] = b"HEADER RECORD*******OBS     HEADER RECORD!!!!!!!";

struct FixtureVar {
    name: String,
    label: String,
    kind: ColumnKind,
    length: usize,
}

/// Builds one-member transport files
pub struct XptBuilder {
    name: String,
    label: String,
    namestr_len: usize,
    vars: Vec<FixtureVar>,
    rows: Vec<Vec<Value>>,
}

impl XptBuilder {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            namestr_len: NAMESTR_LEN,
            vars: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Use the 136-byte NAMESTR records written on VAX/VMS
    pub fn vax(mut self) -> Self {
        self.namestr_len = NAMESTR_LEN_VAX;
        self
    }

    /// Add an 8-byte numeric variable
    pub fn numeric(self, name: &str, label: &str) -> Self {
        self.numeric_with_length(name, label, 8)
    }

    /// Add a numeric variable stored in its leading `length` bytes
    pub fn numeric_with_length(mut self, name: &str, label: &str, length: usize) -> Self {
        self.vars.push(FixtureVar {
            name: name.to_string(),
            label: label.to_string(),
            kind: ColumnKind::Numeric,
            length,
        });
        self
    }

    /// Add a character variable of `length` bytes
    pub fn text(mut self, name: &str, label: &str, length: usize) -> Self {
        self.vars.push(FixtureVar {
            name: name.to_string(),
            label: label.to_string(),
            kind: ColumnKind::Text,
            length,
        });
        self
    }

    /// Add an observation; `Value::Missing` in a numeric column encodes as `.`
    pub fn row(mut self, values: Vec<Value>) -> Self {
        assert_eq!(values.len(), self.vars.len(), "row width must match variables");
        self.rows.push(values);
        self
    }

    /// Width of one observation in bytes
    pub fn observation_len(&self) -> usize {
        self.vars.iter().map(|v| v.length).sum()
    }

    /// The complete file: library header followed by this member
    pub fn build(&self) -> Vec<u8> {
        let mut out = header_record(LIBRARY_HEADER);
        out.extend(blank_record(b"SAS     SAS     SASLIB  9.4     X64_10PR"));
        out.extend(blank_record(b"16OCT26:10:00:00"));
        out.extend(self.member());
        out
    }

    /// This member alone, starting at its member header
    pub fn member(&self) -> Vec<u8> {
        let mut member_header = header_record(MEMBER_HEADER);
        member_header[74..78].copy_from_slice(format!("{:04}", self.namestr_len).as_bytes());

        let mut out = member_header;
        out.extend(header_record(DSCRPTR_HEADER));

        let mut first = blank_record(b"SAS     ");
        first[8..16].copy_from_slice(padded(&self.name, 8).as_slice());
        out.extend(first);

        let mut second = blank_record(b"16OCT26:10:00:00");
        second[32..72].copy_from_slice(padded(&self.label, 40).as_slice());
        out.extend(second);

        let mut namestr_header = header_record(NAMESTR_HEADER);
        namestr_header[54..58].copy_from_slice(format!("{:04}", self.vars.len()).as_bytes());
        out.extend(namestr_header);

        let mut namestrs = Vec::new();
        let mut position = 0;
        for (i, var) in self.vars.iter().enumerate() {
            namestrs.extend(self.namestr(var, i + 1, position));
            position += var.length;
        }
        out.extend(pad_to_record(namestrs));

        out.extend(header_record(OBS_HEADER));
        let mut data = Vec::new();
        for row in &self.rows {
            for (var, value) in self.vars.iter().zip(row) {
                data.extend(encode_cell(var, value));
            }
        }
        out.extend(pad_to_record(data));
        out
    }

    fn namestr(&self, var: &FixtureVar, number: usize, position: usize) -> Vec<u8> {
        let mut r = vec![0u8; self.namestr_len];
        let kind: i16 = match var.kind {
            ColumnKind::Numeric => 1,
            ColumnKind::Text => 2,
        };
        r[0..2].copy_from_slice(&kind.to_be_bytes());
        r[4..6].copy_from_slice(&(var.length as i16).to_be_bytes());
        r[6..8].copy_from_slice(&(number as i16).to_be_bytes());
        r[8..16].copy_from_slice(padded(&var.name, 8).as_slice());
        r[16..56].copy_from_slice(padded(&var.label, 40).as_slice());
        r[56..64].copy_from_slice(b"        ");
        r[72..80].copy_from_slice(b"        ");
        r[84..88].copy_from_slice(&(position as i32).to_be_bytes());
        r
    }
}

/// Five participants with an id, a sex code and an age, one age missing
pub fn demographics() -> XptBuilder {
    let rows = [
        (93703.0, "F", Some(2.0)),
        (93704.0, "M", Some(2.0)),
        (93705.0, "F", Some(66.0)),
        (93706.0, "M", None),
        (93707.0, "M", Some(13.0)),
    ];
    rows.into_iter().fold(
        XptBuilder::new("DEMO_J", "Demographic Variables and Sample Weights")
            .numeric("SEQN", "Respondent sequence number")
            .text("RIAGENDR", "Gender", 8)
            .numeric("RIDAGEYR", "Age in years at screening"),
        |builder, (seqn, sex, age)| {
            builder.row(vec![
                Value::Number(seqn),
                Value::Text(sex.to_string()),
                age.map_or(Value::Missing, Value::Number),
            ])
        },
    )
}

/// Three participants with total cholesterol readings
pub fn cholesterol() -> XptBuilder {
    XptBuilder::new("TCHOL_J", "Cholesterol - Total")
        .numeric("SEQN", "Respondent sequence number")
        .numeric("LBXTC", "Total Cholesterol (mg/dL)")
        .row(vec![Value::Number(93705.0), Value::Number(264.0)])
        .row(vec![Value::Number(93706.0), Value::Number(214.0)])
        .row(vec![Value::Number(93707.0), Value::Number(187.0)])
}

fn encode_cell(var: &FixtureVar, value: &Value) -> Vec<u8> {
    match (var.kind, value) {
        (ColumnKind::Numeric, Value::Number(n)) => encode_ibm(*n)[..var.length].to_vec(),
        (ColumnKind::Numeric, _) => encode_ibm(f64::NAN)[..var.length].to_vec(),
        (ColumnKind::Text, Value::Text(s)) => padded(s, var.length),
        (ColumnKind::Text, _) => vec![b' '; var.length],
    }
}

fn padded(text: &str, len: usize) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(len, b' ');
    bytes.truncate(len);
    bytes
}

fn header_record(banner: &[u8]) -> Vec<u8> {
    let mut r = banner.to_vec();
    r.resize(RECORD_LEN, b'0');
    r[78..80].copy_from_slice(b"  ");
    r
}

fn blank_record(prefix: &[u8]) -> Vec<u8> {
    let mut r = prefix.to_vec();
    r.resize(RECORD_LEN, b' ');
    r
}

fn pad_to_record(mut block: Vec<u8>) -> Vec<u8> {
    let padded_len = block.len().div_ceil(RECORD_LEN) * RECORD_LEN;
    block.resize(padded_len, b' ');
    block
}

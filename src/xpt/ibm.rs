//! IBM System/360 hexadecimal floating point
//!
//! XPORT stores every numeric variable as a big-endian IBM double: one sign
//! bit, a 7-bit base-16 exponent biased by 64, and a 56-bit fraction.
//! Variables shorter than 8 bytes hold the leading bytes only.

/// Decode a numeric cell of 2..=8 bytes, or `None` for a SAS missing value
///
/// Missing values are encoded as a single marker byte (`.`, `_` or `A`-`Z`)
/// followed by zeros.
#[must_use]
pub fn decode_numeric(raw: &[u8]) -> Option<f64> {
    let mut bytes = [0u8; 8];
    let len = raw.len().min(8);
    bytes[..len].copy_from_slice(&raw[..len]);

    if is_missing(&bytes) {
        return None;
    }
    Some(ibm_to_f64(bytes))
}

fn is_missing(bytes: &[u8; 8]) -> bool {
    matches!(bytes[0], b'.' | b'_' | b'A'..=b'Z') && bytes[1..].iter().all(|&b| b == 0)
}

/// Convert an 8-byte IBM double to IEEE 754
#[must_use]
pub fn ibm_to_f64(bytes: [u8; 8]) -> f64 {
    let negative = bytes[0] & 0x80 != 0;
    let exponent = i32::from(bytes[0] & 0x7f) - 64;

    let mut fraction = [0u8; 8];
    fraction[1..].copy_from_slice(&bytes[1..]);
    let mantissa = u64::from_be_bytes(fraction);

    if mantissa == 0 {
        return 0.0;
    }

    // value = 0.fraction (hex) * 16^exponent = mantissa * 2^(4 * exponent - 56)
    let value = mantissa as f64 * 2f64.powi(4 * exponent - 56);
    if negative { -value } else { value }
}

/// Convert an IEEE 754 double to an 8-byte IBM double
///
/// NaN encodes as the standard SAS missing value `.`. Values beyond the IBM
/// range saturate to the largest magnitude; values too small to represent,
/// including subnormals, encode as zero.
#[must_use]
pub fn encode_ibm(value: f64) -> [u8; 8] {
    if value.is_nan() {
        return [b'.', 0, 0, 0, 0, 0, 0, 0];
    }
    if value == 0.0 {
        return [0; 8];
    }

    let sign = if value.is_sign_negative() { 0x80 } else { 0 };
    let bits = value.abs().to_bits();
    let ieee_exponent = ((bits >> 52) & 0x7ff) as i32;
    if ieee_exponent == 0 {
        return [0; 8];
    }
    if ieee_exponent == 0x7ff {
        return saturated(sign);
    }

    let mantissa = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);
    // value = 0.1xxx (binary) * 2^shift
    let shift = ieee_exponent - 1023 + 1;
    let hex_exponent = shift.div_euclid(4) + i32::from(shift.rem_euclid(4) != 0);
    let left = (shift + 3 - 4 * hex_exponent) as u32;
    let fraction = mantissa << left;

    let biased = hex_exponent + 64;
    if biased > 127 {
        return saturated(sign);
    }
    if biased < 0 {
        return [0; 8];
    }

    let mut out = fraction.to_be_bytes();
    out[0] = sign | biased as u8;
    out
}

fn saturated(sign: u8) -> [u8; 8] {
    [sign | 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
}

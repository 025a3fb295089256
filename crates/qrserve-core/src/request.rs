//! The per-request model: dual-shape parsing and validation

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

use crate::error::{Error, Result};
use crate::form::{percent_decode, FormValues};

/// Largest accepted image edge, in pixels - images can't be larger than
/// 4k x 4k.
pub const MAX_SIZE: i64 = 4096;

/// The four standard QR error-correction tiers
/// (7% / 15% / 25% / 30% redundancy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EcLevel {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

impl EcLevel {
    /// Map a request letter to a tier, case-insensitively. Anything
    /// unrecognized (including absence) falls back to `Medium` rather
    /// than erroring.
    pub fn from_code(code: &str) -> Self {
        match code.to_uppercase().as_str() {
            "L" => EcLevel::Low,
            "Q" => EcLevel::Quartile,
            "H" => EcLevel::High,
            _ => EcLevel::Medium,
        }
    }
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::Low => qrcode::EcLevel::L,
            EcLevel::Medium => qrcode::EcLevel::M,
            EcLevel::Quartile => qrcode::EcLevel::Q,
            EcLevel::High => qrcode::EcLevel::H,
        }
    }
}

/// A validated encode request.
///
/// The payload is kept as bytes: a base64 path segment may decode to
/// non-UTF-8 data, which is passed to the encoder unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    pub data: Bytes,
    pub size: u32,
    pub level: EcLevel,
}

impl EncodeRequest {
    /// Parse one request from its path and form values.
    ///
    /// A path that splits on `/` into more than two segments carries the
    /// fields inline (`/<payload>/<size>[/<level>]`); anything else reads
    /// `data`, `size` and `q` from the form values. A path payload that is
    /// valid standard base64 is decoded first; one that is not is used
    /// verbatim.
    pub fn parse(path: &str, form: &FormValues) -> Result<Self> {
        let parts: Vec<&str> = path.split('/').collect();

        let (data, size_str, code) = if parts.len() > 2 {
            let segment = percent_decode(parts[1]);
            let data = match STANDARD.decode(&segment) {
                Ok(decoded) => Bytes::from(decoded),
                Err(_) => Bytes::from(segment),
            };
            let size = segment_to_string(parts[2]);
            let code = parts.get(3).map(|s| segment_to_string(s)).unwrap_or_default();
            (data, size, code)
        } else {
            (
                Bytes::from(form.get("data").to_owned()),
                form.get("size").to_owned(),
                form.get("q").to_owned(),
            )
        };

        if data.is_empty() {
            return Err(Error::EmptyData);
        }

        // Parsed signed so that a negative size is range-rejected, not
        // parse-rejected.
        let size: i64 = size_str.parse()?;
        if !(1..=MAX_SIZE).contains(&size) {
            return Err(Error::SizeOutOfRange(size));
        }

        Ok(Self {
            data,
            size: size as u32,
            level: EcLevel::from_code(&code),
        })
    }
}

fn segment_to_string(segment: &str) -> String {
    String::from_utf8_lossy(&percent_decode(segment)).into_owned()
}

//! Error types for qrserve-core
//!
//! The `Display` strings double as the client-facing response bodies, so
//! their exact wording is part of the service contract.

use thiserror::Error;

/// Result type alias for qrserve operations
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between parsing a request and producing
/// a PNG.
#[derive(Debug, Error)]
pub enum Error {
    /// Payload missing or empty after parsing
    #[error("Data must not be empty")]
    EmptyData,

    /// Size field is not an integer
    #[error("Error parsing size: {0}")]
    SizeParse(#[from] std::num::ParseIntError),

    /// Size is an integer but outside the accepted range
    #[error("Invalid image size: {0}")]
    SizeOutOfRange(i64),

    /// The QR library rejected the payload (usually capacity exceeded)
    #[error("Error creating QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),

    /// PNG serialization failed
    #[error("Error creating QR code: {0}")]
    Render(#[from] image::ImageError),
}

impl Error {
    /// Input errors are the client's fault and map to 400; encoding and
    /// rendering failures map to 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::EmptyData | Error::SizeParse(_) | Error::SizeOutOfRange(_)
        )
    }
}

//! qrserve-core: the request/response contract of the qrserve service
//!
//! Everything that is not HTTP plumbing lives here: the per-request model,
//! the dual-shape input parsing (path-embedded fields vs. query/form
//! fields), the validation rules, and the QR-to-PNG encoding wrapper.
//! The crate has no server dependencies so the whole pipeline is
//! unit-testable without a runtime.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod encode;
pub mod error;
pub mod form;
pub mod request;

// Re-exports
pub use encode::encode;
pub use error::{Error, Result};
pub use form::FormValues;
pub use request::{EcLevel, EncodeRequest, MAX_SIZE};

//! QR matrix rendering and PNG serialization
//!
//! The matrix construction itself (Reed-Solomon, masking, placement) is
//! the `qrcode` crate's job; this module only turns a validated request
//! into PNG bytes of the requested dimension.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;

use crate::error::Result;
use crate::request::EncodeRequest;

/// Encode a validated request into PNG bytes.
///
/// The matrix is rendered at one pixel per module, quiet zone included,
/// then nearest-neighbor scaled to exactly `size x size`.
pub fn encode(req: &EncodeRequest) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(req.data.as_ref(), req.level.into())?;
    let modules = code.render::<Luma<u8>>().module_dimensions(1, 1).build();
    let scaled = imageops::resize(&modules, req.size, req.size, FilterType::Nearest);

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(scaled).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

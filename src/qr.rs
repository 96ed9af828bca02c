//! QR rendering of enrollment URIs into PNG files.
//!
//! The engine only hands over a URI and a path; everything about the raster
//! lives behind [`QrRenderer`].

use std::path::Path;

use image::Luma;
use image::imageops::{self, FilterType};
use qrcode::{EcLevel, QrCode};

use crate::Error;

pub const DEFAULT_SIZE: u32 = 256;

/// Writes a scannable image of `uri` to `path`
pub trait QrRenderer {
    /// # Errors
    ///
    /// Returns [`Error::RendererFailure`] if the URI cannot be encoded or the
    /// file cannot be written.
    fn render(&self, uri: &str, path: &Path) -> Result<(), Error>;
}

/// Square PNG renderer backed by `qrcode` + `image`
#[derive(Debug, Clone, Copy)]
pub struct PngQrRenderer {
    /// Edge length of the image in pixels
    pub size: u32,
    pub ec_level: EcLevel,
}

impl Default for PngQrRenderer {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            ec_level: EcLevel::M,
        }
    }
}

impl PngQrRenderer {
    #[must_use]
    pub const fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}

impl QrRenderer for PngQrRenderer {
    fn render(&self, uri: &str, path: &Path) -> Result<(), Error> {
        if self.size == 0 {
            return Err(Error::RendererFailure(
                "image size must be greater than zero".into(),
            ));
        }

        let code = QrCode::with_error_correction_level(uri.as_bytes(), self.ec_level)
            .map_err(|e| Error::RendererFailure(format!("QR encode error: {e}")))?;

        // qrcode only scales by whole modules, so the raster is at least
        // `size` wide and then resampled to exactly `size` x `size`
        let raster = code
            .render::<Luma<u8>>()
            .min_dimensions(self.size, self.size)
            .build();
        let img = imageops::resize(&raster, self.size, self.size, FilterType::Nearest);

        img.save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| Error::RendererFailure(format!("{}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), width = img.width(), "wrote QR code");
        Ok(())
    }
}

/// File name for an account's QR image, with path separators neutralised
#[must_use]
pub fn file_name(account: &str) -> String {
    let safe: String = account
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe}_qrcode.png")
}

use std::path::Path;

use image::RgbaImage;

use crate::error::AnalysisError;

/// Decode an image file to RGBA8.
///
/// Every failure, including a missing file, is reported as
/// [`AnalysisError::DecodeUnavailable`].
pub fn load_image(path: &Path) -> Result<RgbaImage, AnalysisError> {
    let img = image::open(path).map_err(|e| {
        let reason = if !path.exists() {
            format!("file not found: {}", path.display())
        } else {
            format!(
                "unsupported or corrupt image: {} ({e}). Supported formats: PNG, JPEG, WebP, BMP, TIFF, GIF",
                path.display()
            )
        };
        AnalysisError::DecodeUnavailable(reason)
    })?;
    Ok(img.to_rgba8())
}

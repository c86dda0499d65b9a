use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use super::error::{ImageError, ImageResult};

pub const DEFAULT_QUALITY: u8 = 80;

#[derive(Debug, Clone, Copy, Validate)]
pub struct ImageCompressOptions {
    #[validate(range(min = 1, max = 100, message = "Quality must be between 1 and 100"))]
    pub quality: u8,
}

impl Default for ImageCompressOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

impl ImageCompressOptions {
    /// Parses the raw `quality` form value. Absent or blank means the default.
    pub fn from_form(raw: Option<&str>) -> ImageResult<Self> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(Self::default()),
            Some(raw) => raw,
        };

        let quality = raw
            .parse::<u8>()
            .map_err(|_| ImageError::InvalidQuality(raw.to_string()))?;
        let options = Self { quality };
        options
            .validate()
            .map_err(|_| ImageError::InvalidQuality(raw.to_string()))?;
        Ok(options)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageCompressResponse {
    /// `data:image/<format>;base64,...`
    pub compressed_image: String,
    pub size: usize,
    pub original_format: String,
    pub output_format: String,
    pub width: u32,
    pub height: u32,
    /// Bytes saved relative to the upload, e.g. `"42.17%"`. Negative when the output grew.
    pub compression_ratio: String,
}

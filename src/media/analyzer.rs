//! Per-media-item analysis (§4.4): synchronous fetch under a byte
//! budget, image decode, geometry/hash/EXIF, and an optional palette
//! pass. Ported from `media_processor.py::analyze_image`.

use super::palette::{dominant_colors, web_safe_histogram};
use crate::core::types::{DominantColor, ExifData, WebSafeBucket};
use image::DynamicImage;
use sha2::{Digest, Sha256};
use std::io::Cursor;

#[derive(Debug, Clone, Default)]
pub struct MediaAnalysis {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub format: Option<String>,
    pub color_mode: Option<String>,
    pub has_transparency: Option<bool>,
    pub aspect_ratio: Option<f64>,
    pub file_size: Option<i64>,
    pub image_hash: Option<String>,
    pub mime_type: Option<String>,
    pub dominant_colors: Option<Vec<DominantColor>>,
    pub web_safe_histogram: Option<Vec<WebSafeBucket>>,
    pub exif: Option<ExifData>,
    pub error: Option<String>,
}

/// Fetch `url`, decode it as an image, and compute every §4.4 field.
/// Never returns `Err` — any failure is folded into `MediaAnalysis.error`
/// so the caller can persist it and move on.
pub async fn analyze(
    client: &reqwest::Client,
    url: &str,
    max_file_size_bytes: u64,
    n_dominant_colors: usize,
    compute_palette: bool,
) -> MediaAnalysis {
    let mut out = MediaAnalysis::default();

    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            out.error = Some(format!("fetch failed: {e}"));
            return out;
        }
    };

    out.mime_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let bytes = match response.bytes().await {
        Ok(b) => b,
        Err(e) => {
            out.error = Some(format!("body read failed: {e}"));
            return out;
        }
    };

    if bytes.len() as u64 > max_file_size_bytes {
        out.error = Some(format!("file size exceeds limit ({} bytes)", bytes.len()));
        return out;
    }
    out.file_size = Some(bytes.len() as i64);
    out.image_hash = Some(format!("{:x}", Sha256::digest(&bytes)));

    let format = image::guess_format(&bytes).ok();
    let decoded = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(e) => {
            out.error = Some(format!("decode failed: {e}"));
            return out;
        }
    };

    out.width = Some(decoded.width() as i64);
    out.height = Some(decoded.height() as i64);
    out.format = format.map(|f| format!("{:?}", f).to_lowercase());
    out.color_mode = Some(color_mode_label(&decoded));
    out.has_transparency = Some(has_alpha(&decoded));
    out.aspect_ratio =
        Some((decoded.width() as f64 / decoded.height().max(1) as f64 * 100.0).round() / 100.0);
    out.exif = extract_exif(&bytes);

    if compute_palette && n_dominant_colors > 0 {
        let rgb = decoded.to_rgb8();
        let colors = dominant_colors(&rgb, n_dominant_colors);
        if !colors.is_empty() {
            out.web_safe_histogram = Some(web_safe_histogram(&colors));
            out.dominant_colors = Some(colors);
        }
    }

    out
}

fn color_mode_label(image: &DynamicImage) -> String {
    match image {
        DynamicImage::ImageLuma8(_) => "L".to_string(),
        DynamicImage::ImageLumaA8(_) => "LA".to_string(),
        DynamicImage::ImageRgb8(_) => "RGB".to_string(),
        DynamicImage::ImageRgba8(_) => "RGBA".to_string(),
        DynamicImage::ImageLuma16(_) => "L16".to_string(),
        DynamicImage::ImageLumaA16(_) => "LA16".to_string(),
        DynamicImage::ImageRgb16(_) => "RGB16".to_string(),
        DynamicImage::ImageRgba16(_) => "RGBA16".to_string(),
        DynamicImage::ImageRgb32F(_) => "RGB32F".to_string(),
        DynamicImage::ImageRgba32F(_) => "RGBA32F".to_string(),
        _ => "unknown".to_string(),
    }
}

fn has_alpha(image: &DynamicImage) -> bool {
    matches!(
        image,
        DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgba8(_)
            | DynamicImage::ImageLumaA16(_)
            | DynamicImage::ImageRgba16(_)
            | DynamicImage::ImageRgba32F(_)
    )
}

fn extract_exif(bytes: &[u8]) -> Option<ExifData> {
    let reader = exif::Reader::new();
    let exif_data = reader.read_from_container(&mut Cursor::new(bytes)).ok()?;

    let mut out = ExifData::default();
    for field in exif_data.fields() {
        let value = field.display_value().to_string();
        match field.tag {
            exif::Tag::PixelXDimension | exif::Tag::ImageWidth => {
                out.width = value.parse().ok();
            }
            exif::Tag::PixelYDimension | exif::Tag::ImageLength => {
                out.length = value.parse().ok();
            }
            exif::Tag::Make => out.make = Some(value.trim_matches('"').to_string()),
            exif::Tag::Model => out.model = Some(value.trim_matches('"').to_string()),
            exif::Tag::DateTime | exif::Tag::DateTimeOriginal => {
                out.datetime = Some(value.trim_matches('"').to_string())
            }
            _ => {}
        }
    }

    if out.width.is_none() && out.length.is_none() && out.make.is_none() && out.model.is_none()
        && out.datetime.is_none()
    {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn color_mode_reports_rgb_for_an_opaque_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(2, 2, |_, _| Rgb([1, 2, 3])));
        assert_eq!(color_mode_label(&img), "RGB");
        assert!(!has_alpha(&img));
    }

    #[test]
    fn exif_extraction_returns_none_for_non_exif_bytes() {
        assert!(extract_exif(b"not an image at all").is_none());
    }
}

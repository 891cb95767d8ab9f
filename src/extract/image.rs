//! Image extraction through OCR.
//!
//! Images that are not already 8-bit RGB are converted and written to a
//! scratch PNG before recognition.

use std::path::Path;

use image::DynamicImage;
use tempfile::TempDir;

use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::{DocumentKind, ExtractionResult, OCR_UNAVAILABLE, TextExtractor};
use crate::ocr::OcrEngine;

/// OCR extractor for PNG and JPEG files.
pub struct ImageExtractor {
    ocr: OcrEngine,
}

impl ImageExtractor {
    pub fn new(ocr: OcrEngine) -> Self {
        Self { ocr }
    }

    fn recognize(&self, path: &Path) -> ExtractResult<String> {
        let image = image::open(path).map_err(|e| ExtractError::Image {
            message: e.to_string(),
        })?;

        if matches!(image, DynamicImage::ImageRgb8(_)) {
            return self.ocr.recognize(path);
        }

        let scratch = TempDir::new()?;
        let rgb_path = scratch.path().join("rgb.png");
        DynamicImage::ImageRgb8(image.to_rgb8())
            .save(&rgb_path)
            .map_err(|e| ExtractError::Image {
                message: e.to_string(),
            })?;
        self.ocr.recognize(&rgb_path)
    }
}

impl TextExtractor for ImageExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Image
    }

    fn extract(&self, path: &Path) -> ExtractionResult {
        if !self.ocr.is_available() {
            return ExtractionResult::empty(vec![OCR_UNAVAILABLE.into()]);
        }

        match self.recognize(path) {
            Ok(text) if !text.trim().is_empty() => ExtractionResult::extracted(
                text.trim(),
                vec!["Image OCR successful".into()],
            ),
            Ok(_) => ExtractionResult::empty(vec!["Image OCR completed but no text found".into()]),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "image OCR failed");
                ExtractionResult::empty(vec![format!("Image error: {e}")])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_ocr_yields_empty_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blank.png");
        image::RgbImage::new(8, 8).save(&path).unwrap();

        let result = ImageExtractor::new(OcrEngine::disabled()).extract(&path);
        assert_eq!(result.text, "");
        assert!(!result.placeholder);
        assert_eq!(result.log, vec![OCR_UNAVAILABLE]);
    }

    #[test]
    fn undecodable_image_is_logged_not_returned() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let extractor = ImageExtractor::new(OcrEngine::disabled());
        let err = extractor.recognize(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Image { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn rgba_image_is_converted_then_recognized() {
        use crate::ocr::testing;

        let tools = tempfile::TempDir::new().unwrap();
        let engine = testing::engine(
            &testing::tesseract(tools.path(), "  Scanned invoice text  "),
            None,
        );
        let docs = tempfile::TempDir::new().unwrap();
        let path = docs.path().join("invoice.png");
        image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]))
            .save(&path)
            .unwrap();

        let result = ImageExtractor::new(engine).extract(&path);
        assert_eq!(result.text, "Scanned invoice text");
        assert_eq!(result.log, vec!["Image OCR successful"]);

        let calls = testing::recorded_args(tools.path());
        assert_eq!(calls.len(), 1);
        assert!(calls[0].ends_with("/rgb.png stdout --oem 3 --psm 6"), "{}", calls[0]);
        assert!(!calls[0].contains("invoice.png"));
    }

    #[cfg(unix)]
    #[test]
    fn rgb_image_is_recognized_in_place() {
        use crate::ocr::testing;

        let tools = tempfile::TempDir::new().unwrap();
        let engine = testing::engine(&testing::tesseract(tools.path(), ""), Some("deu"));
        let docs = tempfile::TempDir::new().unwrap();
        let path = docs.path().join("blank.png");
        image::RgbImage::new(8, 8).save(&path).unwrap();

        let result = ImageExtractor::new(engine).extract(&path);
        assert_eq!(result.text, "");
        assert_eq!(result.log, vec!["Image OCR completed but no text found"]);
        assert_eq!(
            testing::recorded_args(tools.path()),
            vec![format!("{} stdout --oem 3 --psm 6 -l deu", path.display())]
        );
    }

    #[cfg(unix)]
    #[test]
    fn undecodable_image_with_ocr_is_logged() {
        use crate::ocr::testing;

        let tools = tempfile::TempDir::new().unwrap();
        let engine = testing::engine(&testing::tesseract(tools.path(), "unused"), None);
        let docs = tempfile::TempDir::new().unwrap();
        let path = docs.path().join("broken.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();

        let result = ImageExtractor::new(engine).extract(&path);
        assert_eq!(result.text, "");
        assert!(!result.placeholder);
        assert_eq!(result.log.len(), 1);
        assert!(result.log[0].starts_with("Image error: image decode error: "), "{:?}", result.log);
        assert!(testing::recorded_args(tools.path()).is_empty());
    }
}

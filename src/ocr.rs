//! Optical text extraction from image attachments.
//!
//! Attachments are downloaded to a transient directory, run through the
//! `tesseract` CLI, and the directory is removed on every exit path.

use crate::Attachment;
use crate::error::ExtractionError;

/// Extracts text from an attachment. Seam for the pipeline; tests substitute
/// a fake.
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    /// Whether this extractor handles the given filename. Unsupported
    /// attachments are ignored silently by the pipeline.
    fn supports(&self, filename: &str) -> bool;

    async fn extract(&self, attachment: &Attachment) -> Result<String, ExtractionError>;
}

/// Tesseract-backed extractor.
pub struct OcrExtractor {
    http: reqwest::Client,
}

impl OcrExtractor {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl TextExtractor for OcrExtractor {
    fn supports(&self, filename: &str) -> bool {
        filename.ends_with(".png")
    }

    async fn extract(&self, attachment: &Attachment) -> Result<String, ExtractionError> {
        let bytes = self
            .http
            .get(&attachment.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ExtractionError::Download {
                filename: attachment.filename.clone(),
                source,
            })?
            .bytes()
            .await
            .map_err(|source| ExtractionError::Download {
                filename: attachment.filename.clone(),
                source,
            })?;

        // The tempdir is removed when dropped, OCR success or not.
        let dir = tempfile::tempdir().map_err(ExtractionError::Tempdir)?;
        let image_path = dir.path().join("attachment.png");
        tokio::fs::write(&image_path, &bytes)
            .await
            .map_err(|source| ExtractionError::Write {
                path: image_path.clone(),
                source,
            })?;

        let output = tokio::process::Command::new("tesseract")
            .arg(&image_path)
            .arg("stdout")
            .output()
            .await
            .map_err(ExtractionError::Spawn)?;

        if !output.status.success() {
            return Err(ExtractionError::Ocr {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_png_filenames_are_supported() {
        let extractor = OcrExtractor::new(reqwest::Client::new());
        assert!(extractor.supports("note.png"));
        assert!(extractor.supports("screen shot 1.png"));
        assert!(!extractor.supports("note.jpg"));
        assert!(!extractor.supports("note.pdf"));
        assert!(!extractor.supports("png"));
    }
}

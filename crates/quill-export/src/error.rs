use quill_core::QuillError;
use thiserror::Error;

/// Errors produced by the PDF export pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to rasterize view: {0}")]
    Rasterize(String),

    #[error("PDF backend error: {0}")]
    Backend(String),

    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("export task failed: {0}")]
    Task(String),
}

impl From<ExportError> for QuillError {
    fn from(err: ExportError) -> Self {
        QuillError::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExportError::Backend("font not loaded".to_string());
        assert_eq!(err.to_string(), "PDF backend error: font not loaded");
    }

    #[test]
    fn test_converts_to_quill_error() {
        let err = ExportError::Rasterize("no glyphs".to_string());
        let top: QuillError = err.into();
        assert_eq!(
            top.to_string(),
            "Export error: failed to rasterize view: no glyphs"
        );
    }
}

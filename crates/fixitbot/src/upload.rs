use mime::Mime;

/// Image formats accepted for analysis.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Upload size cap.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Formato de imagen no soportado. Usa JPG, PNG o WEBP.")]
    UnsupportedFormat,
    #[error("Imagen demasiado grande (máximo {max_mb} MB).")]
    TooLarge { max_mb: usize },
}

/// Validates an uploaded image against the allowed formats and size cap.
/// A missing or empty content type passes; the detector decides what it can
/// read. An empty body also skips the format check.
pub fn validate_upload(content_type: Option<&str>, byte_len: usize) -> Result<(), UploadError> {
    if let Some(declared) = content_type.filter(|ct| !ct.trim().is_empty()) {
        let allowed = declared
            .parse::<Mime>()
            .map(|m| ALLOWED_IMAGE_TYPES.contains(&m.essence_str().to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !allowed && byte_len > 0 {
            return Err(UploadError::UnsupportedFormat);
        }
    }

    if byte_len > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            max_mb: MAX_UPLOAD_BYTES / (1024 * 1024),
        });
    }

    Ok(())
}

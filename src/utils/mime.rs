//! MIME type categorization for uploaded documents.

/// How an upload has to be handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Raster image; only a vision-capable AI can read it.
    Image,
    /// PDF; heuristic text recovery is possible, vision AI is the fallback.
    Pdf,
    /// Anything decodable as plain text.
    Text,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared types that tell us nothing about the payload.
fn is_generic_mime(mime: &str) -> bool {
    mime.is_empty()
        || mime == "application/octet-stream"
        || mime == "binary/octet-stream"
        || mime == "application/unknown"
}

/// Categorize a concrete MIME type.
pub fn mime_type_category(mime: &str) -> ContentKind {
    let mime_lower = mime.trim().to_lowercase();

    if mime_lower.starts_with("image/") {
        ContentKind::Image
    } else if mime_lower == "application/pdf" || mime_lower == "application/x-pdf" {
        ContentKind::Pdf
    } else {
        ContentKind::Text
    }
}

/// Classify an upload from its declared type, falling back to magic bytes
/// and then the file extension when the declared type is missing or generic.
pub fn classify_content(declared_mime: &str, file_name: &str, bytes: &[u8]) -> ContentKind {
    let declared = declared_mime.trim().to_lowercase();
    if !is_generic_mime(&declared) {
        return mime_type_category(&declared);
    }

    if let Some(kind) = infer::get(bytes) {
        return mime_type_category(kind.mime_type());
    }

    match mime_guess::from_path(file_name).first() {
        Some(guess) => mime_type_category(guess.essence_str()),
        None => ContentKind::Text,
    }
}

/// The MIME type to send alongside inline bytes.
///
/// Prefers the declared type, then sniffed magic bytes, then the extension.
pub fn effective_mime(declared_mime: &str, file_name: &str, bytes: &[u8]) -> String {
    let declared = declared_mime.trim().to_lowercase();
    if !is_generic_mime(&declared) {
        return declared;
    }
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or("text/plain")
        .to_string()
}

use bytes::Bytes;
use serde::Serialize;

/// A file part received at request ingress.
///
/// The content is an immutable, reference-counted buffer: sniffing the
/// signature borrows a prefix and never moves a read cursor, so the full
/// content is still intact when it is handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Client-supplied filename, unmodified.
    pub filename: String,
    /// Raw bytes of the file part.
    pub content: Bytes,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Lowercased text after the last `.` of the filename, if any.
    ///
    /// `"scan.JPG"` yields `Some("jpg")`, `"archive.tar.gz"` yields
    /// `Some("gz")`, `"noext"` yields `None`. A trailing dot yields
    /// `Some("")`.
    pub fn extension(&self) -> Option<String> {
        file_extension(&self.filename)
    }
}

/// Raster formats accepted by the signature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
}

impl ImageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpeg",
            ImageKind::Gif => "gif",
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upload that passed every validation check, ready for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    pub filename: String,
    pub content: Bytes,
    /// MIME type derived from the filename extension (not the signature).
    pub mime_type: &'static str,
    /// Format detected from the leading bytes.
    pub kind: ImageKind,
}

pub(crate) fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_last_segment() {
        assert_eq!(
            UploadedImage::new("scan.JPG", Vec::new()).extension(),
            Some("jpg".into())
        );
        assert_eq!(
            UploadedImage::new("archive.tar.gz", Vec::new()).extension(),
            Some("gz".into())
        );
        assert_eq!(UploadedImage::new("noext", Vec::new()).extension(), None);
        assert_eq!(
            UploadedImage::new("trailing.", Vec::new()).extension(),
            Some(String::new())
        );
    }

    #[test]
    fn image_kind_display() {
        assert_eq!(ImageKind::Png.to_string(), "png");
        assert_eq!(ImageKind::Jpeg.to_string(), "jpeg");
        assert_eq!(ImageKind::Gif.to_string(), "gif");
    }
}

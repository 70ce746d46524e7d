//! Filename-based MIME resolution for the upstream model call.

use crate::types::file_extension;

/// MIME type used when the extension is missing or unknown.
pub const FALLBACK_MIME_TYPE: &str = "image/jpeg";

/// Map a filename's extension to the MIME tag sent with the image.
///
/// Pure and total: unknown or missing extensions resolve to
/// [`FALLBACK_MIME_TYPE`].
///
/// ```rust
/// assert_eq!(ingest::mime_type("a.PNG"), "image/png");
/// assert_eq!(ingest::mime_type("a.unknownext"), "image/jpeg");
/// assert_eq!(ingest::mime_type("noext"), "image/jpeg");
/// ```
pub fn mime_type(filename: &str) -> &'static str {
    let ext = file_extension(filename).unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => FALLBACK_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(mime_type("rx.png"), "image/png");
        assert_eq!(mime_type("rx.jpg"), "image/jpeg");
        assert_eq!(mime_type("rx.jpeg"), "image/jpeg");
        assert_eq!(mime_type("rx.gif"), "image/gif");
        assert_eq!(mime_type("rx.heic"), "image/heic");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(mime_type("a.PNG"), "image/png");
        assert_eq!(mime_type("photo.HeIc"), "image/heic");
    }

    #[test]
    fn unknown_and_missing_fall_back_to_jpeg() {
        assert_eq!(mime_type("a.unknownext"), "image/jpeg");
        assert_eq!(mime_type("noext"), "image/jpeg");
        assert_eq!(mime_type(""), "image/jpeg");
        assert_eq!(mime_type("trailing."), "image/jpeg");
    }

    #[test]
    fn only_last_extension_counts() {
        assert_eq!(mime_type("scan.png.gif"), "image/gif");
        assert_eq!(mime_type("scan.gif.txt"), "image/jpeg");
    }
}

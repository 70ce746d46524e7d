//! Upload validation: filename checks, extension allow-set, signature sniff.

use image::ImageFormat;
use tracing::warn;

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::types::{ImageKind, UploadedImage};

/// Detect PNG, JPEG or GIF from the leading bytes of `bytes`.
///
/// Only the first `window` bytes are inspected. Any other format the
/// detector recognises (WebP, AVIF, BMP, ...) is treated as unknown.
pub fn sniff_image_kind(bytes: &[u8], window: usize) -> Option<ImageKind> {
    let header = &bytes[..bytes.len().min(window)];

    match image::guess_format(header).ok()? {
        ImageFormat::Png => Some(ImageKind::Png),
        ImageFormat::Jpeg => Some(ImageKind::Jpeg),
        ImageFormat::Gif => Some(ImageKind::Gif),
        _ => None,
    }
}

/// Run every upload check in order and report the first failure.
///
/// 1. a file must be present
/// 2. its filename must be non-empty
/// 3. the filename must contain a dot
/// 4. the lowercased extension must be in the allow-set
/// 5. the leading bytes must carry a PNG/JPEG/GIF signature
///
/// `.heic` passes step 4 but can never pass step 5, since no HEIC signature
/// is recognised. That rejection is logged so it can be told apart from
/// genuinely corrupt uploads.
pub fn validate_upload(
    upload: Option<&UploadedImage>,
    cfg: &IngestConfig,
) -> Result<ImageKind, IngestError> {
    let upload = upload.ok_or(IngestError::NoFileProvided)?;

    if upload.filename.is_empty() {
        return Err(IngestError::NoFileSelected);
    }

    let extension = upload.extension().ok_or(IngestError::MissingExtension)?;
    if !cfg.is_allowed_extension(&extension) {
        return Err(IngestError::UnsupportedExtension {
            extension,
            allowed: cfg.allowed_list(),
        });
    }

    match sniff_image_kind(&upload.content, cfg.sniff_bytes) {
        Some(kind) => Ok(kind),
        None => {
            if extension == "heic" {
                warn!(
                    filename = %upload.filename,
                    "heic_upload_rejected_by_signature_check"
                );
            }
            Err(IngestError::NotAnImage)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn upload(name: &str, bytes: &[u8]) -> UploadedImage {
        UploadedImage::new(name, bytes.to_vec())
    }

    fn check(name: &str, bytes: &[u8]) -> Result<ImageKind, IngestError> {
        validate_upload(Some(&upload(name, bytes)), &IngestConfig::default())
    }

    #[test]
    fn sniffs_supported_formats() {
        assert_eq!(sniff_image_kind(&padded(PNG_HEADER), 512), Some(ImageKind::Png));
        assert_eq!(sniff_image_kind(&padded(JPEG_HEADER), 512), Some(ImageKind::Jpeg));
        assert_eq!(sniff_image_kind(&padded(GIF_HEADER), 512), Some(ImageKind::Gif));
        assert_eq!(sniff_image_kind(b"GIF87a\x01\0", 512), Some(ImageKind::Gif));
    }

    #[test]
    fn sniff_rejects_text_and_empty() {
        assert_eq!(sniff_image_kind(b"Metformin 500mg OD", 512), None);
        assert_eq!(sniff_image_kind(b"", 512), None);
    }

    #[test]
    fn sniff_rejects_other_raster_formats() {
        let bmp = padded(b"BM\x36\0\0\0\0\0\0\0");
        assert_eq!(sniff_image_kind(&bmp, 512), None);
    }

    #[test]
    fn missing_file() {
        assert_eq!(
            validate_upload(None, &IngestConfig::default()),
            Err(IngestError::NoFileProvided)
        );
    }

    #[test]
    fn empty_filename() {
        assert_eq!(check("", &padded(PNG_HEADER)), Err(IngestError::NoFileSelected));
    }

    #[test]
    fn filename_without_dot_fails_regardless_of_content() {
        for bytes in [padded(PNG_HEADER), padded(JPEG_HEADER), b"plain".to_vec()] {
            assert_eq!(check("prescription", &bytes), Err(IngestError::MissingExtension));
        }
    }

    #[test]
    fn extension_outside_allow_set() {
        for name in ["rx.bmp", "rx.txt", "rx.pdf", "rx.webp", "rx."] {
            let err = check(name, &padded(PNG_HEADER)).unwrap_err();
            assert!(
                err.to_string().starts_with("Invalid file type. Allowed: "),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn valid_signature_with_allowed_extension_passes() {
        assert_eq!(check("rx.png", &padded(PNG_HEADER)), Ok(ImageKind::Png));
        assert_eq!(check("rx.JPG", &padded(JPEG_HEADER)), Ok(ImageKind::Jpeg));
        assert_eq!(check("rx.jpeg", &padded(JPEG_HEADER)), Ok(ImageKind::Jpeg));
        assert_eq!(check("rx.gif", &padded(GIF_HEADER)), Ok(ImageKind::Gif));
    }

    #[test]
    fn extension_and_signature_need_not_agree() {
        assert_eq!(check("rx.jpg", &padded(PNG_HEADER)), Ok(ImageKind::Png));
    }

    #[test]
    fn renamed_text_file_is_not_an_image() {
        assert_eq!(
            check("notes.png", b"Take one tablet twice daily\n"),
            Err(IngestError::NotAnImage)
        );
    }

    #[test]
    fn heic_is_allowed_but_never_sniffed() {
        let heic = padded(b"\0\0\0\x18ftypheic\0\0\0\0");
        assert_eq!(check("scan.heic", &heic), Err(IngestError::NotAnImage));
    }

    #[test]
    fn validation_does_not_consume_content() {
        let original = padded(PNG_HEADER);
        let up = upload("rx.png", &original);
        validate_upload(Some(&up), &IngestConfig::default()).unwrap();
        assert_eq!(up.content.as_ref(), original.as_slice());
    }

    #[test]
    fn custom_allow_set() {
        let cfg = IngestConfig {
            allowed_extensions: vec!["png".into()],
            ..Default::default()
        };
        let err = validate_upload(Some(&upload("rx.gif", &padded(GIF_HEADER))), &cfg).unwrap_err();
        assert_eq!(err.to_string(), "Invalid file type. Allowed: png");
    }
}

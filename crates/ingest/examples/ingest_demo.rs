//! Run a few uploads through the validator and print the outcome.
//!
//! `cargo run -p rx-ingest --example ingest_demo -- path/to/file.png ...`
//! validates real files; with no arguments a built-in set of samples is used.

use ingest::{ingest_upload, IngestConfig, UploadedImage};

fn samples() -> Vec<UploadedImage> {
    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    png.resize(128, 0);

    vec![
        UploadedImage::new("prescription.png", png.clone()),
        UploadedImage::new("prescription.PNG", png.clone()),
        UploadedImage::new("prescription", png.clone()),
        UploadedImage::new("prescription.bmp", png),
        UploadedImage::new("notes.png", b"Metformin 500mg OD".to_vec()),
        UploadedImage::new("scan.heic", b"\0\0\0\x18ftypheic".to_vec()),
    ]
}

fn main() -> std::io::Result<()> {
    let cfg = IngestConfig::default();

    let uploads = match std::env::args().skip(1).collect::<Vec<_>>() {
        paths if paths.is_empty() => samples(),
        paths => paths
            .into_iter()
            .map(|path| Ok(UploadedImage::new(path.clone(), std::fs::read(&path)?)))
            .collect::<std::io::Result<Vec<_>>>()?,
    };

    for upload in uploads {
        let name = upload.filename.clone();
        match ingest_upload(Some(upload), &cfg) {
            Ok(img) => println!("{name:<24} ok   {} ({})", img.mime_type, img.kind),
            Err(err) => println!("{name:<24} FAIL {err}"),
        }
    }

    Ok(())
}

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbImage};
use sehatyaad::{
    process_description, process_upload, Confidence, ExtractError, FakeModel, IngestConfig,
    IngestError, Part, PipelineError, PrescriptionGateway, UploadedImage,
};

const METFORMIN_REPLY: &str = r#"```json
{"medications": [{"name": "Metformin", "dosage": "500", "dosageUnit": "mg",
  "frequency": "twice daily", "times": ["08:00", "20:00"],
  "instructions": "after meals", "confidence": "high"}],
 "doctorName": "Dr. Mehta", "date": "2024-05-02", "pharmacyName": null}
```"#;

fn encode(format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn pipeline(reply: &str) -> (PrescriptionGateway, Arc<FakeModel>) {
    let model = Arc::new(FakeModel::replying(reply));
    (PrescriptionGateway::new(model.clone()), model)
}

#[tokio::test]
async fn png_upload_reaches_model_with_png_mime() -> Result<(), PipelineError> {
    let (gateway, model) = pipeline(METFORMIN_REPLY);
    let png = encode(ImageFormat::Png);

    let upload = UploadedImage::new("prescription.png", png.clone());
    let extraction = process_upload(&gateway, Some(upload), &IngestConfig::default()).await?;

    assert_eq!(extraction.medications.len(), 1);
    assert_eq!(extraction.medications[0].name, "Metformin");
    assert_eq!(extraction.medications[0].confidence, Confidence::High);
    assert_eq!(extraction.doctor_name.as_deref(), Some("Dr. Mehta"));
    assert_eq!(extraction.pharmacy_name, None);

    let parts = model.last_parts().unwrap();
    assert_eq!(parts[1], Part::inline_image("image/png", &png));
    Ok(())
}

#[tokio::test]
async fn mime_follows_extension_not_signature() -> Result<(), PipelineError> {
    let (gateway, model) = pipeline(METFORMIN_REPLY);

    // A real JPEG renamed to .png is accepted and sent as image/png.
    let jpeg = encode(ImageFormat::Jpeg);
    let upload = UploadedImage::new("scan.PNG", jpeg.clone());
    process_upload(&gateway, Some(upload), &IngestConfig::default()).await?;

    let parts = model.last_parts().unwrap();
    assert_eq!(parts[1], Part::inline_image("image/png", &jpeg));
    Ok(())
}

#[tokio::test]
async fn text_file_renamed_to_png_is_rejected() {
    let (gateway, model) = pipeline(METFORMIN_REPLY);

    let upload = UploadedImage::new("notes.png", b"Metformin 500mg twice daily".to_vec());
    let err = process_upload(&gateway, Some(upload), &IngestConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err, PipelineError::Ingest(IngestError::NotAnImage));
    assert_eq!(err.to_string(), "File is not a valid image");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn heic_is_accepted_by_name_but_rejected_by_signature() {
    let (gateway, model) = pipeline(METFORMIN_REPLY);

    let mut heic = b"\x00\x00\x00\x18ftypheic".to_vec();
    heic.resize(256, 0);
    let upload = UploadedImage::new("IMG_0001.HEIC", heic);
    let err = process_upload(&gateway, Some(upload), &IngestConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err, PipelineError::Ingest(IngestError::NotAnImage));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn description_round_trip() -> Result<(), PipelineError> {
    let (gateway, model) = pipeline(METFORMIN_REPLY);

    let extraction =
        process_description(&gateway, "Metformin 500mg twice daily after meals").await?;

    assert_eq!(extraction.medications[0].times, vec!["08:00", "20:00"]);
    assert_eq!(model.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn empty_model_answer_is_client_facing() {
    let (gateway, _) = pipeline(r#"{"medications": []}"#);

    let err = process_description(&gateway, "vitamin D").await.unwrap_err();
    assert_eq!(
        err,
        PipelineError::Extract(ExtractError::EmptyResult(
            "No medications found in the text".into()
        ))
    );
    assert_eq!(err.http_status_code(), 400);
}

#[tokio::test]
async fn model_failure_is_server_side() {
    let model = Arc::new(FakeModel::failing(ExtractError::Request(
        "connection refused".into(),
    )));
    let gateway = PrescriptionGateway::new(model);

    let err = process_upload(
        &gateway,
        Some(UploadedImage::new("rx.gif", encode(ImageFormat::Png))),
        &IngestConfig::default(),
    )
    .await;
    // GIF name with PNG bytes still passes; only the model call fails.
    let err = err.unwrap_err();
    assert!(!err.is_client_error());
    assert_eq!(err.http_status_code(), 500);
}

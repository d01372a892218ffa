use axum::response::Response;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, RgbImage};
use rand::RngCore;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Collect response body bytes
pub async fn response_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Encoded PNG of the given dimensions, for upload payloads
pub fn test_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([40, 90, 220])));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("failed to encode test image");
    out.into_inner()
}

/// Random payload that will not decode as an image
pub fn random_bytes(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use image::{DynamicImage, ImageFormat};
use nutrifit::config::DEFAULT_MAX_UPLOAD_BYTES;
use nutrifit::llm::GenerativeModel;
use nutrifit::{AppState, build_router};

pub const BOUNDARY: &str = "nutrifit-test-boundary";

/// Fresh, empty directory under the system temp dir.
pub fn scratch_dir(tag: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let dir = std::env::temp_dir().join(format!(
        "nutrifit-{}-{}-{}",
        tag,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn app_with(model: impl GenerativeModel + 'static) -> Router {
    app_in(model, scratch_dir("static"), DEFAULT_MAX_UPLOAD_BYTES)
}

pub fn app_in(model: impl GenerativeModel + 'static, static_dir: PathBuf, limit: usize) -> Router {
    build_router(AppState::new(Arc::new(model), static_dir), limit)
}

pub fn encoded_image(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

/// Returns `(content type header, body)` for a single-file multipart form.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

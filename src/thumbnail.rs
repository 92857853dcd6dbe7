//! First-page PDF thumbnail rendering
//!
//! Rasterizes page 1 of a fetched PDF byte stream to a JPEG sized for a
//! card grid. Rendering runs on the blocking pool since MuPDF work is
//! CPU-bound. Every failure mode degrades to "no thumbnail": callers must
//! treat a missing thumbnail as a valid outcome, not a defect.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use mupdf::{Colorspace, Document, Matrix};
use thiserror::Error;

/// Rendered thumbnail width in pixels, regardless of page aspect ratio.
pub const TARGET_THUMB_WIDTH: u32 = 200;

/// JPEG quality for encoded thumbnails (0-100).
const THUMB_JPEG_QUALITY: u8 = 82;

#[derive(Debug, Error)]
enum ThumbnailError {
    #[error("MuPDF error: {0}")]
    Mupdf(#[from] mupdf::Error),

    #[error("Page has zero width")]
    DegeneratePage,

    #[error("Image error: {0}")]
    Image(String),
}

/// Render the first page of `data` as a JPEG thumbnail.
///
/// Returns `None` for anything that is not a renderable PDF (corrupt
/// file, unsupported encoding, empty document).
pub async fn render_first_page(data: Bytes) -> Option<Bytes> {
    let result = tokio::task::spawn_blocking(move || render_sync(&data)).await;
    match result {
        Ok(Ok(jpeg)) => Some(Bytes::from(jpeg)),
        Ok(Err(e)) => {
            tracing::debug!("Thumbnail render failed: {}", e);
            None
        }
        Err(e) => {
            tracing::warn!("Thumbnail render task panicked: {}", e);
            None
        }
    }
}

fn render_sync(data: &[u8]) -> Result<Vec<u8>, ThumbnailError> {
    let doc = Document::from_bytes(data, "application/pdf")?;
    let page = doc.load_page(0)?;
    let bounds = page.bounds()?;

    let page_width = bounds.x1 - bounds.x0;
    if page_width <= 0.0 {
        return Err(ThumbnailError::DegeneratePage);
    }
    let scale = TARGET_THUMB_WIDTH as f32 / page_width;

    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();
    let pixmap = page.to_pixmap(&matrix, &colorspace, false, false)?;

    encode_jpeg(&pixmap)
}

fn encode_jpeg(pixmap: &mupdf::Pixmap) -> Result<Vec<u8>, ThumbnailError> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            rgb.extend_from_slice(&[r, g, b]);
        }
    }

    let img = image::RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| ThumbnailError::Image("Failed to create image buffer".to_string()))?;

    let mut output = Vec::new();
    let mut cursor = Cursor::new(&mut output);
    let encoder = JpegEncoder::new_with_quality(&mut cursor, THUMB_JPEG_QUALITY);
    img.write_with_encoder(encoder)
        .map_err(|e| ThumbnailError::Image(e.to_string()))?;

    Ok(output)
}

/// Well-formed single-page PDF (blank page, 400x600pt) with a valid
/// cross-reference table, built with computed byte offsets. Shared with
/// the orchestrator tests.
#[cfg(test)]
pub(crate) fn minimal_pdf() -> Bytes {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>",
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 400 600] >>",
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_pos = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_pos
    ));

    Bytes::from(pdf.into_bytes())
}

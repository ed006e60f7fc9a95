//! Single-page PDF composition.
//!
//! Embeds the (possibly styled) raster artifact into an A4 page, centred
//! inside fixed margins with its aspect ratio preserved.

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Pt, RawImage, XObjectTransform,
};

use crate::error::{QrsmithError, Result};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const PAGE_MARGIN_MM: f32 = 20.0;

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// Centred placement of an `img_w` x `img_h` pixel image on the page, in
/// points: (x, y, width, height). One pixel renders as one point before the
/// fit scale is applied, so the aspect ratio carries over exactly.
pub fn placement(img_w: u32, img_h: u32) -> (f32, f32, f32, f32) {
    let page_w = mm_to_pt(PAGE_WIDTH_MM);
    let page_h = mm_to_pt(PAGE_HEIGHT_MM);
    let avail_w = mm_to_pt(PAGE_WIDTH_MM - 2.0 * PAGE_MARGIN_MM);
    let avail_h = mm_to_pt(PAGE_HEIGHT_MM - 2.0 * PAGE_MARGIN_MM);

    let img_w = img_w.max(1) as f32;
    let img_h = img_h.max(1) as f32;
    let scale = (avail_w / img_w).min(avail_h / img_h);

    let w = img_w * scale;
    let h = img_h * scale;
    let x = (page_w - w) / 2.0;
    let y = (page_h - h) / 2.0;
    (x, y, w, h)
}

/// Build a one-page PDF document embedding the given PNG bytes.
pub fn compose_pdf(png_bytes: &[u8]) -> Result<Vec<u8>> {
    let mut warnings = Vec::new();

    let image = RawImage::decode_from_bytes(png_bytes, &mut warnings)
        .map_err(|e| QrsmithError::export(format!("failed to decode image for PDF: {}", e)))?;

    let (x, y, w, _h) = placement(image.width as u32, image.height as u32);
    // At 72 dpi one pixel is one point; a uniform scale fits the image into
    // the margin box.
    let scale = w / image.width.max(1) as f32;

    let mut doc = PdfDocument::new("QR Code");
    let image_id = doc.add_image(&image);

    let ops = vec![Op::UseXobject {
        id: image_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(x)),
            translate_y: Some(Pt(y)),
            rotate: None,
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(72.0),
        },
    }];

    let page = PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops);
    doc.pages.push(page);

    Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
}

//! Embedded page images. Scanned reports are usually one full-page image
//! per page; those are pulled out and re-encoded as PNG for OCR and for
//! the vision model.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object};

use crate::error::ExtractError;

/// Images smaller than this on either side are logos or decorations.
const MIN_SIDE: u32 = 200;

/// Upper bound on images pulled from one document.
pub const MAX_PAGES: usize = 20;

/// Extract the document's image XObjects as PNG bytes, in object order.
pub fn page_images(pdf: &[u8]) -> Result<Vec<Vec<u8>>, ExtractError> {
    let document = Document::load_mem(pdf).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let mut images = Vec::new();
    for object in document.objects.values() {
        if images.len() >= MAX_PAGES {
            break;
        }
        let Object::Stream(stream) = object else {
            continue;
        };
        if !is_image(&stream.dict) {
            continue;
        }
        match decode(&stream.dict, stream) {
            Ok(Some(img)) if img.width() >= MIN_SIDE && img.height() >= MIN_SIDE => {
                images.push(encode_png(&img)?);
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "skipping undecodable image"),
        }
    }
    Ok(images)
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

fn filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Object::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn integer(dict: &Dictionary, key: &[u8]) -> Option<u32> {
    match dict.get(key) {
        Ok(Object::Integer(v)) => u32::try_from(*v).ok(),
        _ => None,
    }
}

fn decode(dict: &Dictionary, stream: &lopdf::Stream) -> Result<Option<DynamicImage>, ExtractError> {
    let filters = filters(dict);

    // JPEG data is stored as-is.
    if filters.iter().any(|f| f == b"DCTDecode") {
        let img = image::load_from_memory(&stream.content)
            .map_err(|e| ExtractError::Image(e.to_string()))?;
        return Ok(Some(img));
    }

    // Anything other than plain or Flate-compressed pixels (CCITT, JBIG2,
    // JPX) is left alone.
    if filters.iter().any(|f| f != b"FlateDecode") {
        return Ok(None);
    }

    let (Some(width), Some(height)) = (integer(dict, b"Width"), integer(dict, b"Height")) else {
        return Ok(None);
    };
    if integer(dict, b"BitsPerComponent") != Some(8) {
        return Ok(None);
    }

    let pixels = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| ExtractError::Pdf(e.to_string()))?
    };

    let color_space = match dict.get(b"ColorSpace") {
        Ok(Object::Name(name)) => name.as_slice(),
        _ => b"DeviceRGB".as_slice(),
    };
    let img = match color_space {
        b"DeviceGray" => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        b"DeviceRGB" => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        _ => None,
    };
    Ok(img)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ExtractError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| ExtractError::Image(e.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_a_pdf_error() {
        assert!(matches!(page_images(b"not a pdf"), Err(ExtractError::Pdf(_))));
    }

    #[test]
    fn gray_pixels_become_png() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}

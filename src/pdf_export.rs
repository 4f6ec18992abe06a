//! PDF assembly from the staged page images.
//!
//! Each page image becomes one PDF page: the image is decoded, normalized
//! to RGB, re-encoded as JPEG and embedded as a DCTDecode XObject. Page
//! dimensions map pixels to points at a fixed density, so a 1000px-wide
//! scan renders as a 10in-wide page.

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::MergeError;

const RESOLUTION_DPI: f32 = 100.0;
const JPEG_QUALITY: u8 = 95;
const POINTS_PER_INCH: f32 = 72.0;

/// Assembles the staged pages, in the order given, into a single PDF at
/// `output`. Fails with [`MergeError::EmptyPageSet`] when there is nothing
/// to assemble.
pub fn export(pages: &[PathBuf], output: &Path) -> Result<(), MergeError> {
    if pages.is_empty() {
        return Err(MergeError::EmptyPageSet);
    }

    info!("Exporting {} pages to PDF", pages.len());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for path in pages {
        let page_id = add_page(&mut doc, pages_id, path)?;
        kids.push(page_id.into());
        debug!("Added page {}", path.display());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data)
        .map_err(|e| MergeError::PdfWrite(e.to_string()))?;
    fs::write(output, data)?;

    Ok(())
}

fn add_page(doc: &mut Document, pages_id: ObjectId, path: &Path) -> Result<ObjectId, MergeError> {
    let img = image::open(path).map_err(|source| MergeError::UndecodablePage {
        path: path.to_path_buf(),
        source,
    })?;

    // Normalize color mode: scans come in grayscale, paletted and RGBA
    // variants, the embedded JPEG is always 3-channel RGB.
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode(rgb.as_raw(), width, height, ColorType::Rgb8)
        .map_err(|source| MergeError::UndecodablePage {
            path: path.to_path_buf(),
            source,
        })?;

    let image_id = doc.add_object(Object::Stream(
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        )
        .with_compression(false),
    ));

    let width_pt = width as f32 * POINTS_PER_INCH / RESOLUTION_DPI;
    let height_pt = height as f32 * POINTS_PER_INCH / RESOLUTION_DPI;

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(width_pt),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(height_pt),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| MergeError::PdfWrite(e.to_string()))?;
    let content_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, encoded)));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width_pt),
            Object::Real(height_pt),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    Ok(page_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_pixel(width, height, image::Rgb([180, 40, 40]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn empty_page_set_is_rejected() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.pdf");

        let err = export(&[], &output).unwrap_err();
        assert!(matches!(err, MergeError::EmptyPageSet));
        assert!(!output.exists());
    }

    #[test]
    fn exports_pages_as_pdf() {
        let dir = TempDir::new().unwrap();
        let p1 = dir.path().join("01.png");
        let p2 = dir.path().join("02.png");
        write_png(&p1, 4, 6);
        write_png(&p2, 4, 6);

        let output = dir.path().join("out.pdf");
        export(&[p1, p2], &output).unwrap();

        let bytes = fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn undecodable_page_is_fatal() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("01.jpg");
        fs::write(&bogus, b"not an image").unwrap();

        let output = dir.path().join("out.pdf");
        let err = export(&[bogus], &output).unwrap_err();
        assert!(matches!(err, MergeError::UndecodablePage { .. }));
    }
}

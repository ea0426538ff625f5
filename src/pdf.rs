//! PDF encoding of an [`OutputDocument`].
//!
//! The raster is embedded once as an RGB image XObject; every page places
//! that same image at its frame offset and lets the page box crop it.

use crate::pagination::OutputDocument;
use crate::{Error, Result};
use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

const PT_PER_MM: f64 = 72.0 / 25.4;

fn pt(mm: f64) -> Object {
    ((mm * PT_PER_MM) as f32).into()
}

/// Flatten RGBA onto white; PDF image XObjects carry no alpha here.
fn rgb_bytes(pixels: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.width() as usize * pixels.height() as usize * 3);
    for p in pixels.pixels() {
        let a = p[3] as u32;
        for c in 0..3 {
            out.push(((p[c] as u32 * a + 255 * (255 - a)) / 255) as u8);
        }
    }
    out
}

fn page_operations(doc: &OutputDocument, offset: f64) -> Vec<Operation> {
    if doc.image.height == 0 {
        return Vec::new();
    }
    let g = &doc.geometry;
    // PDF space grows upwards from the bottom-left corner.
    let bottom = g.page_height - (offset + doc.image_height);
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![pt(g.page_width), 0.into(), 0.into(), pt(doc.image_height), 0.into(), pt(bottom)],
        ),
        Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

/// Encode `doc` as PDF bytes, one portrait page per frame.
pub fn render(doc: &OutputDocument) -> Result<Vec<u8>> {
    let g = &doc.geometry;
    let mut pdf = Document::with_version("1.5");
    let id_pages = pdf.new_object_id();

    let raster = &doc.image;
    let id_image = pdf.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(raster.width),
            "Height" => i64::from(raster.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb_bytes(&raster.pixels),
    ));
    let id_resources = pdf.add_object(dictionary! {
        "XObject" => dictionary! {
            "Im0" => id_image,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(doc.frames.len());
    for frame in &doc.frames {
        let content = Content {
            operations: page_operations(doc, frame.offset),
        };
        let id_content = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));
        let id_page = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => id_pages,
            "Contents" => id_content,
            "Resources" => id_resources,
        });
        kids.push(id_page.into());
    }

    let count = kids.len() as i64;
    pdf.set_object(
        id_pages,
        dictionary! {
            "Type" => "Pages",
            "Count" => count,
            "Kids" => kids,
            "MediaBox" => vec![0.into(), 0.into(), pt(g.page_width), pt(g.page_height)],
        },
    );

    let id_catalog = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => id_pages,
    });
    pdf.trailer.set("Root", id_catalog);
    let id_info = pdf.add_object(dictionary! {
        "Title" => Object::string_literal("BI1 (Bot I) Documentation"),
        "Producer" => Object::string_literal(concat!("bi1docs ", env!("CARGO_PKG_VERSION"))),
    });
    pdf.trailer.set("Info", id_info);
    pdf.compress();

    let mut buffer = Vec::new();
    pdf.save_to(&mut buffer)
        .map_err(|e| Error::AssemblyError(format!("PDF write failed: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{assemble, PageGeometry};
    use crate::rendering::RasterImage;

    fn doc(w: u32, h: u32) -> OutputDocument {
        let img = RasterImage::new(RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255])), 2);
        assemble(img, PageGeometry::default()).unwrap()
    }

    #[test]
    fn pdf_has_one_page_per_frame() {
        let d = doc(80, 300);
        let bytes = render(&d).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), d.page_count());
    }

    #[test]
    fn second_page_shifts_image_up_by_one_page() {
        let d = doc(80, 300);
        let ops = page_operations(&d, d.frames[1].offset);
        let cm = &ops[1];
        assert_eq!(cm.operator, "cm");
        // bottom edge = 295 - (-295 + image_height)
        let expected = ((295.0 + 295.0 - d.image_height) * PT_PER_MM) as f32;
        match &cm.operands[5] {
            Object::Real(v) => assert!((*v as f64 - expected as f64).abs() < 1e-3),
            other => panic!("unexpected operand {:?}", other),
        }
    }

    #[test]
    fn rgb_flattening_composites_onto_white() {
        let px = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
        assert_eq!(rgb_bytes(&px), vec![255, 255, 255]);
        let px = RgbaImage::from_pixel(1, 1, image::Rgba([10, 20, 30, 255]));
        assert_eq!(rgb_bytes(&px), vec![10, 20, 30]);
    }
}

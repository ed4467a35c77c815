//! Serializes laid-out pages into a PDF byte buffer.
//!
//! Nothing time- or randomness-dependent is written (no creation date, no
//! file identifier), so identical pages always produce identical bytes.

use super::fonts::FontFace;
use super::layout::PageCanvas;
use crate::utils::error::RenderError;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Millimetres to PDF points, rounded to 1/100 pt.
pub fn mm_to_pt(mm: f32) -> f32 {
    (mm * PT_PER_MM * 100.0).round() / 100.0
}

pub struct DocumentInfo<'a> {
    pub title: &'a str,
    pub producer: &'a str,
    pub compress: bool,
}

/// PDF text string: UTF-16BE with a byte-order mark.
fn text_string(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

pub fn assemble(pages: Vec<PageCanvas>, info: &DocumentInfo<'_>) -> Result<Vec<u8>, RenderError> {
    if pages.is_empty() {
        return Err(RenderError::layout("document has no pages"));
    }

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for canvas in pages {
        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(mm_to_pt(canvas.width_mm())),
            Object::Real(mm_to_pt(canvas.height_mm())),
        ];
        let content = Content {
            operations: canvas.into_operations(),
        };
        let encoded = content.encode().map_err(|err| {
            RenderError::layout(format!("content stream encoding failed: {}", err))
        })?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => text_string(info.title),
        "Producer" => text_string(info.producer),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    if info.compress {
        doc.compress();
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|err| RenderError::layout(format!("document serialization failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_millimetres_to_points() {
        assert_eq!(mm_to_pt(25.4), 72.0);
        assert_eq!(mm_to_pt(210.0), 595.28);
        assert_eq!(mm_to_pt(0.0), 0.0);
    }

    #[test]
    fn text_strings_are_utf16_with_bom() {
        match text_string("A\u{2014}") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xFE, 0xFF, 0x00, 0x41, 0x20, 0x14]);
            }
            other => panic!("unexpected object: {other:?}"),
        }
    }

    #[test]
    fn assembles_a_loadable_document() {
        let pages = vec![
            PageCanvas::new(210.0, 297.0, 0.2),
            PageCanvas::new(210.0, 297.0, 0.2),
        ];
        let info = DocumentInfo {
            title: "Test",
            producer: "clinic-report",
            compress: false,
        };
        let bytes = assemble(pages, &info).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn refuses_an_empty_page_list() {
        let info = DocumentInfo {
            title: "Test",
            producer: "clinic-report",
            compress: true,
        };
        assert!(assemble(Vec::new(), &info).is_err());
    }
}

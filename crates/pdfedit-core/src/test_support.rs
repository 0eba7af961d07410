//! In-process PDF fixtures for unit tests.

use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// A document with `num_pages` Letter pages, each showing `<label>-Page-<n>`.
pub(crate) fn pdf_bytes(num_pages: u32, label: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for page_num in 1..=num_pages {
        let content = format!("BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET", label, page_num);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => num_pages as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub(crate) fn write_pdf(dir: &Path, name: &str, num_pages: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_bytes(num_pages, name.trim_end_matches(".pdf"))).unwrap();
    path
}

/// Decoded content of every page, in page order.
pub(crate) fn page_texts(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned())
        .collect()
}

/// Annotation dictionaries attached to the zero-based page.
pub(crate) fn annotations(path: &Path, page: usize) -> Vec<lopdf::Dictionary> {
    let doc = Document::load(path).unwrap();
    let page_id = *doc.get_pages().values().nth(page).unwrap();
    let page_dict = doc.get_dictionary(page_id).unwrap();
    match page_dict.get(b"Annots") {
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_reference().ok())
            .filter_map(|id| doc.get_dictionary(id).ok().cloned())
            .collect(),
        _ => Vec::new(),
    }
}

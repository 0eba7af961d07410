//! Test PDFs generated in-process

use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// Write a PDF with `num_pages` pages labelled `<label>-Page-<n>`.
pub fn write_pdf(dir: &Path, label: &str, num_pages: u32) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = (1..=num_pages)
        .map(|page_num| {
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
            Object::Reference(page_id)
        })
        .collect();

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

    let path = dir.join(format!("{}.pdf", label));
    doc.save(&path).unwrap();
    path
}

/// Decoded content of every page, in page order.
pub fn page_texts(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned())
        .collect()
}

/// Number of annotations on each page, in page order.
pub fn annotation_counts(path: &Path) -> Vec<usize> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| match doc.get_dictionary(page_id).unwrap().get(b"Annots") {
            Ok(Object::Array(items)) => items.len(),
            _ => 0,
        })
        .collect()
}

//! Scratch PDFs for the window-state tests.

use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// Writes `<dir>/<name>` with `pages` blank Letter pages.
pub(crate) fn write_pdf(dir: &Path, name: &str, pages: u32) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, b"".to_vec()));
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }))
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => pages as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

pub(crate) fn page_total(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

pub(crate) fn annotation_total(path: &Path) -> usize {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| match doc.get_dictionary(page_id).unwrap().get(b"Annots") {
            Ok(Object::Array(items)) => items.len(),
            _ => 0,
        })
        .sum()
}

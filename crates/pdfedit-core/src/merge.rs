//! PDF Merge
//!
//! Appends the pages of several source documents into a fresh document.
//!
//! The algorithm:
//! 1. Validate every input path before opening anything
//! 2. Load all sources; any failure aborts the merge
//! 3. For each source:
//!    a. Copy inherited page attributes onto the pages themselves
//!    b. Shift object IDs past the objects already in the destination
//!    c. Import every object except the old catalog and page tree nodes
//! 4. Build a new page tree from the selected pages, in order
//! 5. Serialize in memory, then write the destination file in one go

use crate::error::MergeError;
use crate::page_tree;
use lopdf::{dictionary, Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One page of one source document, both zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    pub source: usize,
    pub page: usize,
}

impl PageRef {
    pub fn new(source: usize, page: usize) -> Self {
        Self { source, page }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub files: usize,
    pub pages: usize,
}

/// Merge whole documents, in order, into `output`.
pub fn merge_pdfs<P: AsRef<Path>>(
    inputs: &[P],
    output: impl AsRef<Path>,
) -> Result<MergeSummary, MergeError> {
    if inputs.is_empty() {
        return Err(MergeError::NoInputFiles);
    }
    if inputs.len() < 2 {
        return Err(MergeError::InsufficientFiles);
    }

    let paths = validate_inputs(inputs)?;
    let documents = load_all(&paths)?;

    let selection: Vec<PageRef> = documents
        .iter()
        .enumerate()
        .flat_map(|(source, doc)| {
            (0..doc.get_pages().len()).map(move |page| PageRef::new(source, page))
        })
        .collect();

    let mut merged = assemble(documents, &selection)?;
    let output = output.as_ref();
    write_document(&mut merged, output)?;

    info!(
        files = paths.len(),
        pages = selection.len(),
        output = %output.display(),
        "merged PDF files"
    );
    Ok(MergeSummary {
        files: paths.len(),
        pages: selection.len(),
    })
}

/// Build `output` from an ordered selection of pages drawn from `sources`.
///
/// A page may be selected more than once; later selections get a copy.
pub fn merge_pages<P: AsRef<Path>>(
    sources: &[P],
    pages: &[PageRef],
    output: impl AsRef<Path>,
) -> Result<MergeSummary, MergeError> {
    if sources.is_empty() {
        return Err(MergeError::NoInputFiles);
    }
    if pages.is_empty() {
        return Err(MergeError::NoPagesSelected);
    }

    let paths = validate_inputs(sources)?;
    let documents = load_all(&paths)?;
    let mut merged = assemble(documents, pages)?;
    let output = output.as_ref();
    write_document(&mut merged, output)?;

    info!(
        files = paths.len(),
        pages = pages.len(),
        output = %output.display(),
        "wrote selected pages"
    );
    Ok(MergeSummary {
        files: paths.len(),
        pages: pages.len(),
    })
}

/// Number of pages in the PDF at `path`.
pub fn page_count(path: impl AsRef<Path>) -> Result<usize, MergeError> {
    let path = path.as_ref();
    let paths = validate_inputs(&[path])?;
    let doc = load(&paths[0])?;
    Ok(doc.get_pages().len())
}

fn validate_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>, MergeError> {
    inputs
        .iter()
        .map(|input| {
            let path = input.as_ref();
            if !path.exists() {
                return Err(MergeError::FileNotFound(path.to_path_buf()));
            }
            if !crate::has_pdf_extension(path) {
                return Err(MergeError::NotAPdf(path.to_path_buf()));
            }
            Ok(path.to_path_buf())
        })
        .collect()
}

fn load(path: &Path) -> Result<Document, MergeError> {
    Document::load(path).map_err(|e| MergeError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn load_all(paths: &[PathBuf]) -> Result<Vec<Document>, MergeError> {
    paths
        .iter()
        .map(|path| {
            let doc = load(path)?;
            info!(path = %path.display(), pages = doc.get_pages().len(), "loaded source");
            Ok(doc)
        })
        .collect()
}

fn is_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type"),
            Ok(Object::Name(name)) if name == b"Catalog" || name == b"Pages"
        ),
        _ => false,
    }
}

fn assemble(sources: Vec<Document>, selection: &[PageRef]) -> Result<Document, MergeError> {
    let mut merged = Document::with_version("1.5");
    let pages_id = merged.new_object_id();
    let mut source_pages: Vec<Vec<ObjectId>> = Vec::with_capacity(sources.len());

    for mut source in sources {
        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        for &page_id in &page_ids {
            page_tree::materialize_inherited(&mut source, page_id);
        }

        if source.version > merged.version {
            merged.version = source.version.clone();
        }

        let offset = merged.max_id;
        for (id, object) in source.objects {
            if is_tree_node(&object) {
                continue;
            }
            merged
                .objects
                .insert((id.0 + offset, id.1), remap_object_refs(object, offset));
        }
        merged.max_id = merged.max_id.max(source.max_id + offset);
        source_pages.push(
            page_ids
                .into_iter()
                .map(|(number, generation)| (number + offset, generation))
                .collect(),
        );
    }

    let mut used = HashSet::new();
    let mut kids = Vec::with_capacity(selection.len());
    for page_ref in selection {
        let pages = source_pages
            .get(page_ref.source)
            .ok_or(MergeError::UnknownSource(page_ref.source))?;
        let &page_id = pages
            .get(page_ref.page)
            .ok_or(MergeError::PageOutOfRange {
                source_index: page_ref.source,
                page: page_ref.page,
                total: pages.len(),
            })?;

        let page_id = if used.insert(page_id) {
            page_id
        } else {
            duplicate_page(&mut merged, page_id)?
        };
        merged
            .get_dictionary_mut(page_id)
            .map_err(|e| MergeError::Processing(format!("Invalid page object: {}", e)))?
            .set("Parent", Object::Reference(pages_id));
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    merged.trailer.set("Root", Object::Reference(catalog_id));

    Ok(merged)
}

/// Copy a page dictionary, giving it its own copies of its annotations.
fn duplicate_page(doc: &mut Document, page_id: ObjectId) -> Result<ObjectId, MergeError> {
    let mut page = doc
        .get_dictionary(page_id)
        .map_err(|e| MergeError::Processing(format!("Invalid page object: {}", e)))?
        .clone();
    let copy_id = doc.new_object_id();

    if let Ok(Object::Array(annots)) = page.get(b"Annots") {
        let annots = annots.clone();
        let mut copies = Vec::with_capacity(annots.len());
        for annot in annots {
            let Ok(annot_id) = annot.as_reference() else {
                copies.push(annot);
                continue;
            };
            let Ok(mut annot_dict) = doc.get_dictionary(annot_id).cloned() else {
                continue;
            };
            annot_dict.set("P", Object::Reference(copy_id));
            copies.push(Object::Reference(doc.add_object(annot_dict)));
        }
        page.set("Annots", Object::Array(copies));
    }

    doc.objects.insert(copy_id, Object::Dictionary(page));
    Ok(copy_id)
}

/// Recursively shift object references by `offset`.
fn remap_object_refs(object: Object, offset: u32) -> Object {
    match object {
        Object::Reference((number, generation)) => Object::Reference((number + offset, generation)),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|item| remap_object_refs(item, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            remap_dictionary(&mut dict, offset);
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            remap_dictionary(&mut stream.dict, offset);
            Object::Stream(stream)
        }
        other => other,
    }
}

fn remap_dictionary(dict: &mut lopdf::Dictionary, offset: u32) {
    for (_, value) in dict.iter_mut() {
        let taken = std::mem::replace(value, Object::Null);
        *value = remap_object_refs(taken, offset);
    }
}

fn write_document(doc: &mut Document, output: &Path) -> Result<(), MergeError> {
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| MergeError::Processing(format!("Failed to serialize PDF: {}", e)))?;

    fs::write(output, buffer).map_err(|e| MergeError::Save {
        path: output.to_path_buf(),
        reason: e.to_string(),
    })
}

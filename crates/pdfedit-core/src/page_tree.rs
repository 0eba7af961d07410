//! Page tree helpers shared by merging and annotating.

use lopdf::{Document, Object, ObjectId};

/// Attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, used when a page tree carries no MediaBox at all.
pub(crate) const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

// Guards against Parent cycles in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Look up `key` on the page, then on each ancestor.
pub(crate) fn find_inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node_id = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

/// Copy inherited attributes onto the page itself so it can be re-parented.
pub(crate) fn materialize_inherited(doc: &mut Document, page_id: ObjectId) {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return;
    };
    let parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let missing: Vec<&[u8]> = INHERITABLE_KEYS
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();

    let Some(parent) = parent else {
        return;
    };
    let found: Vec<(&[u8], Object)> = missing
        .into_iter()
        .filter_map(|key| find_inherited(doc, parent, key).map(|value| (key, value)))
        .collect();

    if let Ok(page) = doc.get_dictionary_mut(page_id) {
        for (key, value) in found {
            page.set(key.to_vec(), value);
        }
    }
}

/// Follow a single indirect reference.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

pub(crate) fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(v) => Some(*v as f32),
        Object::Real(v) => Some(*v),
        _ => None,
    }
}

/// A page box such as `MediaBox` or `CropBox`, inherited and normalized.
fn page_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<[f32; 4]> {
    let value = find_inherited(doc, page_id, key)?;
    let Object::Array(items) = resolve(doc, &value) else {
        return None;
    };
    let coords: Vec<f32> = items
        .iter()
        .filter_map(|item| number(resolve(doc, item)))
        .collect();
    match coords.as_slice() {
        [x0, y0, x1, y1] => Some([x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)]),
        _ => None,
    }
}

/// The page's MediaBox as `[llx, lly, urx, ury]`.
pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    page_box(doc, page_id, b"MediaBox").unwrap_or(DEFAULT_MEDIA_BOX)
}

/// The visible page area: the CropBox clipped to the MediaBox. Falls back to
/// the MediaBox when there is no CropBox or the two do not overlap.
pub(crate) fn crop_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let media = media_box(doc, page_id);
    let Some(crop) = page_box(doc, page_id, b"CropBox") else {
        return media;
    };
    let clipped = [
        crop[0].max(media[0]),
        crop[1].max(media[1]),
        crop[2].min(media[2]),
        crop[3].min(media[3]),
    ];
    if clipped[0] < clipped[2] && clipped[1] < clipped[3] {
        clipped
    } else {
        media
    }
}

//! Annotation session over one open PDF document
//!
//! Positions are page coordinates: origin at the top-left of the visible
//! page area (the CropBox, clipped to the MediaBox), y growing downwards, in
//! points. They are converted to PDF user space when
//! the annotation is written.

use crate::annotation::{AnnotationKind, AnnotationRecord, PageRect, Point, Rgb, ShapeStyle};
use crate::appearance;
use crate::error::AnnotateError;
use crate::page_tree;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Icon used for sticky notes when none is given.
pub const DEFAULT_NOTE_ICON: &str = "Comment";

const NOTE_SIZE: f32 = 20.0;
const FONT_RESOURCE: &str = "PdfEditHelv";
const LINE_SPACING: f32 = 1.2;

/// Annotation flag: print the annotation with the page.
const PRINT_FLAG: i64 = 4;

pub struct AnnotationSession {
    path: PathBuf,
    doc: Option<Document>,
    font_id: Option<ObjectId>,
    // Pages whose original content has been wrapped in q/Q.
    wrapped_pages: HashSet<ObjectId>,
}

impl AnnotationSession {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AnnotateError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AnnotateError::FileNotFound(path.to_path_buf()));
        }
        let doc = Document::load(path).map_err(|e| AnnotateError::Open(e.to_string()))?;
        debug!(path = %path.display(), pages = doc.get_pages().len(), "opened for annotation");

        Ok(Self {
            path: path.to_path_buf(),
            doc: Some(doc),
            font_id: None,
            wrapped_pages: HashSet::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.doc.is_none()
    }

    pub fn page_count(&self) -> Result<usize, AnnotateError> {
        Ok(self.document()?.get_pages().len())
    }

    fn document(&self) -> Result<&Document, AnnotateError> {
        self.doc.as_ref().ok_or(AnnotateError::Closed)
    }

    fn document_mut(&mut self) -> Result<&mut Document, AnnotateError> {
        self.doc.as_mut().ok_or(AnnotateError::Closed)
    }

    /// Object id of the zero-based page, or `InvalidPage`.
    fn page_id(&self, page: usize) -> Result<ObjectId, AnnotateError> {
        let pages = self.document()?.get_pages();
        let total = pages.len();
        pages
            .into_values()
            .nth(page)
            .ok_or(AnnotateError::InvalidPage { page, total })
    }

    /// Sticky note with the given icon name, anchored at its top-left corner.
    pub fn add_text_annotation(
        &mut self,
        page: usize,
        position: Point,
        text: &str,
        icon: Option<&str>,
    ) -> Result<(), AnnotateError> {
        let kind = AnnotationKind::TextNote;
        let page_id = self.page_id(page)?;
        let doc = self.document_mut()?;

        let (x, y) = to_user_point(doc, page_id, position);
        let mut annot = base_annotation("Text", [x, y - NOTE_SIZE, x + NOTE_SIZE, y], page_id);
        annot.set("Contents", text_string(text));
        annot.set(
            "Name",
            Object::Name(icon.unwrap_or(DEFAULT_NOTE_ICON).as_bytes().to_vec()),
        );
        annot.set("C", color_array(kind.default_color()));
        annot.set("Open", Object::Boolean(false));

        attach(doc, page_id, annot).map_err(|e| apply_error(kind, e))?;
        debug!(page, "added text annotation");
        Ok(())
    }

    pub fn add_highlight(&mut self, page: usize, rect: PageRect, color: Rgb) -> Result<(), AnnotateError> {
        self.add_markup(AnnotationKind::Highlight, page, rect, color)
    }

    pub fn add_underline(&mut self, page: usize, rect: PageRect, color: Rgb) -> Result<(), AnnotateError> {
        self.add_markup(AnnotationKind::Underline, page, rect, color)
    }

    pub fn add_strikeout(&mut self, page: usize, rect: PageRect, color: Rgb) -> Result<(), AnnotateError> {
        self.add_markup(AnnotationKind::Strikeout, page, rect, color)
    }

    fn add_markup(
        &mut self,
        kind: AnnotationKind,
        page: usize,
        rect: PageRect,
        color: Rgb,
    ) -> Result<(), AnnotateError> {
        let page_id = self.page_id(page)?;
        let doc = self.document_mut()?;
        let color = color.clamped();

        let user = to_user_rect(doc, page_id, rect);
        let (width, height) = (user[2] - user[0], user[3] - user[1]);
        let (subtype, content) = match kind {
            AnnotationKind::Highlight => ("Highlight", appearance::highlight(width, height, color)),
            AnnotationKind::Underline => ("Underline", appearance::underline(width, height, color)),
            _ => ("StrikeOut", appearance::strikeout(width, height, color)),
        };
        let content = content.map_err(|e| apply_error(kind, e))?;

        let mut resources = Dictionary::new();
        if kind == AnnotationKind::Highlight {
            resources.set(
                "ExtGState",
                dictionary! {
                    appearance::MULTIPLY_STATE => dictionary! {
                        "Type" => "ExtGState",
                        "BM" => "Multiply",
                    },
                },
            );
        }

        let mut annot = base_annotation(subtype, user, page_id);
        annot.set("C", color_array(color));
        // Upper-left, upper-right, lower-left, lower-right.
        annot.set(
            "QuadPoints",
            real_array(&[user[0], user[3], user[2], user[3], user[0], user[1], user[2], user[1]]),
        );
        let appearance_id = form_xobject(doc, width, height, resources, content);
        annot.set("AP", dictionary! { "N" => Object::Reference(appearance_id) });

        attach(doc, page_id, annot).map_err(|e| apply_error(kind, e))?;
        debug!(page, kind = kind.noun(), "added markup");
        Ok(())
    }

    pub fn add_rectangle(&mut self, page: usize, rect: PageRect, style: ShapeStyle) -> Result<(), AnnotateError> {
        self.add_shape(AnnotationKind::Rectangle, page, rect, style)
    }

    /// Ellipse inscribed in `rect`.
    pub fn add_circle(&mut self, page: usize, rect: PageRect, style: ShapeStyle) -> Result<(), AnnotateError> {
        self.add_shape(AnnotationKind::Circle, page, rect, style)
    }

    fn add_shape(
        &mut self,
        kind: AnnotationKind,
        page: usize,
        rect: PageRect,
        style: ShapeStyle,
    ) -> Result<(), AnnotateError> {
        let page_id = self.page_id(page)?;
        let doc = self.document_mut()?;
        let style = ShapeStyle {
            stroke: style.stroke.clamped(),
            fill: style.fill.map(Rgb::clamped),
            width: style.width.max(0.0),
        };

        let user = to_user_rect(doc, page_id, rect);
        let (width, height) = (user[2] - user[0], user[3] - user[1]);
        let (subtype, content) = match kind {
            AnnotationKind::Circle => ("Circle", appearance::ellipse(width, height, &style)),
            _ => ("Square", appearance::rectangle(width, height, &style)),
        };
        let content = content.map_err(|e| apply_error(kind, e))?;

        let mut annot = base_annotation(subtype, user, page_id);
        annot.set("C", color_array(style.stroke));
        if let Some(fill) = style.fill {
            annot.set("IC", color_array(fill));
        }
        annot.set(
            "BS",
            dictionary! {
                "W" => Object::Real(style.width),
                "S" => "S",
            },
        );
        let appearance_id = form_xobject(doc, width, height, Dictionary::new(), content);
        annot.set("AP", dictionary! { "N" => Object::Reference(appearance_id) });

        attach(doc, page_id, annot).map_err(|e| apply_error(kind, e))?;
        debug!(page, kind = kind.noun(), "added shape");
        Ok(())
    }

    /// Draw text into the page content with Helvetica. `position` is the
    /// baseline start of the first line.
    pub fn add_freehand_text(
        &mut self,
        page: usize,
        position: Point,
        text: &str,
        font_size: f32,
        color: Rgb,
    ) -> Result<(), AnnotateError> {
        let kind = AnnotationKind::FreehandText;
        let page_id = self.page_id(page)?;
        let doc = self.doc.as_mut().ok_or(AnnotateError::Closed)?;

        let (font_id, fresh_font) = match self.font_id {
            Some(id) => (id, false),
            None => (
                doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                    "Encoding" => "WinAnsiEncoding",
                }),
                true,
            ),
        };
        let run = TextRun {
            position,
            text,
            size: font_size,
            color: color.clamped(),
        };
        let isolate = !self.wrapped_pages.contains(&page_id);
        if let Err(e) = draw_text(doc, page_id, font_id, &run, isolate) {
            if fresh_font {
                doc.objects.remove(&font_id);
            }
            return Err(apply_error(kind, e));
        }

        // Session state only records text that actually reached the page.
        self.font_id = Some(font_id);
        self.wrapped_pages.insert(page_id);
        debug!(page, font_size, "added freehand text");
        Ok(())
    }

    pub fn add_record(&mut self, record: &AnnotationRecord) -> Result<(), AnnotateError> {
        match record.kind {
            AnnotationKind::TextNote => {
                self.add_text_annotation(record.page, record.position, &record.text, None)
            }
            AnnotationKind::Highlight => self.add_highlight(record.page, record.rect(), record.color),
            AnnotationKind::Underline => self.add_underline(record.page, record.rect(), record.color),
            AnnotationKind::Strikeout => self.add_strikeout(record.page, record.rect(), record.color),
            AnnotationKind::Rectangle => {
                self.add_rectangle(record.page, record.rect(), record.shape_style())
            }
            AnnotationKind::Circle => self.add_circle(record.page, record.rect(), record.shape_style()),
            AnnotationKind::FreehandText => self.add_freehand_text(
                record.page,
                record.position,
                &record.text,
                record.font_size(),
                record.color,
            ),
        }
    }

    /// Apply every record, after checking all of their pages.
    pub fn add_batch(&mut self, records: &[AnnotationRecord]) -> Result<usize, AnnotateError> {
        let total = self.page_count()?;
        if let Some(record) = records.iter().find(|record| record.page >= total) {
            return Err(AnnotateError::InvalidPage {
                page: record.page,
                total,
            });
        }
        for record in records {
            self.add_record(record)?;
        }
        Ok(records.len())
    }

    /// Write the document, annotations included, to `output`.
    pub fn save(&mut self, output: impl AsRef<Path>) -> Result<(), AnnotateError> {
        let output = output.as_ref();
        let doc = self.document_mut()?;

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| AnnotateError::Save(e.to_string()))?;
        fs::write(output, buffer).map_err(|e| AnnotateError::Save(e.to_string()))?;

        info!(source = %self.path.display(), output = %output.display(), "saved annotated PDF");
        Ok(())
    }

    /// Release the document. Later calls are no-ops.
    pub fn close(&mut self) {
        if self.doc.take().is_some() {
            self.font_id = None;
            self.wrapped_pages.clear();
            debug!(path = %self.path.display(), "closed annotation session");
        }
    }
}

impl Drop for AnnotationSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for AnnotationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationSession")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn apply_error(kind: AnnotationKind, error: impl std::fmt::Display) -> AnnotateError {
    AnnotateError::Apply {
        kind: kind.noun(),
        reason: error.to_string(),
    }
}

fn to_user_point(doc: &Document, page_id: ObjectId, point: Point) -> (f32, f32) {
    let [left, _, _, top] = page_tree::crop_box(doc, page_id);
    (left + point.x, top - point.y)
}

fn to_user_rect(doc: &Document, page_id: ObjectId, rect: PageRect) -> [f32; 4] {
    let [left, _, _, top] = page_tree::crop_box(doc, page_id);
    [left + rect.x0, top - rect.y1, left + rect.x1, top - rect.y0]
}

fn real_array(values: &[f32]) -> Object {
    Object::Array(values.iter().map(|v| Object::Real(*v)).collect())
}

fn color_array(color: Rgb) -> Object {
    real_array(&color.components())
}

/// PDF text string: literal bytes for ASCII, UTF-16BE with a BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Single-byte text for a WinAnsi font; characters outside the encoding
/// become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    let mut buf = [0u8; 4];
    text.chars()
        .map(|c| {
            match Document::encode_text(Some("WinAnsiEncoding"), c.encode_utf8(&mut buf)).as_slice() {
                [byte] => *byte,
                _ => b'?',
            }
        })
        .collect()
}

fn base_annotation(subtype: &str, rect: [f32; 4], page_id: ObjectId) -> Dictionary {
    let mut annot = Dictionary::new();
    annot.set("Type", Object::Name(b"Annot".to_vec()));
    annot.set("Subtype", Object::Name(subtype.as_bytes().to_vec()));
    annot.set("Rect", real_array(&rect));
    annot.set("F", Object::Integer(PRINT_FLAG));
    annot.set("P", Object::Reference(page_id));
    annot
}

fn form_xobject(
    doc: &mut Document,
    width: f32,
    height: f32,
    resources: Dictionary,
    content: Vec<u8>,
) -> ObjectId {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => real_array(&[0.0, 0.0, width, height]),
        "Resources" => resources,
    };
    doc.add_object(Stream::new(dict, content))
}

/// Add the annotation object and reference it from the page's Annots array.
fn attach(doc: &mut Document, page_id: ObjectId, annot: Dictionary) -> lopdf::Result<ObjectId> {
    let annots_ref = match doc.get_dictionary(page_id)?.get(b"Annots") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };
    let annot_id = doc.add_object(Object::Dictionary(annot));

    if let Some(array_id) = annots_ref {
        if let Ok(Object::Array(items)) = doc.get_object_mut(array_id) {
            items.push(Object::Reference(annot_id));
            return Ok(annot_id);
        }
    }

    let page = doc.get_dictionary_mut(page_id)?;
    if let Ok(Object::Array(items)) = page.get_mut(b"Annots") {
        items.push(Object::Reference(annot_id));
    } else {
        page.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
    }
    Ok(annot_id)
}

fn inline_dictionary(doc: &Document, object: Option<&Object>) -> Dictionary {
    match object.map(|object| page_tree::resolve(doc, object)) {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    }
}

/// Make the shared Helvetica font available in the page's resources and
/// return its resource name.
fn register_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> lopdf::Result<String> {
    let inherited = page_tree::find_inherited(doc, page_id, b"Resources");
    let mut resources = inline_dictionary(doc, inherited.as_ref());
    let mut fonts = inline_dictionary(doc, resources.get(b"Font").ok());

    let existing = fonts
        .iter()
        .find(|(_, value)| matches!(value, Object::Reference(id) if *id == font_id))
        .map(|(key, _)| String::from_utf8_lossy(key).into_owned());
    if let Some(name) = existing {
        return Ok(name);
    }

    let mut name = FONT_RESOURCE.to_string();
    let mut suffix = 1;
    while fonts.has(name.as_bytes()) {
        name = format!("{}{}", FONT_RESOURCE, suffix);
        suffix += 1;
    }
    fonts.set(name.clone(), Object::Reference(font_id));
    resources.set("Font", fonts);
    doc.get_dictionary_mut(page_id)?.set("Resources", resources);
    Ok(name)
}

struct TextRun<'a> {
    position: Point,
    text: &'a str,
    size: f32,
    color: Rgb,
}

/// Register the font on the page and append a content stream drawing `run`.
fn draw_text(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    run: &TextRun<'_>,
    isolate: bool,
) -> lopdf::Result<()> {
    let font_name = register_font(doc, page_id, font_id)?;
    let origin = to_user_point(doc, page_id, run.position);
    let content = Content {
        operations: text_operations(&font_name, run, origin),
    }
    .encode()?;
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), content));
    append_content(doc, page_id, stream_id, isolate)
}

fn text_operations(font: &str, run: &TextRun<'_>, (x, y): (f32, f32)) -> Vec<Operation> {
    let size = run.size;
    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("rg", run.color.components().iter().map(|c| Object::Real(*c)).collect()),
        Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), Object::Real(size)]),
        Operation::new("TL", vec![Object::Real(size * LINE_SPACING)]),
        Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
    ];
    for (index, line) in run.text.lines().enumerate() {
        if index > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(line), StringFormat::Literal)],
        ));
    }
    operations.push(Operation::new("ET", vec![]));
    operations.push(Operation::new("Q", vec![]));
    operations
}

/// Append a content stream to the page. With `isolate`, the existing content
/// is first wrapped in q/Q so its graphics state cannot leak into ours.
fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    stream_id: ObjectId,
    isolate: bool,
) -> lopdf::Result<()> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        _ => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 3);
    if isolate && !existing.is_empty() {
        let push = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let pop = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        contents.push(Object::Reference(push));
        contents.extend(existing);
        contents.push(Object::Reference(pop));
    } else {
        contents.extend(existing);
    }
    contents.push(Object::Reference(stream_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_tree::number;
    use crate::test_support::{annotations, page_texts, write_pdf};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn name(dict: &Dictionary, key: &[u8]) -> String {
        match dict.get(key).unwrap() {
            Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
            other => panic!("expected name, got {:?}", other),
        }
    }

    fn numbers(dict: &Dictionary, key: &[u8]) -> Vec<f32> {
        match dict.get(key).unwrap() {
            Object::Array(items) => items.iter().filter_map(number).collect(),
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = AnnotationSession::open(dir.path().join("nonexistent.pdf")).unwrap_err();
        assert!(matches!(err, AnnotateError::FileNotFound(_)));
        assert!(err.to_string().contains("PDF file not found"));
    }

    #[test]
    fn test_open_garbage_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();
        let err = AnnotationSession::open(&path).unwrap_err();
        assert!(matches!(err, AnnotateError::Open(_)));
    }

    #[test]
    fn test_text_note_uses_top_left_page_coordinates() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "note.pdf", 1);
        let output = dir.path().join("out.pdf");

        let mut session = AnnotationSession::open(&input).unwrap();
        session
            .add_text_annotation(0, Point::new(10.0, 20.0), "Review this", None)
            .unwrap();
        session.save(&output).unwrap();

        let annots = annotations(&output, 0);
        assert_eq!(annots.len(), 1);
        assert_eq!(name(&annots[0], b"Subtype"), "Text");
        assert_eq!(name(&annots[0], b"Name"), DEFAULT_NOTE_ICON);
        assert_eq!(numbers(&annots[0], b"Rect"), vec![10.0, 752.0, 30.0, 772.0]);
        match annots[0].get(b"Contents").unwrap() {
            Object::String(bytes, _) => assert_eq!(bytes.as_slice(), b"Review this"),
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn test_text_note_custom_icon() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "icon.pdf", 1);
        let output = dir.path().join("out.pdf");

        let mut session = AnnotationSession::open(&input).unwrap();
        session
            .add_text_annotation(0, Point::new(0.0, 0.0), "Key point", Some("Key"))
            .unwrap();
        session.save(&output).unwrap();

        assert_eq!(name(&annotations(&output, 0)[0], b"Name"), "Key");
    }

    #[test]
    fn test_markup_kinds_carry_quad_points_and_appearance() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "markup.pdf", 2);
        let output = dir.path().join("out.pdf");
        let rect = PageRect::from_origin_size(100.0, 100.0, 200.0, 20.0);

        let mut session = AnnotationSession::open(&input).unwrap();
        session.add_highlight(0, rect, Rgb::YELLOW).unwrap();
        session.add_underline(0, rect, Rgb::BLUE).unwrap();
        session.add_strikeout(1, rect, Rgb::RED).unwrap();
        session.save(&output).unwrap();

        let first = annotations(&output, 0);
        let subtypes: Vec<String> = first.iter().map(|a| name(a, b"Subtype")).collect();
        assert_eq!(subtypes, vec!["Highlight", "Underline"]);
        for annot in &first {
            assert_eq!(numbers(annot, b"QuadPoints").len(), 8);
            assert!(annot.has(b"AP"));
        }
        assert_eq!(numbers(&first[0], b"Rect"), vec![100.0, 672.0, 300.0, 692.0]);
        assert_eq!(numbers(&first[1], b"C"), vec![0.0, 0.0, 1.0]);

        let second = annotations(&output, 1);
        assert_eq!(name(&second[0], b"Subtype"), "StrikeOut");
        assert_eq!(numbers(&second[0], b"C"), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shapes_record_style() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "shapes.pdf", 1);
        let output = dir.path().join("out.pdf");
        let rect = PageRect::new(50.0, 50.0, 150.0, 100.0);

        let mut session = AnnotationSession::open(&input).unwrap();
        session.add_rectangle(0, rect, ShapeStyle::default()).unwrap();
        session
            .add_circle(
                0,
                rect,
                ShapeStyle {
                    stroke: Rgb::RED,
                    fill: Some(Rgb::YELLOW),
                    width: 2.5,
                },
            )
            .unwrap();
        session.save(&output).unwrap();

        let annots = annotations(&output, 0);
        assert_eq!(name(&annots[0], b"Subtype"), "Square");
        assert!(!annots[0].has(b"IC"));
        assert_eq!(numbers(&annots[0], b"C"), vec![0.0, 0.0, 0.0]);

        assert_eq!(name(&annots[1], b"Subtype"), "Circle");
        assert_eq!(numbers(&annots[1], b"IC"), vec![1.0, 1.0, 0.0]);
        let border = annots[1].get(b"BS").unwrap().as_dict().unwrap();
        assert_eq!(number(border.get(b"W").unwrap()), Some(2.5));
    }

    #[test]
    fn test_freehand_text_lands_in_page_content() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "free.pdf", 1);
        let output = dir.path().join("out.pdf");

        let mut session = AnnotationSession::open(&input).unwrap();
        session
            .add_freehand_text(0, Point::new(72.0, 72.0), "Approved", 14.0, Rgb::BLUE)
            .unwrap();
        session
            .add_freehand_text(0, Point::new(72.0, 100.0), "Line one\nLine two", 11.0, Rgb::BLACK)
            .unwrap();
        session.save(&output).unwrap();

        let text = &page_texts(&output)[0];
        assert!(text.contains("free-Page-1"));
        assert!(text.contains("(Approved) Tj"));
        assert!(text.contains("T*"));
        assert!(text.contains(FONT_RESOURCE));
        assert!(annotations(&output, 0).is_empty());

        // Original content is wrapped exactly once: q, original, Q, then one stream per call.
        let doc = Document::load(&output).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        match doc.get_dictionary(page_id).unwrap().get(b"Contents").unwrap() {
            Object::Array(items) => assert_eq!(items.len(), 5),
            other => panic!("expected contents array, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_page_leaves_document_untouched() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "short.pdf", 2);
        let output = dir.path().join("out.pdf");
        let rect = PageRect::new(0.0, 0.0, 10.0, 10.0);

        let mut session = AnnotationSession::open(&input).unwrap();
        let err = session.add_highlight(5, rect, Rgb::YELLOW).unwrap_err();
        assert!(matches!(err, AnnotateError::InvalidPage { page: 5, total: 2 }));
        assert!(err.to_string().contains("Invalid page number"));
        assert!(session
            .add_freehand_text(2, Point::default(), "x", 11.0, Rgb::BLACK)
            .is_err());
        session.save(&output).unwrap();

        assert!(annotations(&output, 0).is_empty());
        assert!(annotations(&output, 1).is_empty());
        assert_eq!(page_texts(&output), page_texts(&input));
    }

    #[test]
    fn test_batch_checks_pages_before_applying() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "batch.pdf", 1);
        let output = dir.path().join("out.pdf");

        let records = vec![
            AnnotationRecord::text_note(0, Point::new(5.0, 5.0), "fine"),
            AnnotationRecord::text_note(3, Point::new(5.0, 5.0), "bad page"),
        ];
        let mut session = AnnotationSession::open(&input).unwrap();
        assert!(session.add_batch(&records).is_err());
        session.save(&output).unwrap();
        assert!(annotations(&output, 0).is_empty());

        let applied = session.add_batch(&records[..1]).unwrap();
        assert_eq!(applied, 1);
        session.save(&output).unwrap();
        assert_eq!(annotations(&output, 0).len(), 1);
    }

    #[test]
    fn test_record_dispatch_covers_every_kind() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "kinds.pdf", 1);
        let output = dir.path().join("out.pdf");
        let rect = PageRect::from_origin_size(20.0, 20.0, 100.0, 50.0);

        let mut session = AnnotationSession::open(&input).unwrap();
        for kind in AnnotationKind::ALL {
            let record = if kind.is_point_based() {
                AnnotationRecord::new(kind, 0, rect.origin()).with_text("hello")
            } else {
                AnnotationRecord::area(kind, 0, rect)
            };
            session.add_record(&record).unwrap();
        }
        session.save(&output).unwrap();

        // Freehand text is page content rather than an annotation.
        assert_eq!(annotations(&output, 0).len(), AnnotationKind::ALL.len() - 1);
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_operations() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "close.pdf", 1);

        let mut session = AnnotationSession::open(&input).unwrap();
        session.close();
        session.close();
        assert!(session.is_closed());
        assert!(matches!(
            session.add_text_annotation(0, Point::default(), "late", None),
            Err(AnnotateError::Closed)
        ));
        assert!(matches!(
            session.save(dir.path().join("out.pdf")),
            Err(AnnotateError::Closed)
        ));
    }

    #[test]
    fn test_save_can_run_repeatedly() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "twice.pdf", 1);
        let first = dir.path().join("first.pdf");
        let second = dir.path().join("second.pdf");

        let mut session = AnnotationSession::open(&input).unwrap();
        session.add_text_annotation(0, Point::default(), "one", None).unwrap();
        session.save(&first).unwrap();
        session.add_text_annotation(0, Point::default(), "two", None).unwrap();
        session.save(&second).unwrap();

        assert_eq!(annotations(&first, 0).len(), 1);
        assert_eq!(annotations(&second, 0).len(), 2);
    }

    #[test]
    fn test_non_ascii_note_is_utf16() {
        match text_string("Größe") {
            Object::String(bytes, _) => assert_eq!(&bytes[..2], &[0xFE, 0xFF]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_freehand_text_uses_win_ansi_code_points() {
        assert_eq!(win_ansi("é€"), vec![0xE9, 0x80]);
        assert_eq!(win_ansi("\u{2018}x\u{2019}"), vec![0x91, b'x', 0x92]);
        assert_eq!(win_ansi("a中b"), vec![b'a', b'?', b'b']);

        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "ansi.pdf", 1);
        let output = dir.path().join("out.pdf");
        let mut session = AnnotationSession::open(&input).unwrap();
        session
            .add_freehand_text(0, Point::new(72.0, 72.0), "Total 5€ “ok”", 12.0, Rgb::BLACK)
            .unwrap();
        session.save(&output).unwrap();

        let doc = Document::load(&output).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let shown: Vec<Vec<u8>> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect();
        assert!(shown.contains(&b"Total 5\x80 \x93ok\x94".to_vec()));
    }

    #[test]
    fn test_positions_are_relative_to_crop_box() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "cropped.pdf", 1);
        let mut doc = Document::load(&input).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("CropBox", vec![0.into(), 0.into(), 612.into(), 600.into()]);
        doc.save(&input).unwrap();
        let output = dir.path().join("out.pdf");

        let mut session = AnnotationSession::open(&input).unwrap();
        session
            .add_text_annotation(0, Point::new(10.0, 10.0), "near the top", None)
            .unwrap();
        session
            .add_highlight(0, PageRect::new(10.0, 10.0, 110.0, 30.0), Rgb::YELLOW)
            .unwrap();
        session.save(&output).unwrap();

        let annots = annotations(&output, 0);
        assert_eq!(numbers(&annots[0], b"Rect"), vec![10.0, 570.0, 30.0, 590.0]);
        assert_eq!(numbers(&annots[1], b"Rect"), vec![10.0, 570.0, 110.0, 590.0]);
    }

    #[test]
    fn test_failed_freehand_text_keeps_session_clean() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "state.pdf", 1);

        let mut session = AnnotationSession::open(&input).unwrap();
        let objects_before = session.document().unwrap().objects.len();
        assert!(session
            .add_freehand_text(3, Point::default(), "nowhere", 11.0, Rgb::BLACK)
            .is_err());
        assert_eq!(session.font_id, None);
        assert!(session.wrapped_pages.is_empty());
        assert_eq!(session.document().unwrap().objects.len(), objects_before);

        session
            .add_freehand_text(0, Point::new(10.0, 10.0), "here", 11.0, Rgb::BLACK)
            .unwrap();
        assert!(session.font_id.is_some());
        assert_eq!(session.wrapped_pages.len(), 1);
    }
}

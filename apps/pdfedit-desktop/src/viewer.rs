//! Page viewer: rasterizes one page with Pdfium and draws pending annotations over it.
//!
//! Page coordinates are points from the top-left corner of the page. The
//! viewer converts between them and screen positions with the current zoom.

use eframe::egui::{self, Color32, Pos2, Rect, Vec2};
use pdfedit_core::{AnnotationKind, AnnotationRecord, PageRect, Point, Rgb};
use pdfium_render::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
/// Zoom used when the page reports a zero dimension.
pub const FALLBACK_ZOOM: f32 = 1.5;
/// Space kept free around the page.
pub const VIEW_PADDING: f32 = 20.0;

const MARKER_DIAMETER: f32 = 8.0;
const MIN_DRAG: f32 = 2.0;
const MAX_CACHED_TEXTURES: usize = 32;
const LETTER: Vec2 = Vec2::new(612.0, 792.0);

/// Largest zoom at which the page fits the available area, within [MIN_ZOOM, MAX_ZOOM].
/// An axis with no usable page size contributes FALLBACK_ZOOM instead.
pub fn fit_zoom(avail_w: f32, avail_h: f32, page_w: f32, page_h: f32) -> f32 {
    let axis = |avail: f32, page: f32| if page > 0.0 { avail / page } else { FALLBACK_ZOOM };
    let zoom = axis(avail_w, page_w).min(axis(avail_h, page_h));
    if zoom.is_nan() {
        return MIN_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

pub fn screen_to_page(origin: Pos2, screen: Pos2, zoom: f32) -> Point {
    Point::new((screen.x - origin.x) / zoom, (screen.y - origin.y) / zoom)
}

pub fn page_to_screen(origin: Pos2, point: Point, zoom: f32) -> Pos2 {
    Pos2::new(origin.x + point.x * zoom, origin.y + point.y * zoom)
}

fn color32(color: Rgb, alpha: u8) -> Color32 {
    let [r, g, b] = color.clamped().components();
    let channel = |value: f32| (value * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(channel(r), channel(g), channel(b), alpha)
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Page preview unavailable: the Pdfium library could not be loaded")]
    Unavailable,

    #[error("Failed to render {}: {reason}", path.display())]
    Pdfium { path: PathBuf, reason: String },

    #[error("Page {} not found in {}", page + 1, path.display())]
    PageMissing { path: PathBuf, page: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TextureKey {
    path: PathBuf,
    page: usize,
    // Zoom in thousandths so the key stays hashable.
    zoom: u32,
}

/// Pdfium handle plus caches of page sizes and rendered textures.
pub struct PageRenderer {
    pdfium: Option<Pdfium>,
    sizes: HashMap<(PathBuf, usize), Vec2>,
    textures: HashMap<TextureKey, egui::TextureHandle>,
}

impl PageRenderer {
    pub fn new(pdfium_dir: Option<&Path>) -> Self {
        let bindings = match pdfium_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                .or_else(|_| Pdfium::bind_to_system_library()),
            None => Pdfium::bind_to_system_library(),
        };
        let pdfium = match bindings {
            Ok(bindings) => Some(Pdfium::new(bindings)),
            Err(e) => {
                warn!(error = %e, "Pdfium not available, page previews disabled");
                None
            }
        };
        Self {
            pdfium,
            sizes: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.pdfium.is_some()
    }

    fn pdfium(&self) -> Result<&Pdfium, RenderError> {
        self.pdfium.as_ref().ok_or(RenderError::Unavailable)
    }

    /// Page size in points.
    pub fn page_size(&mut self, path: &Path, page: usize) -> Result<Vec2, RenderError> {
        let key = (path.to_path_buf(), page);
        if let Some(size) = self.sizes.get(&key) {
            return Ok(*size);
        }

        let size = {
            let document = self
                .pdfium()?
                .load_pdf_from_file(path, None)
                .map_err(|e| pdfium_error(path, e))?;
            let pdf_page = document
                .pages()
                .iter()
                .nth(page)
                .ok_or_else(|| RenderError::PageMissing {
                    path: path.to_path_buf(),
                    page,
                })?;
            let size = Vec2::new(pdf_page.width().value, pdf_page.height().value);
            size
        };

        self.sizes.insert(key, size);
        Ok(size)
    }

    pub fn texture(
        &mut self,
        ctx: &egui::Context,
        path: &Path,
        page: usize,
        zoom: f32,
    ) -> Result<egui::TextureHandle, RenderError> {
        let key = TextureKey {
            path: path.to_path_buf(),
            page,
            zoom: (zoom * 1000.0).round() as u32,
        };
        if let Some(texture) = self.textures.get(&key) {
            return Ok(texture.clone());
        }

        let rgba: image::RgbaImage = {
            let document = self
                .pdfium()?
                .load_pdf_from_file(path, None)
                .map_err(|e| pdfium_error(path, e))?;
            let pdf_page = document
                .pages()
                .iter()
                .nth(page)
                .ok_or_else(|| RenderError::PageMissing {
                    path: path.to_path_buf(),
                    page,
                })?;
            let config = PdfRenderConfig::new().scale_page_by_factor(zoom);
            let bitmap = pdf_page
                .render_with_config(&config)
                .map_err(|e| pdfium_error(path, e))?;
            let rgba = bitmap.as_image().to_rgba8();
            rgba
        };

        let size = [rgba.width() as usize, rgba.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        let texture = ctx.load_texture(
            format!("{}#{}", path.display(), page),
            color_image,
            egui::TextureOptions::LINEAR,
        );
        debug!(path = %path.display(), page, zoom, "rendered page");

        if self.textures.len() >= MAX_CACHED_TEXTURES {
            self.textures.clear();
        }
        self.textures.insert(key, texture.clone());
        Ok(texture)
    }

    /// Drop cached data for files that may have changed on disk.
    pub fn clear(&mut self) {
        self.sizes.clear();
        self.textures.clear();
    }
}

fn pdfium_error(path: &Path, error: PdfiumError) -> RenderError {
    RenderError::Pdfium {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

/// What to draw on top of the rendered page.
#[derive(Debug, Default)]
pub struct Overlay<'a> {
    pub annotations: Vec<&'a AnnotationRecord>,
    /// Pending click position for the next annotation.
    pub marker: Option<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    Clicked(Point),
    Dragged(PageRect),
}

/// Page view state that must survive between frames.
pub struct Viewer {
    renderer: PageRenderer,
    drag_start: Option<Point>,
    zoom: f32,
}

impl Viewer {
    pub fn new(renderer: PageRenderer) -> Self {
        Self {
            renderer,
            drag_start: None,
            zoom: 1.0,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn renderer_mut(&mut self) -> &mut PageRenderer {
        &mut self.renderer
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        path: &Path,
        page: usize,
        overlay: &Overlay<'_>,
    ) -> Option<ViewerEvent> {
        let page_size = match self.renderer.page_size(path, page) {
            Ok(size) => size,
            Err(RenderError::Unavailable) => LETTER,
            Err(e) => {
                ui.colored_label(ui.visuals().error_fg_color, e.to_string());
                return None;
            }
        };

        let avail = ui.available_size();
        self.zoom = fit_zoom(
            avail.x - VIEW_PADDING,
            avail.y - VIEW_PADDING,
            page_size.x,
            page_size.y,
        );
        let zoom = self.zoom;

        let (response, painter) = ui.allocate_painter(page_size * zoom, egui::Sense::click_and_drag());
        let frame = response.rect;
        let origin = frame.min;

        match self.renderer.texture(ui.ctx(), path, page, zoom) {
            Ok(texture) => {
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                painter.image(texture.id(), frame, uv, Color32::WHITE);
            }
            Err(e) => {
                painter.rect_filled(frame, 0.0, Color32::WHITE);
                painter.text(
                    frame.center(),
                    egui::Align2::CENTER_CENTER,
                    e.to_string(),
                    egui::FontId::proportional(14.0),
                    Color32::DARK_GRAY,
                );
            }
        }
        painter.rect_stroke(frame, 0.0, egui::Stroke::new(1.0, Color32::GRAY));

        for record in &overlay.annotations {
            draw_annotation(&painter, origin, zoom, record);
        }
        if let Some(marker) = overlay.marker {
            draw_marker(&painter, page_to_screen(origin, marker, zoom));
        }

        let pointer = response
            .interact_pointer_pos()
            .map(|pos| screen_to_page(origin, pos, zoom));

        if response.drag_started() {
            self.drag_start = pointer;
        }
        if let (Some(start), Some(current)) = (self.drag_start, pointer) {
            if response.dragged() {
                let rect = PageRect::new(start.x, start.y, current.x, current.y);
                painter.rect_filled(
                    screen_rect(origin, zoom, rect),
                    0.0,
                    color32(Rgb::YELLOW, 80),
                );
            }
        }
        if response.drag_stopped() {
            let start = self.drag_start.take();
            if let (Some(start), Some(end)) = (start, pointer) {
                let rect = PageRect::new(start.x, start.y, end.x, end.y);
                if rect.width() >= MIN_DRAG && rect.height() >= MIN_DRAG {
                    return Some(ViewerEvent::Dragged(rect));
                }
                return Some(ViewerEvent::Clicked(end));
            }
        }
        if response.clicked() {
            return pointer.map(ViewerEvent::Clicked);
        }
        None
    }
}

fn screen_rect(origin: Pos2, zoom: f32, rect: PageRect) -> Rect {
    Rect::from_min_max(
        page_to_screen(origin, Point::new(rect.x0, rect.y0), zoom),
        page_to_screen(origin, Point::new(rect.x1, rect.y1), zoom),
    )
}

fn draw_marker(painter: &egui::Painter, center: Pos2) {
    painter.circle_filled(
        center,
        MARKER_DIAMETER / 2.0,
        Color32::from_rgba_unmultiplied(255, 0, 0, 100),
    );
}

fn draw_annotation(painter: &egui::Painter, origin: Pos2, zoom: f32, record: &AnnotationRecord) {
    match record.kind {
        AnnotationKind::FreehandText | AnnotationKind::TextNote => {
            let anchor = page_to_screen(origin, record.position, zoom);
            let align = if record.kind == AnnotationKind::FreehandText {
                // Freehand text is placed by its baseline.
                egui::Align2::LEFT_BOTTOM
            } else {
                egui::Align2::LEFT_TOP
            };
            painter.text(
                anchor,
                align,
                record.text.as_str(),
                egui::FontId::proportional(record.font_size() * zoom),
                color32(record.color, 255),
            );
            draw_marker(painter, anchor);
        }
        AnnotationKind::Highlight => {
            painter.rect_filled(screen_rect(origin, zoom, record.rect()), 0.0, color32(record.color, 80));
        }
        AnnotationKind::Underline | AnnotationKind::Strikeout => {
            let rect = screen_rect(origin, zoom, record.rect());
            let y = if record.kind == AnnotationKind::Underline {
                rect.bottom()
            } else {
                rect.center().y
            };
            painter.line_segment(
                [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
                egui::Stroke::new(1.5, color32(record.color, 200)),
            );
        }
        AnnotationKind::Rectangle => {
            let rect = screen_rect(origin, zoom, record.rect());
            painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, color32(record.color, 200)));
        }
        AnnotationKind::Circle => {
            let rect = screen_rect(origin, zoom, record.rect());
            let radius = rect.width().min(rect.height()) / 2.0;
            painter.circle_stroke(
                rect.center(),
                radius,
                egui::Stroke::new(1.0, color32(record.color, 200)),
            );
        }
    }
}

//! Unified editor window: page list, page viewer and toolbar in one view.
//!
//! Pending annotations are tied to page-list entries rather than positions, so
//! reordering or removing pages keeps each annotation on the page it was placed on.

pub mod page_list;
pub mod toolbar;

use crate::dialog::{Feedback, Notice};
use crate::files::{self, display_name};
use crate::pickers;
use crate::viewer::{Overlay, Viewer, ViewerEvent};
use eframe::egui;
use page_list::{EntryId, PageList};
use pdfedit_core::{
    apply_changes, page_count, AnnotationKind, AnnotationRecord, ApplyRequest, PageRect, Point,
    Rgb, SignatureSettings, Signer,
};
use std::path::PathBuf;
use toolbar::{Tool, Toolbar, ToolbarAction};

#[derive(Debug, Clone, PartialEq)]
pub struct PendingAnnotation {
    pub entry: EntryId,
    pub record: AnnotationRecord,
}

#[derive(Clone, Default)]
pub struct SignatureForm {
    pub certificate: String,
    pub password: String,
    pub reason: String,
    pub location: String,
    pub contact: String,
}

impl std::fmt::Debug for SignatureForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureForm")
            .field("certificate", &self.certificate)
            .field("password", &"<redacted>")
            .field("reason", &self.reason)
            .field("location", &self.location)
            .field("contact", &self.contact)
            .finish()
    }
}

/// Everything in the unified window except rendering.
#[derive(Debug, Default)]
pub struct EditorState {
    pub pages: PageList,
    pub toolbar: Toolbar,
    pub annotations: Vec<PendingAnnotation>,
    pub pending_position: Option<Point>,
    pub text_input: String,
    pub output_input: String,
    pub signature: SignatureForm,
    pages_changed: bool,
}

impl EditorState {
    /// Add every page of each file to the page list. Every file is opened
    /// first, so one unreadable file leaves the list unchanged.
    pub fn add_files(&mut self, paths: &[PathBuf]) -> Result<String, Notice> {
        let counts = paths
            .iter()
            .map(|path| {
                page_count(path).map_err(|e| {
                    Notice::error("Error", format!("Failed to add {}:\n{}", display_name(path), e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut added = 0;
        for (path, count) in paths.iter().zip(counts) {
            self.pages.add_document(path, count);
            added += count;
            self.pages_changed = true;
        }
        Ok(format!(
            "Added {} page(s) from {} file(s). Total: {} page(s).",
            added,
            paths.len(),
            self.pages.len()
        ))
    }

    pub fn remove_selected_page(&mut self) -> Option<String> {
        let removed = self.pages.remove_selected()?;
        self.annotations.retain(|pending| pending.entry != removed.id);
        self.pending_position = None;
        self.pages_changed = true;
        Some(format!("Removed page. {} page(s) remaining.", self.pages.len()))
    }

    /// Record a click on the viewer.
    pub fn place(&mut self, point: Point) -> Option<String> {
        if self.toolbar.tool() != Tool::Text {
            return None;
        }
        self.pending_position = Some(point);
        Some(format!(
            "Position set: ({:.1}, {:.1}). Enter text and click 'Add Text'.",
            point.x, point.y
        ))
    }

    pub fn add_text(&mut self) -> Result<String, Notice> {
        let text = self.text_input.trim().to_string();
        if text.is_empty() {
            return Err(Notice::warning("No Text", "Please enter text for the annotation."));
        }
        let Some(position) = self.pending_position else {
            return Err(Notice::warning("No Position", "Please click on the PDF first."));
        };
        let Some(entry) = self.pages.selected().map(|entry| entry.id) else {
            return Err(Notice::warning("No Pages", "Please add PDF files first."));
        };

        let record = AnnotationRecord::freehand_text(
            0,
            position,
            text,
            self.toolbar.font_size(),
            self.toolbar.text_color(),
        );
        tracing::info!(annotation = %record, "added text annotation");
        self.annotations.push(PendingAnnotation { entry, record });
        self.text_input.clear();
        self.pending_position = None;

        Ok(format!(
            "Added annotation. Total: {}. Click 'Apply Changes' to save.",
            self.annotations.len()
        ))
    }

    pub fn add_highlight(&mut self, rect: PageRect) -> Option<String> {
        if self.toolbar.tool() != Tool::Highlight {
            return None;
        }
        let entry = self.pages.selected()?.id;
        let record = AnnotationRecord::area(AnnotationKind::Highlight, 0, rect)
            .with_color(Rgb::YELLOW);
        tracing::info!(annotation = %record, "added highlight");
        self.annotations.push(PendingAnnotation { entry, record });
        Some(format!(
            "Added highlight. Total: {}. Click 'Apply Changes' to save.",
            self.annotations.len()
        ))
    }

    /// Annotations on the selected page.
    pub fn current_annotations(&self) -> Vec<&AnnotationRecord> {
        let Some(selected) = self.pages.selected() else {
            return Vec::new();
        };
        self.annotations
            .iter()
            .filter(|pending| pending.entry == selected.id)
            .map(|pending| &pending.record)
            .collect()
    }

    /// Signing is requested when the signature tool is active and its form is filled.
    pub fn signature_settings(&self) -> Option<SignatureSettings> {
        let certificate = files::parse_path(&self.signature.certificate)?;
        if self.toolbar.tool() != Tool::Signature || self.signature.password.is_empty() {
            return None;
        }
        Some(SignatureSettings {
            certificate,
            password: self.signature.password.clone(),
            reason: self.signature.reason.trim().to_string(),
            location: self.signature.location.trim().to_string(),
            contact: self.signature.contact.trim().to_string(),
        })
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pages.is_empty()
            && (self.pages_changed
                || !self.annotations.is_empty()
                || self.signature_settings().is_some())
    }

    /// Pipeline input, with each annotation mapped to its entry's output position.
    pub fn build_request(&self) -> Result<ApplyRequest, Notice> {
        if self.pages.is_empty() {
            return Err(Notice::warning("No Pages", "Please add PDF files first."));
        }
        let Some(output) = files::output_path(&self.output_input) else {
            return Err(Notice::warning("No Output", "Please enter an output file path."));
        };

        let annotations = self
            .annotations
            .iter()
            .filter_map(|pending| {
                let page = self.pages.position(pending.entry)?;
                Some(AnnotationRecord {
                    page,
                    ..pending.record.clone()
                })
            })
            .collect();

        Ok(ApplyRequest {
            sources: self.pages.sources().to_vec(),
            pages: self.pages.page_refs(),
            annotations,
            signature: self.signature_settings(),
            output,
        })
    }

    pub fn apply(&mut self, signer: &Signer) -> Notice {
        let request = match self.build_request() {
            Ok(request) => request,
            Err(notice) => return notice,
        };

        match apply_changes(&request, signer) {
            Ok(summary) => {
                self.annotations.clear();
                self.pages_changed = false;
                let mut message = format!(
                    "PDF saved successfully:\n{}\n\nPages: {}\nAnnotations: {}",
                    request.output.display(),
                    summary.pages,
                    summary.annotations
                );
                if summary.signed {
                    message.push_str("\nDigitally signed");
                }
                Notice::info("Success", message)
            }
            Err(e) => Notice::error("Error", format!("Failed to save PDF:\n{}", e)),
        }
    }
}

pub struct UnifiedWindow {
    state: EditorState,
    viewer: Viewer,
    add_path_input: String,
}

impl UnifiedWindow {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            state: EditorState::default(),
            viewer,
            add_path_input: String::new(),
        }
    }

    pub fn add_files(&mut self, paths: &[PathBuf], feedback: &mut Feedback) {
        match self.state.add_files(paths) {
            Ok(status) => feedback.set_status(status),
            Err(notice) => feedback.notify(notice),
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context, feedback: &mut Feedback) {
        if ctx.memory(|memory| memory.focused().is_some()) || feedback.is_dialog_open() {
            return;
        }
        let (up, down, delete) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowUp),
                i.key_pressed(egui::Key::ArrowDown),
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
            )
        });
        if up {
            self.state.pages.select_previous();
        }
        if down {
            self.state.pages.select_next();
        }
        if delete {
            if let Some(status) = self.state.remove_selected_page() {
                feedback.set_status(status);
            }
        }
    }

    /// Ask for the output file; false when the dialog was cancelled.
    fn choose_output(&mut self) -> bool {
        let suggested = self
            .state
            .pages
            .sources()
            .first()
            .map(|source| files::suggested_output(source, "edited"));
        match pickers::save_pdf("Save PDF", suggested.as_deref()) {
            Some(path) => {
                self.state.output_input = path.display().to_string();
                true
            }
            None => false,
        }
    }

    /// Draw every panel. Input is ignored while a dialog is open.
    pub fn ui(&mut self, ctx: &egui::Context, feedback: &mut Feedback, signer: &Signer) {
        let enabled = !feedback.is_dialog_open();
        self.handle_keys(ctx, feedback);

        if enabled {
            let dropped = files::dropped_pdfs(ctx);
            if !dropped.is_empty() {
                self.add_files(&dropped, feedback);
            }
        }

        egui::TopBottomPanel::top("unified_toolbar").show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| self.toolbar_ui(ui, feedback, signer));
        });

        egui::SidePanel::left("page_list")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| self.page_list_ui(ui, feedback));
            });

        match self.state.toolbar.tool() {
            Tool::Text => {
                egui::SidePanel::right("text_panel").show(ctx, |ui| {
                    ui.add_enabled_ui(enabled, |ui| self.text_panel_ui(ui, feedback));
                });
            }
            Tool::Signature => {
                egui::SidePanel::right("signature_panel").show(ctx, |ui| {
                    ui.add_enabled_ui(enabled, |ui| self.signature_panel_ui(ui));
                });
            }
            Tool::Select | Tool::Highlight => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| self.viewer_ui(ui, feedback));
        });
    }

    fn toolbar_ui(&mut self, ui: &mut egui::Ui, feedback: &mut Feedback, signer: &Signer) {
        let pending = self.state.has_pending_changes();
        match self.state.toolbar.ui(ui, pending) {
            Some(ToolbarAction::ToolChanged(tool)) => {
                self.state.pending_position = None;
                feedback.set_status(tool.hint());
            }
            Some(ToolbarAction::Apply) => {
                if files::parse_path(&self.state.output_input).is_none() && !self.choose_output() {
                    return;
                }
                let notice = self.state.apply(signer);
                self.viewer.renderer_mut().clear();
                feedback.notify(notice);
            }
            None => {}
        }
        ui.horizontal(|ui| {
            ui.label("Output:");
            ui.text_edit_singleline(&mut self.state.output_input);
            if ui.button("Save As…").clicked() {
                self.choose_output();
            }
            if !self.state.pages.is_empty() {
                ui.separator();
                ui.label(format!("Zoom: {:.0}%", self.viewer.zoom() * 100.0));
            }
        });
    }

    fn page_list_ui(&mut self, ui: &mut egui::Ui, feedback: &mut Feedback) {
        ui.heading("Pages");
        ui.horizontal(|ui| {
            if ui.button("Browse…").clicked() {
                let paths = pickers::pick_pdfs("Add PDF Files");
                if !paths.is_empty() {
                    self.add_files(&paths, feedback);
                }
            }
            ui.text_edit_singleline(&mut self.add_path_input);
            if ui.button("Add").clicked() {
                let paths = files::parse_paths(&self.add_path_input);
                if paths.is_empty() {
                    feedback.notify(Notice::warning("No Files", "Please enter a PDF file path."));
                } else {
                    self.add_path_input.clear();
                    self.add_files(&paths, feedback);
                }
            }
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 40.0)
            .show(ui, |ui| {
                let selected = self.state.pages.selected_index();
                let mut clicked = None;
                for index in 0..self.state.pages.len() {
                    let label = self.state.pages.label(index);
                    if ui.selectable_label(selected == Some(index), label).clicked() {
                        clicked = Some(index);
                    }
                }
                if let Some(index) = clicked {
                    self.state.pages.select(index);
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            let has_selection = self.state.pages.selected().is_some();
            if ui.add_enabled(has_selection, egui::Button::new("Remove Page")).clicked() {
                if let Some(status) = self.state.remove_selected_page() {
                    feedback.set_status(status);
                }
            }
            if ui.add_enabled(!self.state.pages.is_empty(), egui::Button::new("Clear")).clicked() {
                self.state.pages.clear();
                self.state.annotations.clear();
                self.state.pending_position = None;
                feedback.set_status("Cleared all pages.");
            }
        });
    }

    fn text_panel_ui(&mut self, ui: &mut egui::Ui, feedback: &mut Feedback) {
        ui.heading("Text");
        ui.text_edit_singleline(&mut self.state.text_input);
        let ready = self.state.pending_position.is_some();
        if ui.add_enabled(ready, egui::Button::new("Add Text")).clicked() {
            match self.state.add_text() {
                Ok(status) => feedback.set_status(status),
                Err(notice) => feedback.notify(notice),
            }
        }
    }

    fn signature_panel_ui(&mut self, ui: &mut egui::Ui) {
        let form = &mut self.state.signature;
        ui.heading("Signature");
        egui::Grid::new("signature_grid").num_columns(2).show(ui, |ui| {
            ui.label("Certificate (.p12):");
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut form.certificate);
                if ui.button("Browse…").clicked() {
                    if let Some(path) = pickers::pick_certificate() {
                        form.certificate = path.display().to_string();
                    }
                }
            });
            ui.end_row();
            ui.label("Password:");
            ui.add(egui::TextEdit::singleline(&mut form.password).password(true));
            ui.end_row();
            ui.label("Reason:");
            ui.text_edit_singleline(&mut form.reason);
            ui.end_row();
            ui.label("Location:");
            ui.text_edit_singleline(&mut form.location);
            ui.end_row();
            ui.label("Contact:");
            ui.text_edit_singleline(&mut form.contact);
            ui.end_row();
        });
    }

    fn viewer_ui(&mut self, ui: &mut egui::Ui, feedback: &mut Feedback) {
        let Some(entry) = self.state.pages.selected().cloned() else {
            ui.centered_and_justified(|ui| {
                ui.label("Add PDF files to start (File → Add PDF Files… or drop them here).");
            });
            return;
        };
        let path = self.state.pages.source_path(&entry).to_path_buf();

        let overlay = Overlay {
            annotations: self.state.current_annotations(),
            marker: self.state.pending_position,
        };
        let event = self.viewer.show(ui, &path, entry.page, &overlay);

        let status = match event {
            Some(ViewerEvent::Clicked(point)) => self.state.place(point),
            Some(ViewerEvent::Dragged(rect)) => self.state.add_highlight(rect),
            None => None,
        };
        if let Some(status) = status {
            feedback.set_status(status);
        }
    }
}

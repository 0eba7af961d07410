//! "Annotate PDFs" tab: one annotation per run, written to a new file

use crate::dialog::{Feedback, Notice};
use crate::files;
use crate::pickers;
use eframe::egui;
use pdfedit_core::{AnnotationKind, AnnotationRecord, AnnotationSession, PageRect, Point};
use std::path::{Path, PathBuf};

const MAX_COORDINATE: f32 = 9999.0;

#[derive(Debug)]
pub struct AnnotateTab {
    pdf_input: String,
    kind: AnnotationKind,
    /// One-based, as typed.
    page: usize,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    text: String,
    output_input: String,
    status: String,
}

impl Default for AnnotateTab {
    fn default() -> Self {
        Self {
            pdf_input: String::new(),
            kind: AnnotationKind::TextNote,
            page: 1,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
            text: String::new(),
            output_input: String::new(),
            status: String::new(),
        }
    }
}

impl AnnotateTab {
    pub fn set_pdf(&mut self, path: &Path) {
        self.pdf_input = path.display().to_string();
        self.status = format!("Selected: {}", files::display_name(path));
    }

    /// The form as an annotation record with a zero-based page.
    pub fn record(&self) -> AnnotationRecord {
        let page = self.page.saturating_sub(1);
        let record = if self.kind.is_point_based() {
            AnnotationRecord::new(self.kind, page, Point::new(self.x, self.y))
        } else {
            let rect = PageRect::from_origin_size(self.x, self.y, self.width, self.height);
            AnnotationRecord::area(self.kind, page, rect)
        };
        record.with_text(self.text.trim_end())
    }

    pub fn execute(&mut self) -> Result<Notice, Notice> {
        let Some(pdf) = files::parse_path(&self.pdf_input) else {
            return Err(Notice::warning("No PDF", "Please select a PDF file first."));
        };
        let output = match files::output_path(&self.output_input) {
            Some(path) => path,
            None => files::unused_default(files::suggested_output(&pdf, "annotated"))?,
        };

        let record = self.record();
        let result = AnnotationSession::open(&pdf).and_then(|mut session| {
            session.add_record(&record)?;
            session.save(&output)
        });

        match result {
            Ok(()) => {
                self.status = format!("Annotated PDF saved to {}", output.display());
                Ok(Notice::info(
                    "Success",
                    format!("Annotation added successfully to:\n{}", output.display()),
                ))
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                Err(Notice::error("Annotation Error", e.to_string()))
            }
        }
    }

    /// Ask for the output file; false when the dialog was cancelled.
    fn choose_output(&mut self) -> bool {
        let suggested = files::parse_path(&self.pdf_input)
            .map(|pdf| files::suggested_output(&pdf, "annotated"));
        match pickers::save_pdf("Save Annotated PDF", suggested.as_deref()) {
            Some(path) => {
                self.output_input = path.display().to_string();
                true
            }
            None => false,
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, feedback: &mut Feedback) {
        ui.horizontal(|ui| {
            ui.label("PDF File:");
            ui.text_edit_singleline(&mut self.pdf_input);
            if ui.button("Browse…").clicked() {
                if let Some(path) = pickers::pick_pdf("Select PDF File") {
                    self.set_pdf(&path);
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Annotation Type:");
            egui::ComboBox::from_id_salt("annotation_kind")
                .selected_text(self.kind.label())
                .show_ui(ui, |ui| {
                    for kind in AnnotationKind::ALL {
                        ui.selectable_value(&mut self.kind, kind, kind.label());
                    }
                });
        });

        ui.group(|ui| {
            ui.label("Annotation Parameters");
            egui::Grid::new("annotation_params").num_columns(2).show(ui, |ui| {
                ui.label("Page Number:");
                ui.add(egui::DragValue::new(&mut self.page).range(1..=9999));
                ui.end_row();
                for (label, value) in [
                    ("X Position:", &mut self.x),
                    ("Y Position:", &mut self.y),
                    ("Width (for shapes):", &mut self.width),
                    ("Height (for shapes):", &mut self.height),
                ] {
                    ui.label(label);
                    ui.add(egui::DragValue::new(value).range(0.0..=MAX_COORDINATE));
                    ui.end_row();
                }
                ui.label("Text Content:");
                ui.add(egui::TextEdit::multiline(&mut self.text).desired_rows(3));
                ui.end_row();
            });
        });

        ui.horizontal(|ui| {
            ui.label("Output:");
            let hint = files::parse_path(&self.pdf_input)
                .map(|pdf| files::suggested_output(&pdf, "annotated").display().to_string())
                .unwrap_or_default();
            ui.add(egui::TextEdit::singleline(&mut self.output_input).hint_text(hint));
            if ui.button("Save As…").clicked() {
                self.choose_output();
            }
        });

        if ui.button("Add Annotation").clicked() {
            let needs_output = files::parse_path(&self.output_input).is_none()
                && files::parse_path(&self.pdf_input).is_some();
            if needs_output && !self.choose_output() {
                return;
            }
            match self.execute() {
                Ok(notice) | Err(notice) => feedback.notify(notice),
            }
        }
        ui.label(self.status.as_str());
    }
}

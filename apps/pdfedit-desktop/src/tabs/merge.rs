//! "Merge PDFs" tab

use crate::dialog::{Feedback, Notice};
use crate::files::{self, display_name};
use crate::pickers;
use eframe::egui;
use pdfedit_core::merge_pdfs;
use std::path::PathBuf;

pub const DEFAULT_MERGED_NAME: &str = "merged.pdf";

#[derive(Debug, Default)]
pub struct MergeTab {
    files: Vec<PathBuf>,
    selected: Option<usize>,
    path_input: String,
    output_input: String,
    status: String,
}

impl MergeTab {
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn add_files(&mut self, paths: Vec<PathBuf>) {
        let added = paths.len();
        self.files.extend(paths);
        self.status = format!("Added {} file(s)", added);
    }

    pub fn remove_selected(&mut self) {
        if let Some(index) = self.selected.take() {
            if index < self.files.len() {
                self.files.remove(index);
                self.status = "Removed selected files".to_string();
            }
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.selected = None;
        self.status = "Cleared all files".to_string();
    }

    /// `merged.pdf` next to the first input.
    pub fn default_output(&self) -> Option<PathBuf> {
        self.files
            .first()
            .map(|first| first.with_file_name(DEFAULT_MERGED_NAME))
    }

    /// Typed output path, or the default when nothing exists there yet.
    pub fn output(&self) -> Result<Option<PathBuf>, Notice> {
        match files::output_path(&self.output_input) {
            Some(path) => Ok(Some(path)),
            None => self.default_output().map(files::unused_default).transpose(),
        }
    }

    pub fn execute(&mut self) -> Result<Notice, Notice> {
        if self.files.len() < 2 {
            return Err(Notice::warning(
                "Insufficient Files",
                "Please select at least 2 PDF files to merge.",
            ));
        }
        let Some(output) = self.output()? else {
            return Err(Notice::warning("No Output", "Please enter an output file path."));
        };

        match merge_pdfs(&self.files, &output) {
            Ok(summary) => {
                self.status = format!("Merged {} files → {}", summary.files, output.display());
                Ok(Notice::info(
                    "Success",
                    format!(
                        "Successfully merged {} files to:\n{}",
                        summary.files,
                        output.display()
                    ),
                ))
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                Err(Notice::error("Merge Error", e.to_string()))
            }
        }
    }

    /// Ask for the output file; false when the dialog was cancelled.
    fn choose_output(&mut self) -> bool {
        match pickers::save_pdf("Save Merged PDF", self.default_output().as_deref()) {
            Some(path) => {
                self.output_input = path.display().to_string();
                true
            }
            None => false,
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, feedback: &mut Feedback) {
        ui.label("Select PDF files to merge:");
        ui.horizontal(|ui| {
            if ui.button("Browse…").clicked() {
                let paths = pickers::pick_pdfs("Select PDF Files");
                if !paths.is_empty() {
                    self.add_files(paths);
                }
            }
            ui.text_edit_singleline(&mut self.path_input);
            if ui.button("Add Files").clicked() {
                let paths = files::pdf_paths(files::parse_paths(&self.path_input));
                if paths.is_empty() {
                    feedback.notify(Notice::warning("No Files", "Please enter a PDF file path."));
                } else {
                    self.path_input.clear();
                    self.add_files(paths);
                }
            }
        });

        egui::ScrollArea::vertical()
            .max_height(240.0)
            .show(ui, |ui| {
                for (index, path) in self.files.iter().enumerate() {
                    let label = format!("{}. {}", index + 1, display_name(path));
                    let response = ui
                        .selectable_label(self.selected == Some(index), label)
                        .on_hover_text(path.display().to_string());
                    if response.clicked() {
                        self.selected = Some(index);
                    }
                }
            });

        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.selected.is_some(), egui::Button::new("Remove Selected"))
                .clicked()
            {
                self.remove_selected();
            }
            if ui.button("Clear All").clicked() {
                self.clear();
            }
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Output:");
            ui.add(
                egui::TextEdit::singleline(&mut self.output_input)
                    .hint_text(DEFAULT_MERGED_NAME),
            );
            if ui.button("Save As…").clicked() {
                self.choose_output();
            }
        });
        if ui.button("Merge PDFs").clicked() {
            if files::parse_path(&self.output_input).is_none()
                && self.files.len() >= 2
                && !self.choose_output()
            {
                return;
            }
            match self.execute() {
                Ok(notice) | Err(notice) => feedback.notify(notice),
            }
        }
        ui.label(self.status.as_str());
    }
}

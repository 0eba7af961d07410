//! Tabbed window: one tab per operation

pub mod annotate;
pub mod merge;
pub mod sign;

use crate::dialog::Feedback;
use eframe::egui;
use pdfedit_core::Signer;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Merge,
    Annotate,
    Sign,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Merge, Tab::Annotate, Tab::Sign];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Merge => "Merge PDFs",
            Tab::Annotate => "Annotate PDFs",
            Tab::Sign => "Sign PDFs",
        }
    }
}

#[derive(Debug, Default)]
pub struct TabbedWindow {
    active: Tab,
    merge: merge::MergeTab,
    annotate: annotate::AnnotateTab,
    sign: sign::SignTab,
}

impl TabbedWindow {
    pub fn active(&self) -> Tab {
        self.active
    }

    /// Files opened from the menu, the command line or a drop.
    ///
    /// The merge tab takes them all; the other tabs take the first.
    pub fn add_files(&mut self, paths: Vec<PathBuf>, feedback: &mut Feedback) {
        let Some(first) = paths.first().cloned() else {
            return;
        };
        match self.active {
            Tab::Merge => {
                let count = paths.len();
                self.merge.add_files(paths);
                feedback.set_status(format!("Added {} file(s)", count));
            }
            Tab::Annotate => {
                self.annotate.set_pdf(&first);
                feedback.set_status(format!("Selected: {}", first.display()));
            }
            Tab::Sign => {
                self.sign.set_pdf(&first);
                feedback.set_status(format!("Selected: {}", first.display()));
            }
        }
    }

    /// Draw the tab bar and the active tab. Everything is inert while a
    /// dialog is open.
    pub fn ui(&mut self, ctx: &egui::Context, feedback: &mut Feedback, signer: &Signer) {
        let enabled = !feedback.is_dialog_open();
        if enabled {
            let dropped = crate::files::dropped_pdfs(ctx);
            if !dropped.is_empty() {
                self.add_files(dropped, feedback);
            }
        }

        egui::TopBottomPanel::top("tab_bar").show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.horizontal(|ui| {
                    for tab in Tab::ALL {
                        ui.selectable_value(&mut self.active, tab, tab.title());
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| match self.active {
                    Tab::Merge => self.merge.ui(ui, feedback),
                    Tab::Annotate => self.annotate.ui(ui, feedback),
                    Tab::Sign => self.sign.ui(ui, feedback, signer),
                });
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::Notice;
    use pretty_assertions::assert_eq;

    fn drop_file(window: &mut TabbedWindow, feedback: &mut Feedback, path: &str) {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            dropped_files: vec![egui::DroppedFile {
                path: Some(PathBuf::from(path)),
                ..Default::default()
            }],
            ..Default::default()
        };
        let signer = Signer::new("pyhanko");
        let _ = ctx.run(input, |ctx| window.ui(ctx, feedback, &signer));
    }

    #[test]
    fn test_files_go_to_merge_list_by_default() {
        let mut window = TabbedWindow::default();
        let mut feedback = Feedback::default();
        window.add_files(
            vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
            &mut feedback,
        );
        assert_eq!(window.active(), Tab::Merge);
        assert_eq!(window.merge.files().len(), 2);
        assert_eq!(feedback.status(), "Added 2 file(s)");
    }

    #[test]
    fn test_other_tabs_take_first_file() {
        let mut window = TabbedWindow {
            active: Tab::Sign,
            ..TabbedWindow::default()
        };
        let mut feedback = Feedback::default();
        window.add_files(
            vec![PathBuf::from("first.pdf"), PathBuf::from("second.pdf")],
            &mut feedback,
        );
        assert!(window.merge.files().is_empty());
        assert!(feedback.status().contains("first.pdf"));
    }

    #[test]
    fn test_window_is_inert_while_dialog_open() {
        let mut window = TabbedWindow::default();
        let mut feedback = Feedback::default();
        feedback.notify(Notice::error("Merge Error", "File not found: a.pdf"));

        drop_file(&mut window, &mut feedback, "late.pdf");
        assert!(window.merge.files().is_empty());

        feedback.dismiss();
        drop_file(&mut window, &mut feedback, "late.pdf");
        assert_eq!(window.merge.files(), &[PathBuf::from("late.pdf")]);
    }

    #[test]
    fn test_empty_add_is_ignored() {
        let mut window = TabbedWindow::default();
        let mut feedback = Feedback::default();
        window.add_files(Vec::new(), &mut feedback);
        assert_eq!(feedback.status(), "");
    }
}

//! Application shell: menu bar, status line, dialogs and the active window

use crate::config::{AppConfig, Layout};
use crate::dialog::{Feedback, Notice};
use crate::files;
use crate::pickers;
use crate::tabs::TabbedWindow;
use crate::unified::UnifiedWindow;
use crate::viewer::{PageRenderer, Viewer};
use anyhow::anyhow;
use eframe::egui;
use pdfedit_core::Signer;
use std::path::PathBuf;

const ABOUT_TEXT: &str = "PDF Editor v2.0\n\n\
    Merge, annotate and digitally sign PDF documents:\n\
    • Merge and reorder pages\n\
    • Add text annotations and highlights\n\
    • Digital signatures (pyHanko)\n\n\
    Keyboard Shortcuts:\n\
    • ↑↓ arrows: Navigate pages\n\
    • Delete/Backspace: Remove page\n\
    • Ctrl+O: Add PDF files\n\
    • Ctrl+Q: Quit";

const SHORTCUTS_TEXT: &str = "Page Navigation:\n\
    • ↑ / ↓ arrows: Navigate pages in list\n\
    • Delete / Backspace: Remove selected page\n\n\
    File Operations:\n\
    • Ctrl+O: Add PDF files\n\
    • Ctrl+Q: Quit application\n\n\
    Tips:\n\
    • Click on pages in the list to select\n\
    • Click on the page view to place annotations\n\
    • Use the toolbar to switch between tools";

enum Window {
    Tabs(TabbedWindow),
    Unified(Box<UnifiedWindow>),
}

impl Window {
    fn add_files(&mut self, paths: Vec<PathBuf>, feedback: &mut Feedback) {
        match self {
            Window::Tabs(window) => window.add_files(paths, feedback),
            Window::Unified(window) => window.add_files(&paths, feedback),
        }
    }
}

/// Paths typed into the "Add PDF Files" prompt, one per line.
#[derive(Debug, Default)]
struct AddFilesPrompt {
    open: bool,
    input: String,
}

impl AddFilesPrompt {
    fn show(&mut self, ctx: &egui::Context) -> Option<Vec<PathBuf>> {
        if !self.open {
            return None;
        }

        let mut submitted = None;
        let mut close = false;
        egui::Window::new("Add PDF Files")
            .collapsible(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("One PDF path per line:");
                ui.add(
                    egui::TextEdit::multiline(&mut self.input)
                        .desired_rows(6)
                        .desired_width(420.0),
                );
                ui.horizontal(|ui| {
                    if ui.button("Add").clicked() {
                        submitted = Some(files::pdf_paths(files::parse_paths(&self.input)));
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });

        if submitted.is_some() || close {
            self.open = false;
            self.input.clear();
        }
        submitted
    }
}

pub struct PdfEditApp {
    window: Window,
    feedback: Feedback,
    signer: Signer,
    prompt: AddFilesPrompt,
}

impl PdfEditApp {
    pub fn new(config: AppConfig) -> Self {
        let signer = Signer::new(config.signer_program);
        let mut feedback = Feedback::default();
        feedback.set_status("Ready");

        let mut window = match config.layout {
            Layout::Tabs => Window::Tabs(TabbedWindow::default()),
            Layout::Unified => {
                let renderer = PageRenderer::new(config.pdfium_dir.as_deref());
                if !renderer.is_available() {
                    feedback.set_status("Page previews unavailable: Pdfium library not found");
                }
                Window::Unified(Box::new(UnifiedWindow::new(Viewer::new(renderer))))
            }
        };

        let initial = files::pdf_paths(config.initial_files);
        if !initial.is_empty() {
            window.add_files(initial, &mut feedback);
        }

        Self {
            window,
            feedback,
            signer,
            prompt: AddFilesPrompt::default(),
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let open = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
        let quit = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);
        if ctx.input_mut(|i| i.consume_shortcut(&open)) {
            self.pick_files();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&quit)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    /// Native picker for the files to add. Cancelling changes nothing.
    fn pick_files(&mut self) {
        if self.feedback.is_dialog_open() {
            return;
        }
        let paths = pickers::pick_pdfs("Add PDF Files");
        if !paths.is_empty() {
            self.window.add_files(paths, &mut self.feedback);
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui
                        .add(egui::Button::new("Add PDF Files…").shortcut_text("Ctrl+O"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.pick_files();
                    }
                    if ui.button("Add PDF Paths…").clicked() {
                        self.prompt.open = true;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.add(egui::Button::new("Exit").shortcut_text("Ctrl+Q")).clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.feedback.notify(Notice::info("About PDF Editor", ABOUT_TEXT));
                        ui.close_menu();
                    }
                    if ui.button("Keyboard Shortcuts").clicked() {
                        self.feedback
                            .notify(Notice::info("Keyboard Shortcuts", SHORTCUTS_TEXT));
                        ui.close_menu();
                    }
                });
            });
        });
    }
}

impl eframe::App for PdfEditApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.menu_bar(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.feedback.show_status(ui);
        });

        match &mut self.window {
            Window::Tabs(window) => window.ui(ctx, &mut self.feedback, &self.signer),
            Window::Unified(window) => window.ui(ctx, &mut self.feedback, &self.signer),
        }

        if let Some(paths) = self.prompt.show(ctx) {
            if paths.is_empty() {
                self.feedback
                    .notify(Notice::warning("No Files", "Please enter at least one PDF path."));
            } else {
                self.window.add_files(paths, &mut self.feedback);
            }
        }
        self.feedback.show_dialog(ctx);
    }
}

/// Open the main window and block until it closes.
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let title = match config.layout {
        Layout::Tabs => "PDF Editor Tool",
        Layout::Unified => "PDF Editor",
    };
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    let app = PdfEditApp::new(config);
    eframe::run_native(title, native_options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow!("GUI error: {e}"))
}

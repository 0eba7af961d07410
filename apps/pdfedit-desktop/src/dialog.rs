//! Modal message dialog and the status line

use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message for the user: shown in a dialog and echoed on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, message)
    }

    fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }

    /// One-line form for the status bar.
    pub fn status_text(&self) -> String {
        let first_line = self.message.lines().next().unwrap_or_default();
        match self.severity {
            Severity::Info => first_line.to_string(),
            Severity::Warning | Severity::Error => format!("{}: {}", self.title, first_line),
        }
    }
}

/// At most one open dialog plus the current status text.
#[derive(Debug, Default)]
pub struct Feedback {
    dialog: Option<Notice>,
    status: String,
}

impl Feedback {
    pub fn notify(&mut self, notice: Notice) {
        match notice.severity {
            Severity::Error => tracing::error!(title = %notice.title, "{}", notice.message),
            Severity::Warning => tracing::warn!(title = %notice.title, "{}", notice.message),
            Severity::Info => tracing::info!(title = %notice.title, "{}", notice.message),
        }
        self.status = notice.status_text();
        self.dialog = Some(notice);
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn dismiss(&mut self) {
        self.dialog = None;
    }

    pub fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.dialog else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new(notice.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                let text = egui::RichText::new(notice.message.as_str());
                let text = match notice.severity {
                    Severity::Error => text.color(ui.visuals().error_fg_color),
                    Severity::Warning => text.color(ui.visuals().warn_fg_color),
                    Severity::Info => text,
                };
                ui.label(text);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.dismiss();
        }
    }

    pub fn show_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.status.as_str());
        });
    }
}

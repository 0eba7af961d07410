//! Native open and save dialogs.
//!
//! Each picker blocks until the user confirms or cancels. Cancelling is not
//! an error and yields nothing. Typed paths and dropped files remain the
//! alternatives when no dialog is wanted.

use crate::files;
use rfd::FileDialog;
use std::path::{Path, PathBuf};

const PDF_FILTER: &str = "PDF Documents";
const PDF_EXTENSIONS: [&str; 2] = ["pdf", "PDF"];

fn pdf_dialog(title: &str) -> FileDialog {
    FileDialog::new()
        .set_title(title)
        .add_filter(PDF_FILTER, &PDF_EXTENSIONS)
}

pub fn pick_pdf(title: &str) -> Option<PathBuf> {
    pdf_dialog(title).pick_file()
}

pub fn pick_pdfs(title: &str) -> Vec<PathBuf> {
    pdf_dialog(title)
        .pick_files()
        .map(files::pdf_paths)
        .unwrap_or_default()
}

pub fn pick_certificate() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Select Certificate")
        .add_filter("PKCS#12 Certificates", &["p12", "P12"])
        .pick_file()
}

/// Save dialog opening on `suggested`; the chosen path always ends in `.pdf`.
pub fn save_pdf(title: &str, suggested: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = pdf_dialog(title);
    if let Some((directory, name)) = suggested.map(save_location) {
        if let Some(directory) = directory {
            dialog = dialog.set_directory(directory);
        }
        dialog = dialog.set_file_name(name);
    }
    dialog.save_file().map(|path| files::ensure_pdf_extension(&path))
}

/// Directory and file name a save dialog starts from.
fn save_location(suggested: &Path) -> (Option<&Path>, String) {
    let directory = suggested
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty());
    (directory, files::display_name(suggested))
}

//! Path handling for the file fields of the editor windows.
//!
//! Paths are typed or pasted into text fields, chosen in a native dialog
//! (see `pickers`), or dropped onto the window.

use crate::dialog::Notice;
use eframe::egui;
use pdfedit_core::has_pdf_extension;
use std::path::{Path, PathBuf};

/// Parse a path typed or pasted into a field.
///
/// Surrounding whitespace and a pair of matching quotes are removed, as
/// file managers add them when copying paths.
pub fn parse_path(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|quote| {
            trimmed
                .strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .unwrap_or(trimmed)
        .trim();

    if unquoted.is_empty() {
        None
    } else {
        Some(PathBuf::from(unquoted))
    }
}

/// Parse several paths, one per line.
pub fn parse_paths(input: &str) -> Vec<PathBuf> {
    input.lines().filter_map(parse_path).collect()
}

/// Ensures a path has the .pdf extension.
pub fn ensure_pdf_extension(path: &Path) -> PathBuf {
    let mut result = path.to_path_buf();
    if !has_pdf_extension(&result) {
        result.set_extension("pdf");
    }
    result
}

/// Output field value: parsed, with the .pdf extension enforced.
pub fn output_path(input: &str) -> Option<PathBuf> {
    parse_path(input).map(|path| ensure_pdf_extension(&path))
}

/// `<dir>/<stem>_<suffix>.pdf` next to `input`.
pub fn suggested_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{}_{}.pdf", stem, suffix))
}

/// A default output path, which is only used when nothing lives there yet.
///
/// A path the user typed or chose is written as given; a default is never
/// allowed to replace an existing file.
pub fn unused_default(path: PathBuf) -> Result<PathBuf, Notice> {
    if path.exists() {
        return Err(Notice::warning(
            "Output Exists",
            format!(
                "{} already exists.\nPlease choose an output file.",
                path.display()
            ),
        ));
    }
    Ok(path)
}

/// File name for list entries, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// PDF paths among the files dropped onto the window this frame.
pub fn dropped_pdfs(ctx: &egui::Context) -> Vec<PathBuf> {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    pdf_paths(dropped.into_iter().filter_map(|file| file.path))
}

pub fn pdf_paths(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(|path| has_pdf_extension(path))
        .collect()
}

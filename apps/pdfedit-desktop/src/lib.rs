//! Desktop editor for merging, annotating and signing PDFs
//!
//! Two layouts share the same core operations:
//! - `tabs`: one tab per operation, each writing a new file
//! - `unified`: page list, page viewer and toolbar, applied in one step

pub mod app;
pub mod config;
pub mod dialog;
pub mod files;
pub mod pickers;
pub mod tabs;
pub mod unified;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::{run, PdfEditApp};

//! Merge, annotate and sign PDF documents
//!
//! This crate wraps three external capabilities behind small typed APIs:
//! - `merge`: appends pages of several PDFs into a fresh document (lopdf)
//! - `annotate`: a session over one open document that adds notes, markup and shapes (lopdf)
//! - `sign`: drives the external `pyhanko` signer for PKCS#12 signatures and validation
//!
//! `pipeline` chains the three into the single "apply changes" operation used
//! by the unified editor window.

pub mod annotate;
pub mod annotation;
mod appearance;
pub mod error;
pub mod merge;
mod page_tree;
pub mod pipeline;
pub mod sign;

#[cfg(test)]
pub(crate) mod test_support;

pub use annotate::AnnotationSession;
pub use annotation::{AnnotationKind, AnnotationRecord, PageRect, Point, Rgb, ShapeStyle};
pub use error::{AnnotateError, MergeError, PipelineError, SignError};
pub use merge::{merge_pages, merge_pdfs, page_count, MergeSummary, PageRef};
pub use pipeline::{apply_changes, ApplyRequest, ApplySummary, SignatureSettings};
pub use sign::{SignRequest, Signer, DEFAULT_SIGNER_PROGRAM};

use std::path::Path;

/// True when the path carries a `.pdf` extension, ignoring case.
pub fn has_pdf_extension(path: &Path) -> bool {
    has_extension(path, "pdf")
}

pub(crate) fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected))
}

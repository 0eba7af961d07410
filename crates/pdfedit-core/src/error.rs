use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("No input files provided")]
    NoInputFiles,

    #[error("At least 2 PDF files are required for merging")]
    InsufficientFiles,

    #[error("No pages selected")]
    NoPagesSelected,

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Not a PDF file: {}", .0.display())]
    NotAPdf(PathBuf),

    #[error("Failed to open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    #[error("Unknown source document: {0}")]
    UnknownSource(usize),

    #[error("Page {} is out of range for source {source_index} ({total} pages)", page + 1)]
    PageOutOfRange {
        source_index: usize,
        page: usize,
        total: usize,
    },

    #[error("PDF processing error: {0}")]
    Processing(String),

    #[error("Failed to save {}: {reason}", path.display())]
    Save { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("PDF file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to open PDF: {0}")]
    Open(String),

    #[error("Invalid page number: {page} (document has {total} pages)")]
    InvalidPage { page: usize, total: usize },

    #[error("Failed to add {kind}: {reason}")]
    Apply { kind: &'static str, reason: String },

    #[error("Failed to save PDF: {0}")]
    Save(String),

    #[error("Document is closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum SignError {
    #[error("Input PDF not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Certificate file not found: {}", .0.display())]
    CertificateNotFound(PathBuf),

    #[error("Certificate must be a .p12 file: {}", .0.display())]
    NotP12(PathBuf),

    #[error("PDF file not found: {}", .0.display())]
    PdfNotFound(PathBuf),

    #[error("{program} command not found. Please ensure pyHanko is installed.")]
    NotInstalled { program: String },

    #[error("Failed to launch {program}: {reason}")]
    Launch { program: String, reason: String },

    #[error("Failed to sign PDF: {0}")]
    Failed(String),

    #[error("Signature validation failed: {0}")]
    ValidationFailed(String),
}

/// Failure of the merge → annotate → sign chain.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No pages to write")]
    NoPages,

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Annotate(#[from] AnnotateError),

    #[error(transparent)]
    Sign(#[from] SignError),

    #[error("Failed to create a temporary file in {}: {source}", dir.display())]
    Staging {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

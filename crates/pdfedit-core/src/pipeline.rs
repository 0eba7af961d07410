//! Merge → annotate → sign, into a single output file
//!
//! Each stage writes a named temp file next to the output. A stage's temp
//! file replaces the previous one, and only the last is persisted, so a
//! failure at any stage leaves the output path untouched.

use crate::annotate::AnnotationSession;
use crate::annotation::AnnotationRecord;
use crate::error::PipelineError;
use crate::merge::{merge_pages, PageRef};
use crate::sign::{SignRequest, Signer};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Certificate and metadata for the optional signing stage.
#[derive(Clone, Default)]
pub struct SignatureSettings {
    pub certificate: PathBuf,
    pub password: String,
    pub reason: String,
    pub location: String,
    pub contact: String,
}

impl std::fmt::Debug for SignatureSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureSettings")
            .field("certificate", &self.certificate)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplyRequest {
    /// Source documents, indexed by `PageRef::source`.
    pub sources: Vec<PathBuf>,
    /// Output pages, in order.
    pub pages: Vec<PageRef>,
    /// Annotations whose `page` is an index into `pages`.
    pub annotations: Vec<AnnotationRecord>,
    pub signature: Option<SignatureSettings>,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplySummary {
    pub pages: usize,
    pub annotations: usize,
    pub signed: bool,
}

pub fn apply_changes(request: &ApplyRequest, signer: &Signer) -> Result<ApplySummary, PipelineError> {
    if request.pages.is_empty() {
        return Err(PipelineError::NoPages);
    }
    let dir = staging_dir(&request.output);

    let merged = stage(&dir)?;
    merge_pages(&request.sources, &request.pages, merged.path())?;
    let mut current = merged;

    if !request.annotations.is_empty() {
        let annotated = stage(&dir)?;
        let mut session = AnnotationSession::open(current.path())?;
        session.add_batch(&request.annotations)?;
        session.save(annotated.path())?;
        session.close();
        current = annotated;
    }

    if let Some(settings) = &request.signature {
        let signed = stage(&dir)?;
        let sign_request = SignRequest::new(
            current.path(),
            signed.path(),
            &settings.certificate,
            settings.password.as_str(),
        )
        .reason(settings.reason.as_str())
        .location(settings.location.as_str())
        .contact(settings.contact.as_str());
        signer.sign_pdf(&sign_request)?;
        current = signed;
    }

    current
        .persist(&request.output)
        .map_err(|e| PipelineError::Persist {
            path: request.output.clone(),
            source: e.error,
        })?;

    let summary = ApplySummary {
        pages: request.pages.len(),
        annotations: request.annotations.len(),
        signed: request.signature.is_some(),
    };
    info!(
        output = %request.output.display(),
        pages = summary.pages,
        annotations = summary.annotations,
        signed = summary.signed,
        "applied changes"
    );
    Ok(summary)
}

fn staging_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn stage(dir: &Path) -> Result<NamedTempFile, PipelineError> {
    tempfile::Builder::new()
        .prefix(".pdfedit-")
        .suffix(".pdf")
        .tempfile_in(dir)
        .map_err(|source| PipelineError::Staging {
            dir: dir.to_path_buf(),
            source,
        })
}

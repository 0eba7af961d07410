//! "Sign PDFs" tab

use crate::dialog::{Feedback, Notice};
use crate::files;
use crate::pickers;
use eframe::egui;
use pdfedit_core::{SignRequest, Signer};
use std::path::Path;

#[derive(Default)]
pub struct SignTab {
    pdf_input: String,
    certificate_input: String,
    password: String,
    reason: String,
    location: String,
    contact: String,
    output_input: String,
    status: String,
}

impl std::fmt::Debug for SignTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignTab")
            .field("pdf_input", &self.pdf_input)
            .field("certificate_input", &self.certificate_input)
            .field("password", &"<redacted>")
            .field("output_input", &self.output_input)
            .finish_non_exhaustive()
    }
}

impl SignTab {
    pub fn set_pdf(&mut self, path: &Path) {
        self.pdf_input = path.display().to_string();
    }

    /// Checks the required fields and builds the signer request.
    pub fn request(&self) -> Result<SignRequest, Notice> {
        let Some(pdf) = files::parse_path(&self.pdf_input) else {
            return Err(Notice::warning("No PDF", "Please select a PDF file to sign."));
        };
        let Some(certificate) = files::parse_path(&self.certificate_input) else {
            return Err(Notice::warning("No Certificate", "Please select a certificate file."));
        };
        if self.password.is_empty() {
            return Err(Notice::warning("No Password", "Please enter the certificate password."));
        }

        let output = match files::output_path(&self.output_input) {
            Some(path) => path,
            None => files::unused_default(files::suggested_output(&pdf, "signed"))?,
        };
        Ok(SignRequest::new(pdf, output, certificate, self.password.clone())
            .reason(self.reason.trim())
            .location(self.location.trim())
            .contact(self.contact.trim()))
    }

    pub fn sign(&mut self, signer: &Signer) -> Result<Notice, Notice> {
        let request = self.request()?;
        match signer.sign_pdf(&request) {
            Ok(()) => {
                self.status = format!("Signed PDF saved to {}", request.output.display());
                Ok(Notice::info(
                    "Success",
                    format!("PDF signed successfully:\n{}", request.output.display()),
                ))
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                Err(Notice::error("Signing Error", e.to_string()))
            }
        }
    }

    /// Validates the signatures of the file in the PDF field.
    pub fn validate(&mut self, signer: &Signer) -> Result<Notice, Notice> {
        let Some(pdf) = files::parse_path(&self.pdf_input) else {
            return Err(Notice::warning("No PDF", "Please select a signed PDF to validate."));
        };
        match signer.validate_signature(&pdf) {
            Ok(report) => {
                self.status = "Signature validated".to_string();
                Ok(Notice::info(
                    "Validation Result",
                    format!("Signature validation result:\n\n{}", report.trim_end()),
                ))
            }
            Err(e) => {
                self.status = format!("Validation error: {}", e);
                Err(Notice::error("Validation Error", e.to_string()))
            }
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, feedback: &mut Feedback, signer: &Signer) {
        egui::Grid::new("sign_required").num_columns(2).show(ui, |ui| {
            ui.label("PDF to Sign:");
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.pdf_input);
                if ui.button("Browse…").clicked() {
                    if let Some(path) = pickers::pick_pdf("Select PDF to Sign") {
                        self.set_pdf(&path);
                    }
                }
            });
            ui.end_row();
            ui.label("Certificate (.p12):");
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.certificate_input);
                if ui.button("Browse…").clicked() {
                    if let Some(path) = pickers::pick_certificate() {
                        self.certificate_input = path.display().to_string();
                    }
                }
            });
            ui.end_row();
            ui.label("Certificate Password:");
            ui.add(egui::TextEdit::singleline(&mut self.password).password(true));
            ui.end_row();
        });

        ui.group(|ui| {
            ui.label("Optional Information");
            egui::Grid::new("sign_optional").num_columns(2).show(ui, |ui| {
                ui.label("Reason:");
                ui.text_edit_singleline(&mut self.reason);
                ui.end_row();
                ui.label("Location:");
                ui.text_edit_singleline(&mut self.location);
                ui.end_row();
                ui.label("Contact:");
                ui.text_edit_singleline(&mut self.contact);
                ui.end_row();
            });
        });

        ui.horizontal(|ui| {
            ui.label("Output:");
            let hint = files::parse_path(&self.pdf_input)
                .map(|pdf| files::suggested_output(&pdf, "signed").display().to_string())
                .unwrap_or_default();
            ui.add(egui::TextEdit::singleline(&mut self.output_input).hint_text(hint));
            if ui.button("Save As…").clicked() {
                let suggested = files::parse_path(&self.pdf_input)
                    .map(|pdf| files::suggested_output(&pdf, "signed"));
                if let Some(path) = pickers::save_pdf("Save Signed PDF", suggested.as_deref()) {
                    self.output_input = path.display().to_string();
                }
            }
        });

        ui.horizontal(|ui| {
            if ui.button("Sign PDF").clicked() {
                match self.sign(signer) {
                    Ok(notice) | Err(notice) => feedback.notify(notice),
                }
            }
            if ui.button("Validate Signature").clicked() {
                match self.validate(signer) {
                    Ok(notice) | Err(notice) => feedback.notify(notice),
                }
            }
        });
        ui.label(self.status.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_pdf;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn filled(dir: &Path) -> SignTab {
        let certificate = dir.join("me.p12");
        std::fs::write(&certificate, b"not a real bundle").unwrap();
        SignTab {
            pdf_input: write_pdf(dir, "doc.pdf", 1).display().to_string(),
            certificate_input: certificate.display().to_string(),
            password: "secret".into(),
            reason: "  Approval ".into(),
            ..SignTab::default()
        }
    }

    #[test]
    fn test_required_fields_in_order() {
        let mut tab = SignTab::default();
        assert_eq!(tab.request().unwrap_err().title, "No PDF");
        tab.pdf_input = "doc.pdf".into();
        assert_eq!(tab.request().unwrap_err().title, "No Certificate");
        tab.certificate_input = "me.p12".into();
        assert_eq!(tab.request().unwrap_err().title, "No Password");
        tab.password = "pw".into();
        assert!(tab.request().is_ok());
    }

    #[test]
    fn test_request_defaults_output_and_trims_optional_fields() {
        let dir = tempdir().unwrap();
        let request = filled(dir.path()).request().unwrap();
        assert_eq!(request.output, dir.path().join("doc_signed.pdf"));
        assert_eq!(request.reason, "Approval");
        assert_eq!(request.location, "");
    }

    #[test]
    fn test_existing_default_output_needs_explicit_choice() {
        let dir = tempdir().unwrap();
        let mut tab = filled(dir.path());
        std::fs::write(dir.path().join("doc_signed.pdf"), b"signed earlier").unwrap();
        assert_eq!(tab.request().unwrap_err().title, "Output Exists");

        tab.output_input = dir.path().join("doc_signed.pdf").display().to_string();
        assert_eq!(tab.request().unwrap().output, dir.path().join("doc_signed.pdf"));
    }

    #[test]
    fn test_missing_signer_is_reported() {
        let dir = tempdir().unwrap();
        let mut tab = filled(dir.path());
        let notice = tab.sign(&Signer::new("pdfedit-no-such-signer")).unwrap_err();
        assert_eq!(notice.title, "Signing Error");
        assert!(notice.message.contains("not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_validation_report_is_shown() {
        let dir = tempdir().unwrap();
        let mut tab = filled(dir.path());
        let notice = tab.validate(&Signer::new("echo")).unwrap();
        assert_eq!(notice.title, "Validation Result");
        assert!(notice.message.contains("sign validate"));
    }
}

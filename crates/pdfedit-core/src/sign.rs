//! Digital signatures through the external pyHanko signer
//!
//! Signing and validation are delegated to the `pyhanko` command line tool;
//! this module checks inputs, builds its argument list and maps its exit
//! status to [`SignError`].

use crate::error::SignError;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, error, info};

pub const DEFAULT_SIGNER_PROGRAM: &str = "pyhanko";

/// Everything needed for one `sign addsig` invocation.
#[derive(Clone, Default)]
pub struct SignRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub certificate: PathBuf,
    pub password: String,
    pub reason: String,
    pub location: String,
    pub contact: String,
}

impl SignRequest {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        certificate: impl Into<PathBuf>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            certificate: certificate.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }
}

impl std::fmt::Debug for SignRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignRequest")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("certificate", &self.certificate)
            .field("password", &"<redacted>")
            .field("reason", &self.reason)
            .field("location", &self.location)
            .field("contact", &self.contact)
            .finish()
    }
}

/// Handle on the signer program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signer {
    program: String,
}

impl Default for Signer {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNER_PROGRAM)
    }
}

impl Signer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Sign `request.input` with a PKCS#12 certificate into `request.output`.
    pub fn sign_pdf(&self, request: &SignRequest) -> Result<(), SignError> {
        if !request.input.exists() {
            return Err(SignError::InputNotFound(request.input.clone()));
        }
        if !request.certificate.exists() {
            return Err(SignError::CertificateNotFound(request.certificate.clone()));
        }
        if !crate::has_extension(&request.certificate, "p12") {
            return Err(SignError::NotP12(request.certificate.clone()));
        }

        let output = self.run(build_args(request))?;
        if !output.status.success() {
            let reason = failure_reason(&output);
            error!(program = %self.program, %reason, "signing failed");
            return Err(SignError::Failed(reason));
        }

        debug!(stdout = %String::from_utf8_lossy(&output.stdout), "signer output");
        info!(
            input = %request.input.display(),
            output = %request.output.display(),
            "signed PDF"
        );
        Ok(())
    }

    /// Run the signer's validation and return its report verbatim.
    pub fn validate_signature(&self, path: impl AsRef<Path>) -> Result<String, SignError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SignError::PdfNotFound(path.to_path_buf()));
        }

        let args = vec![
            OsString::from("sign"),
            OsString::from("validate"),
            path.as_os_str().to_owned(),
        ];
        let output = self.run(args)?;
        if !output.status.success() {
            let reason = failure_reason(&output);
            error!(program = %self.program, %reason, "validation failed");
            return Err(SignError::ValidationFailed(reason));
        }

        info!(path = %path.display(), "validated signature");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run(&self, args: Vec<OsString>) -> Result<Output, SignError> {
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| self.launch_error(e))
    }

    fn launch_error(&self, e: io::Error) -> SignError {
        if e.kind() == io::ErrorKind::NotFound {
            error!(program = %self.program, "signer not installed");
            SignError::NotInstalled {
                program: self.program.clone(),
            }
        } else {
            SignError::Launch {
                program: self.program.clone(),
                reason: e.to_string(),
            }
        }
    }
}

/// `sign addsig` argument list; empty optional fields are left out.
pub(crate) fn build_args(request: &SignRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "sign".into(),
        "addsig".into(),
        "--p12-file".into(),
        request.certificate.as_os_str().to_owned(),
        "--p12-password".into(),
        request.password.as_str().into(),
    ];

    let optional = [
        ("--reason", &request.reason),
        ("--location", &request.location),
        ("--contact-info", &request.contact),
    ];
    for (flag, value) in optional {
        if !value.is_empty() {
            args.push(flag.into());
            args.push(value.as_str().into());
        }
    }

    args.push(request.input.as_os_str().to_owned());
    args.push("-o".into());
    args.push(request.output.as_os_str().to_owned());
    args
}

fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        output.status.to_string()
    } else {
        stderr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        dir: TempDir,
        input: PathBuf,
        certificate: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.pdf");
        let certificate = dir.path().join("signer.p12");
        std::fs::write(&input, b"%PDF-1.5").unwrap();
        std::fs::write(&certificate, b"pkcs12").unwrap();
        Fixture {
            dir,
            input,
            certificate,
        }
    }

    fn request(fixture: &Fixture) -> SignRequest {
        SignRequest::new(
            &fixture.input,
            fixture.dir.path().join("signed.pdf"),
            &fixture.certificate,
            "secret",
        )
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_args_omit_empty_optional_fields() {
        let request = SignRequest::new("in.pdf", "out.pdf", "cert.p12", "pw");
        assert_eq!(
            strings(build_args(&request)),
            vec![
                "sign", "addsig", "--p12-file", "cert.p12", "--p12-password", "pw", "in.pdf", "-o",
                "out.pdf"
            ]
        );
    }

    #[test]
    fn test_args_include_metadata_flags() {
        let request = SignRequest::new("in.pdf", "out.pdf", "cert.p12", "pw")
            .reason("Approved")
            .location("Berlin")
            .contact("legal@example.com");
        assert_eq!(
            strings(build_args(&request)),
            vec![
                "sign",
                "addsig",
                "--p12-file",
                "cert.p12",
                "--p12-password",
                "pw",
                "--reason",
                "Approved",
                "--location",
                "Berlin",
                "--contact-info",
                "legal@example.com",
                "in.pdf",
                "-o",
                "out.pdf",
            ]
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let request = SignRequest::new("in.pdf", "out.pdf", "cert.p12", "hunter2");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_missing_input_checked_first() {
        let fixture = fixture();
        let mut request = request(&fixture);
        request.input = fixture.dir.path().join("missing.pdf");
        request.certificate = fixture.dir.path().join("missing.p12");

        let err = Signer::new("definitely-not-a-real-program").sign_pdf(&request).unwrap_err();
        assert!(matches!(err, SignError::InputNotFound(_)));
    }

    #[test]
    fn test_missing_certificate() {
        let fixture = fixture();
        let mut request = request(&fixture);
        request.certificate = fixture.dir.path().join("missing.p12");

        let err = Signer::default().sign_pdf(&request).unwrap_err();
        assert!(matches!(err, SignError::CertificateNotFound(_)));
    }

    #[test]
    fn test_certificate_must_be_p12() {
        let fixture = fixture();
        let pem = fixture.dir.path().join("signer.pem");
        std::fs::write(&pem, b"pem").unwrap();
        let mut request = request(&fixture);
        request.certificate = pem;

        let err = Signer::default().sign_pdf(&request).unwrap_err();
        assert!(matches!(err, SignError::NotP12(_)));
    }

    #[test]
    fn test_uppercase_p12_extension_accepted() {
        let fixture = fixture();
        let upper = fixture.dir.path().join("SIGNER.P12");
        std::fs::write(&upper, b"pkcs12").unwrap();
        let mut request = request(&fixture);
        request.certificate = upper;

        let err = Signer::new("definitely-not-a-real-program").sign_pdf(&request).unwrap_err();
        assert!(matches!(err, SignError::NotInstalled { .. }));
    }

    #[test]
    fn test_missing_program_reports_not_installed() {
        let fixture = fixture();
        let err = Signer::new("definitely-not-a-real-program")
            .sign_pdf(&request(&fixture))
            .unwrap_err();
        assert!(err.to_string().contains("command not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_exit_is_success() {
        let fixture = fixture();
        Signer::new("true").sign_pdf(&request(&fixture)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_exit_reports_failure() {
        let fixture = fixture();
        let err = Signer::new("false").sign_pdf(&request(&fixture)).unwrap_err();
        assert!(matches!(err, SignError::Failed(_)));
        assert!(err.to_string().starts_with("Failed to sign PDF"));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_returns_stdout() {
        let fixture = fixture();
        let report = Signer::new("echo").validate_signature(&fixture.input).unwrap();
        assert!(report.starts_with("sign validate"));
        assert!(report.contains("input.pdf"));
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = tempdir().unwrap();
        let err = Signer::default()
            .validate_signature(dir.path().join("nope.pdf"))
            .unwrap_err();
        assert!(matches!(err, SignError::PdfNotFound(_)));
    }
}

//! Command line and environment configuration

use clap::{Parser, ValueEnum};
use pdfedit_core::DEFAULT_SIGNER_PROGRAM;
use std::path::PathBuf;

/// Which main window to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Layout {
    /// Separate Merge, Annotate and Sign tabs
    #[default]
    Tabs,
    /// Single editor with page list, viewer and toolbar
    Unified,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pdfedit")]
#[command(version, about = "Merge, annotate and sign PDF documents")]
pub struct Args {
    /// Window layout
    #[arg(long, value_enum, env = "PDFEDIT_LAYOUT", default_value_t = Layout::Tabs)]
    pub layout: Layout,

    /// Program used for signing and signature validation
    #[arg(long, env = "PDFEDIT_SIGNER", default_value = DEFAULT_SIGNER_PROGRAM)]
    pub signer: String,

    /// Directory containing the Pdfium shared library
    #[arg(long, env = "PDFIUM_DYNAMIC_LIB_PATH")]
    pub pdfium_dir: Option<PathBuf>,

    /// PDF files to load at startup
    pub files: Vec<PathBuf>,
}

/// Settings the application runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub layout: Layout,
    pub signer_program: String,
    pub pdfium_dir: Option<PathBuf>,
    pub initial_files: Vec<PathBuf>,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        Self {
            layout: args.layout,
            signer_program: args.signer,
            pdfium_dir: args.pdfium_dir,
            initial_files: args.files,
        }
    }
}

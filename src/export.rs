//! Print and image export through the `typst` compiler.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tera::Tera;

use crate::document;
use crate::errors::{Error, Result};
use crate::model::QuoteRecord;
use crate::settings::CompanyInfo;

pub struct Exporter {
    output_dir: PathBuf,
    tera: Tera,
    company: CompanyInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdf,
    Png,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Png => "png",
        }
    }
}

/// `orcamento-<id>.<ext>`
pub fn file_name(record: &QuoteRecord, format: Format) -> String {
    format!("orcamento-{}.{}", record.id, format.extension())
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, tera: Tera, company: CompanyInfo) -> Self {
        Exporter {
            output_dir: output_dir.into(),
            tera,
            company,
        }
    }

    /// Writes the typst source next to where the compiled file will go.
    /// Every failure is an [`Error::Export`] so the caller can retry.
    pub fn write_source(&self, record: &QuoteRecord) -> Result<PathBuf> {
        let source = document::render(&self.tera, record, &self.company)
            .map_err(|e| Error::Export(format!("failed to render quote: {}", e)))?;
        let typ_path = self.output_dir.join(format!("orcamento-{}.typ", record.id));
        fs::create_dir_all(&self.output_dir)
            .and_then(|_| fs::write(&typ_path, source))
            .map_err(|e| Error::Export(format!("failed to write {:?}: {}", typ_path, e)))?;
        Ok(typ_path)
    }

    /// Compiles the quote. Failures are retryable by calling again.
    pub fn compile(&self, record: &QuoteRecord, format: Format) -> Result<PathBuf> {
        // Check if Typst is installed
        if Command::new("typst").arg("--version").output().is_err() {
            return Err(Error::Export(
                "'typst' não está instalado (https://typst.app).".to_string(),
            ));
        }

        let typ_path = self.write_source(record)?;
        let out_path = self.output_dir.join(file_name(record, format));

        let mut cmd = Command::new("typst");
        cmd.arg("compile");
        if format == Format::Png {
            // pixel ratio 2
            cmd.args(["--format", "png", "--ppi", "144"]);
        }
        cmd.arg(&typ_path).arg(&out_path);

        tracing::debug!("Running {:?}", cmd);
        match cmd.status() {
            Ok(s) if s.success() => Ok(out_path),
            Ok(s) => Err(Error::Export(format!("typst exited with {}", s))),
            Err(e) => Err(Error::Export(format!("failed to run typst: {}", e))),
        }
    }

    /// Builds the PDF and hands it to the system viewer for printing.
    pub fn print(&self, record: &QuoteRecord) -> Result<PathBuf> {
        let pdf_path = self.compile(record, Format::Pdf)?;
        open_path(&pdf_path);
        Ok(pdf_path)
    }

    pub fn export_image(&self, record: &QuoteRecord) -> Result<PathBuf> {
        let png_path = self.compile(record, Format::Png)?;
        reveal(&png_path);
        Ok(png_path)
    }
}

pub fn open_path(path: &Path) {
    #[cfg(target_os = "macos")]
    Command::new("open").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(path).spawn().ok();

    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(path).spawn().ok();
}

// Helper: reveal file in Finder/Explorer
fn reveal(path: &Path) {
    #[cfg(target_os = "macos")]
    Command::new("open").arg("-R").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer")
        .arg(format!("/select,{}", path.to_string_lossy()))
        .spawn()
        .ok();

    #[cfg(target_os = "linux")]
    if let Some(parent) = path.parent() {
        Command::new("xdg-open").arg(parent).spawn().ok();
    }
}

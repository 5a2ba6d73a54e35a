//! compass-export
//!
//! Assessment reports: result → report data → rendered text (Tera) →
//! PDF or DOCX bytes. Both output formats read the same line grammar,
//! see [`layout`].

pub mod docx;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod render;
pub mod styles;

use serde::{Deserialize, Serialize};

use error::ExportError;
use render::ReportData;
use styles::ReportStyles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }
}

/// Render report data and produce the requested file.
pub fn export_report(
    data: &ReportData,
    format: ExportFormat,
    styles: &ReportStyles,
) -> Result<Vec<u8>, ExportError> {
    let rendered = render::render_report(data)?;
    tracing::debug!(format = format.extension(), chars = rendered.len(), "report rendered");
    match format {
        ExportFormat::Pdf => pdf::generate_pdf(&data.title, &rendered, styles),
        ExportFormat::Docx => docx::generate_docx(&rendered, styles),
    }
}

use serde::{Deserialize, Serialize};

/// Typography shared by the PDF and DOCX renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStyles {
    /// DOCX body font. PDF output always uses Helvetica.
    pub body_font: String,

    /// Body text size in points.
    pub body_size: usize,

    /// Heading sizes in points, levels 1 to 3.
    pub heading_sizes: [usize; 3],

    /// Characters per line before PDF text wraps.
    pub pdf_wrap_chars: usize,
}

impl ReportStyles {
    pub fn heading_size(&self, level: u8) -> usize {
        let index = usize::from(level.clamp(1, 3)) - 1;
        self.heading_sizes[index]
    }
}

impl Default for ReportStyles {
    fn default() -> Self {
        Self {
            body_font: "Calibri".to_string(),
            body_size: 11,
            heading_sizes: [20, 15, 12],
            pdf_wrap_chars: 90,
        }
    }
}

use crate::error::ExtractError;

/// Turns a page image into text.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, png: &[u8]) -> Result<String, ExtractError>;
}

/// Tesseract via the system `libtesseract`.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct Tesseract {
    tessdata_dir: std::path::PathBuf,
    lang: String,
}

#[cfg(feature = "ocr")]
impl Tesseract {
    pub fn new(tessdata_dir: &std::path::Path) -> Result<Self, ExtractError> {
        if !tessdata_dir.join("eng.traineddata").exists() {
            return Err(ExtractError::Ocr(format!(
                "eng.traineddata not found in {}",
                tessdata_dir.display()
            )));
        }
        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
            lang: "eng".to_string(),
        })
    }

    pub fn with_languages(mut self, langs: &str) -> Self {
        self.lang = langs.to_string();
        self
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for Tesseract {
    fn recognize(&self, png: &[u8]) -> Result<String, ExtractError> {
        let tessdata = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| ExtractError::Ocr("invalid tessdata path".into()))?;

        let mut tess = tesseract::Tesseract::new(Some(tessdata), Some(&self.lang))
            .map_err(|e| ExtractError::Ocr(format!("{e:?}")))?
            .set_image_from_mem(png)
            .map_err(|e| ExtractError::Ocr(format!("{e:?}")))?;

        tess.get_text()
            .map_err(|e| ExtractError::Ocr(format!("{e:?}")))
    }
}

/// Build the OCR engine for this build, if any.
pub fn default_engine(
    tessdata_dir: Option<&std::path::Path>,
) -> Option<std::sync::Arc<dyn OcrEngine>> {
    #[cfg(feature = "ocr")]
    {
        let dir = tessdata_dir.unwrap_or(std::path::Path::new("/usr/share/tesseract-ocr/5/tessdata"));
        match Tesseract::new(dir) {
            Ok(engine) => return Some(std::sync::Arc::new(engine)),
            Err(e) => tracing::warn!(error = %e, "tesseract unavailable, OCR stage disabled"),
        }
    }
    #[cfg(not(feature = "ocr"))]
    {
        let _ = tessdata_dir;
        tracing::info!("built without the ocr feature, OCR stage disabled");
    }
    None
}

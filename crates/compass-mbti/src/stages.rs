//! The individual extraction strategies.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;

use compass_bedrock::extract;
use compass_core::models::mbti::MbtiType;

use crate::error::ExtractError;
use crate::images;
use crate::ocr::OcrEngine;
use crate::patterns::find_type;
use crate::raw;

/// Extracted text shorter than this is treated as "no text layer".
pub const MIN_TEXT_CHARS: usize = 100;

/// State shared by the stages of one run.
pub struct ExtractionContext {
    pub pdf: Arc<Vec<u8>>,
    pub filename: String,
    /// The longest text any stage has recovered so far.
    pub best_text: Option<String>,
    /// PNG page images, filled by the OCR stage.
    pub page_images: Vec<Vec<u8>>,
}

impl ExtractionContext {
    pub fn new(pdf: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            pdf: Arc::new(pdf),
            filename: filename.into(),
            best_text: None,
            page_images: Vec::new(),
        }
    }

    /// Keep `text` if it is longer than what we already have.
    pub fn offer_text(&mut self, text: String) {
        let current = self.best_text.as_ref().map_or(0, |t| t.trim().len());
        if text.trim().len() > current {
            self.best_text = Some(text);
        }
    }

    fn has_usable_text(&self) -> bool {
        self.best_text
            .as_ref()
            .is_some_and(|t| t.trim().len() >= MIN_TEXT_CHARS)
    }
}

/// One way of finding the type. `Ok(None)` means "not found here"; the
/// chain moves on either way.
#[async_trait]
pub trait TypeExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(&self, ctx: &mut ExtractionContext) -> Result<Option<MbtiType>, ExtractError>;
}

/// The PDF text layer.
pub struct PdfTextStage;

#[async_trait]
impl TypeExtractor for PdfTextStage {
    fn name(&self) -> &'static str {
        "pdf_text"
    }

    async fn extract(&self, ctx: &mut ExtractionContext) -> Result<Option<MbtiType>, ExtractError> {
        let pdf = Arc::clone(&ctx.pdf);
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
            .await?
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;

        ctx.offer_text(text.clone());
        if text.trim().len() < MIN_TEXT_CHARS {
            tracing::debug!(chars = text.trim().len(), "text layer too short");
            return Ok(None);
        }
        Ok(find_type(&text))
    }
}

/// OCR over embedded page images. Page images are collected even without
/// an OCR engine so the vision stage can use them.
pub struct OcrStage {
    engine: Option<Arc<dyn OcrEngine>>,
}

impl OcrStage {
    pub fn new(engine: Option<Arc<dyn OcrEngine>>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TypeExtractor for OcrStage {
    fn name(&self) -> &'static str {
        "ocr"
    }

    async fn extract(&self, ctx: &mut ExtractionContext) -> Result<Option<MbtiType>, ExtractError> {
        let pdf = Arc::clone(&ctx.pdf);
        ctx.page_images = tokio::task::spawn_blocking(move || images::page_images(&pdf)).await??;
        tracing::debug!(pages = ctx.page_images.len(), "collected page images");

        let Some(engine) = self.engine.clone() else {
            return Ok(None);
        };
        if ctx.has_usable_text() || ctx.page_images.is_empty() {
            return Ok(None);
        }

        let pages = ctx.page_images.clone();
        let text = tokio::task::spawn_blocking(move || {
            pages
                .iter()
                .map(|page| engine.recognize(page))
                .collect::<Result<Vec<_>, _>>()
                .map(|texts| texts.join("\n"))
        })
        .await??;

        let found = find_type(&text);
        ctx.offer_text(text);
        Ok(found)
    }
}

/// Heuristic scan of the raw file bytes.
pub struct RawBufferStage;

#[async_trait]
impl TypeExtractor for RawBufferStage {
    fn name(&self) -> &'static str {
        "raw_buffer"
    }

    async fn extract(&self, ctx: &mut ExtractionContext) -> Result<Option<MbtiType>, ExtractError> {
        let pdf = Arc::clone(&ctx.pdf);
        Ok(tokio::task::spawn_blocking(move || raw::scan(&pdf)).await?)
    }
}

/// Bedrock model ids for the model stages.
#[derive(Debug, Clone)]
pub struct ModelIds {
    pub text: String,
    pub document: String,
    pub vision: String,
}

/// A cheap text model reading the best text recovered so far.
pub struct TextModelStage {
    client: BedrockClient,
    model_id: String,
}

impl TextModelStage {
    pub fn new(client: BedrockClient, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl TypeExtractor for TextModelStage {
    fn name(&self) -> &'static str {
        "text_model"
    }

    async fn extract(&self, ctx: &mut ExtractionContext) -> Result<Option<MbtiType>, ExtractError> {
        let Some(text) = ctx.best_text.as_deref().filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };
        let reply = extract::identify_type_from_text(&self.client, &self.model_id, text).await?;
        Ok(find_type(&reply))
    }
}

/// The whole PDF sent as a document to the model.
pub struct DocumentModelStage {
    client: BedrockClient,
    model_id: String,
}

impl DocumentModelStage {
    pub fn new(client: BedrockClient, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl TypeExtractor for DocumentModelStage {
    fn name(&self) -> &'static str {
        "document_model"
    }

    async fn extract(&self, ctx: &mut ExtractionContext) -> Result<Option<MbtiType>, ExtractError> {
        let reply = extract::identify_type_from_document(
            &self.client,
            &self.model_id,
            &ctx.pdf,
            &ctx.filename,
        )
        .await?;
        Ok(find_type(&reply))
    }
}

/// Page images sent to a vision model. Skipped when there are none.
pub struct VisionModelStage {
    client: BedrockClient,
    model_id: String,
}

impl VisionModelStage {
    pub fn new(client: BedrockClient, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl TypeExtractor for VisionModelStage {
    fn name(&self) -> &'static str {
        "vision_model"
    }

    async fn extract(&self, ctx: &mut ExtractionContext) -> Result<Option<MbtiType>, ExtractError> {
        if ctx.page_images.is_empty() {
            return Ok(None);
        }
        let reply =
            extract::identify_type_from_images(&self.client, &self.model_id, &ctx.page_images)
                .await?;
        Ok(find_type(&reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_text_keeps_the_longest() {
        let mut ctx = ExtractionContext::new(Vec::new(), "r.pdf");
        ctx.offer_text("short".to_string());
        ctx.offer_text("   ".to_string());
        assert_eq!(ctx.best_text.as_deref(), Some("short"));
        ctx.offer_text("a little longer".to_string());
        assert_eq!(ctx.best_text.as_deref(), Some("a little longer"));
        assert!(!ctx.has_usable_text());
    }

    #[tokio::test]
    async fn raw_stage_reads_literals() {
        let mut ctx = ExtractionContext::new(b"BT (You are an INTJ) Tj ET".to_vec(), "r.pdf");
        let found = RawBufferStage.extract(&mut ctx).await.unwrap();
        assert_eq!(found.map(|t| t.to_string()).as_deref(), Some("INTJ"));
    }

    #[tokio::test]
    async fn ocr_stage_reports_unreadable_pdf() {
        let mut ctx = ExtractionContext::new(b"not a pdf".to_vec(), "r.pdf");
        assert!(OcrStage::new(None).extract(&mut ctx).await.is_err());
    }
}

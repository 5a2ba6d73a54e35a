use std::sync::Arc;

use aws_sdk_bedrockruntime::Client as BedrockClient;
use tracing::{info, warn};

use compass_core::models::mbti::MbtiType;

use crate::error::ExtractError;
use crate::ocr::OcrEngine;
use crate::stages::{
    DocumentModelStage, ExtractionContext, ModelIds, OcrStage, PdfTextStage, RawBufferStage,
    TextModelStage, TypeExtractor, VisionModelStage,
};

/// A successful extraction and the stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub mbti_type: MbtiType,
    pub stage: &'static str,
}

/// Ordered list of extraction stages.
pub struct ExtractionChain {
    stages: Vec<Box<dyn TypeExtractor>>,
}

impl ExtractionChain {
    pub fn new(stages: Vec<Box<dyn TypeExtractor>>) -> Self {
        Self { stages }
    }

    /// The stages that need no network access: text layer, OCR, raw bytes.
    pub fn local(ocr: Option<Arc<dyn OcrEngine>>) -> Self {
        Self::new(vec![
            Box::new(PdfTextStage),
            Box::new(OcrStage::new(ocr)),
            Box::new(RawBufferStage),
        ])
    }

    /// Append the Bedrock stages: text, document, then vision.
    pub fn with_models(mut self, client: BedrockClient, models: &ModelIds) -> Self {
        self.stages
            .push(Box::new(TextModelStage::new(client.clone(), &models.text)));
        self.stages.push(Box::new(DocumentModelStage::new(
            client.clone(),
            &models.document,
        )));
        self.stages
            .push(Box::new(VisionModelStage::new(client, &models.vision)));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Try each stage in order. A failing stage is logged and skipped; only
    /// running out of stages is an error.
    pub async fn run(&self, pdf: Vec<u8>, filename: &str) -> Result<Extraction, ExtractError> {
        let mut ctx = ExtractionContext::new(pdf, filename);

        for stage in &self.stages {
            match stage.extract(&mut ctx).await {
                Ok(Some(mbti_type)) => {
                    info!(stage = stage.name(), mbti_type = %mbti_type, "mbti type extracted");
                    return Ok(Extraction {
                        mbti_type,
                        stage: stage.name(),
                    });
                }
                Ok(None) => {
                    tracing::debug!(stage = stage.name(), "stage found no type");
                }
                Err(e) => {
                    warn!(stage = stage.name(), error = %e, "extraction stage failed");
                }
            }
        }

        Err(ExtractError::NoTypeFound)
    }
}

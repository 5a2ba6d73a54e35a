use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lopdf::dictionary;
use lopdf::{Document, Object, Stream};

use compass_core::models::mbti::MbtiType;
use compass_mbti::stages::{ExtractionContext, PdfTextStage, TypeExtractor};
use compass_mbti::{ExtractError, ExtractionChain};

/// Build a one-page PDF with a Helvetica text layer.
fn text_pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let content = format!("BT /F1 12 Tf 72 700 Td ({text}) Tj ET");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    });

    if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
        dict.set("Parent", pages_id);
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Stage with a scripted outcome that counts its calls.
struct Scripted {
    name: &'static str,
    outcome: Option<Result<&'static str, ()>>,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(name: &'static str, outcome: Option<Result<&'static str, ()>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                outcome,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl TypeExtractor for Scripted {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn extract(&self, _ctx: &mut ExtractionContext) -> Result<Option<MbtiType>, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            None => Ok(None),
            Some(Ok(code)) => Ok(Some(code.parse().unwrap())),
            Some(Err(())) => Err(ExtractError::Ocr("scripted failure".to_string())),
        }
    }
}

#[tokio::test]
async fn first_successful_stage_wins() {
    let (empty, empty_calls) = Scripted::new("empty", None);
    let (failing, failing_calls) = Scripted::new("failing", Some(Err(())));
    let (hit, hit_calls) = Scripted::new("hit", Some(Ok("ENFP")));
    let (later, later_calls) = Scripted::new("later", Some(Ok("ISTJ")));

    let chain = ExtractionChain::new(vec![
        Box::new(empty),
        Box::new(failing),
        Box::new(hit),
        Box::new(later),
    ]);
    let extraction = chain.run(Vec::new(), "report.pdf").await.unwrap();

    assert_eq!(extraction.mbti_type.as_str(), "ENFP");
    assert_eq!(extraction.stage, "hit");
    assert_eq!(empty_calls.load(Ordering::SeqCst), 1);
    assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
    assert_eq!(hit_calls.load(Ordering::SeqCst), 1);
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn exhausting_every_stage_is_no_type_found() {
    let (a, _) = Scripted::new("a", None);
    let (b, _) = Scripted::new("b", Some(Err(())));
    let chain = ExtractionChain::new(vec![Box::new(a), Box::new(b)]);
    assert!(matches!(
        chain.run(Vec::new(), "report.pdf").await,
        Err(ExtractError::NoTypeFound)
    ));
}

#[tokio::test]
async fn text_layer_stage_reads_the_type() {
    let pdf = text_pdf(
        "Thank you for completing the assessment. After reviewing all of your answers \
         we found that your personality type is INFJ, often described as the Advocate.",
    );
    let mut ctx = ExtractionContext::new(pdf, "report.pdf");
    let found = PdfTextStage.extract(&mut ctx).await.unwrap();
    assert_eq!(found.map(|t| t.to_string()).as_deref(), Some("INFJ"));
    assert!(ctx.best_text.is_some());
}

#[tokio::test]
async fn local_chain_falls_through_to_raw_bytes() {
    // Too little text for the text stage, no images for OCR, but the literal
    // is still in the content stream.
    let pdf = text_pdf("Type: ESFP");
    let chain = ExtractionChain::local(None);
    assert_eq!(chain.stage_names(), vec!["pdf_text", "ocr", "raw_buffer"]);

    let extraction = chain.run(pdf, "short.pdf").await.unwrap();
    assert_eq!(extraction.mbti_type.as_str(), "ESFP");
    assert_eq!(extraction.stage, "raw_buffer");
}

#[tokio::test]
async fn local_chain_rejects_documents_without_a_type() {
    let chain = ExtractionChain::local(None);
    let result = chain
        .run(text_pdf("Quarterly conflict workshop notes"), "notes.pdf")
        .await;
    assert!(matches!(result, Err(ExtractError::NoTypeFound)));
}

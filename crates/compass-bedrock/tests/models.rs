//! Integration tests against real Bedrock models.
//!
//! These tests require valid AWS credentials and model access in the
//! environment.
//!
//! Run with: `cargo test -p compass-bedrock --test models -- --ignored`

use compass_bedrock::client::build_client;
use compass_bedrock::extract::identify_type_from_text;

const MODEL_ID: &str = "us.anthropic.claude-haiku-4-5-20251001-v1:0";

#[tokio::test]
#[ignore]
async fn text_model_reads_stated_type() {
    let client = build_client().await;
    let reply = identify_type_from_text(
        &client,
        MODEL_ID,
        "Thank you for completing the assessment. Your reported type is ENFJ, \
         sometimes called the Teacher.",
    )
    .await
    .unwrap();
    assert!(reply.contains("ENFJ"), "reply was {reply:?}");
}

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use compass_api::build_router;
use compass_api::config::AppConfig;
use compass_api::state::{AppState, Billing};
use compass_billing::client::{StripeClient, StripeConfig};
use compass_mail::MemoryMailer;
use compass_mbti::ExtractionChain;
use compass_storage::memory::MemoryStore;

const ADMIN_EMAIL: &str = "root@compass.test";
const WEBHOOK_SECRET: &str = "whsec_test";

struct Harness {
    app: Router,
    mailer: Arc<MemoryMailer>,
}

fn harness(with_billing: bool) -> Harness {
    let config = AppConfig::from_lookup(|name| match name {
        "COMPASS_DEV_MODE" => Some("1".to_string()),
        "COMPASS_ADMIN_EMAILS" => Some(ADMIN_EMAIL.to_string()),
        _ => None,
    })
    .unwrap();
    let billing = with_billing.then(|| {
        Arc::new(Billing {
            client: StripeClient::new("sk_test")
                .unwrap()
                .with_base_url("http://127.0.0.1:9"),
            config: StripeConfig {
                secret_key: "sk_test".into(),
                webhook_secret: WEBHOOK_SECRET.into(),
                price_id: None,
            },
        })
    });
    let mailer = Arc::new(MemoryMailer::new());
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        mailer.clone(),
        billing,
        ExtractionChain::local(None),
        config,
    );
    Harness {
        app: build_router(state),
        mailer,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn register(app: &Router, email: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            None,
            json!({ "email": email, "name": "Ada Lovelace", "password": "correct horse" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (body["token"].as_str().unwrap().to_string(), body["user"].clone())
}

/// Every question of a type answered with the same rating.
async fn uniform_answers(app: &Router, token: &str, kind: &str, rating: u8) -> Value {
    let (status, questions) = send(app, get(&format!("/assessments/{kind}/questions"), Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    let answers: serde_json::Map<String, Value> = questions
        .as_array()
        .unwrap()
        .iter()
        .map(|q| (q["id"].as_str().unwrap().to_string(), json!(rating)))
        .collect();
    Value::Object(answers)
}

fn multipart_pdf(token: &str, pdf: &[u8]) -> Request<Body> {
    let boundary = "compass-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"report.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(pdf);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/assessments/mbti/upload")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn register_login_and_profile() {
    let h = harness(false);
    let (token, user) = register(&h.app, "Ada@Example.com").await;
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["role"], "user");

    let (status, body) = send(
        &h.app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "correct horse" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, me) = send(&h.app, get("/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["subscription"]["status"], "none");
    assert_eq!(me["can_export"], false);

    let sent = h.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Welcome to Compass");
}

#[tokio::test]
async fn duplicate_email_and_bad_password_are_rejected() {
    let h = harness(false);
    register(&h.app, "ada@example.com").await;

    let (status, _) = send(
        &h.app,
        json_request(
            "POST",
            "/auth/register",
            None,
            json!({ "email": "ADA@example.com", "name": "Other", "password": "long enough" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &h.app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "wrong password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, unknown) = send(
        &h.app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "nobody@example.com", "password": "wrong password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, body);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let h = harness(false);
    let (status, body) = send(&h.app, get("/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&h.app, get("/results", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&h.app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_routes_check_the_role() {
    let h = harness(false);
    let (user_token, _) = register(&h.app, "ada@example.com").await;
    let (admin_token, admin) = register(&h.app, ADMIN_EMAIL).await;
    assert_eq!(admin["role"], "admin");

    let (status, _) = send(&h.app, get("/admin/users", Some(&user_token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, users) = send(&h.app, get("/admin/users", Some(&admin_token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    let (status, seeded) = send(
        &h.app,
        json_request("POST", "/admin/questions/wellness/seed", Some(&admin_token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(seeded["inserted"].as_u64().unwrap() > 0);

    let (_, again) = send(
        &h.app,
        json_request("POST", "/admin/questions/wellness/seed", Some(&admin_token), json!({})),
    )
    .await;
    assert_eq!(again["inserted"], 0);
}

#[tokio::test]
async fn role_changes_apply_to_issued_tokens() {
    let h = harness(false);
    let (admin_token, _) = register(&h.app, ADMIN_EMAIL).await;
    let (token, user) = register(&h.app, "ada@example.com").await;
    let user_uri = format!("/admin/users/{}", user["id"].as_str().unwrap());

    let (status, _) = send(
        &h.app,
        json_request("PUT", &user_uri, Some(&admin_token), json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&h.app, get("/admin/users", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &h.app,
        json_request("PUT", &user_uri, Some(&admin_token), json!({ "role": "user" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&h.app, get("/admin/users", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleted_users_lose_access() {
    let h = harness(false);
    let (admin_token, _) = register(&h.app, ADMIN_EMAIL).await;
    let (token, user) = register(&h.app, "ada@example.com").await;
    let answers = uniform_answers(&h.app, &token, "wellness", 4).await;

    let uri = format!("/admin/users/{}", user["id"].as_str().unwrap());
    let (status, _) = send(&h.app, delete(&uri, &admin_token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &h.app,
        json_request("POST", "/assessments/wellness", Some(&token), json!({ "answers": answers })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&h.app, get("/results", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, users) = send(&h.app, get("/admin/users", Some(&admin_token))).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn tki_questions_must_be_statement_pairs() {
    let h = harness(false);
    let (admin_token, _) = register(&h.app, ADMIN_EMAIL).await;
    let (token, _) = register(&h.app, "ada@example.com").await;

    let (status, body) = send(
        &h.app,
        json_request(
            "POST",
            "/admin/questions",
            Some(&admin_token),
            json!({
                "assessment_type": "tki",
                "content": "Which do you prefer?",
                "category": "whatever",
                "order": 1
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("TKI"));

    let pair = json!({
        "a": { "text": "I press my case.", "mode": "competing" },
        "b": { "text": "I let it pass.", "mode": "avoiding" }
    });
    let (status, created) = send(
        &h.app,
        json_request(
            "POST",
            "/admin/questions",
            Some(&admin_token),
            json!({
                "assessment_type": "tki",
                "content": pair.to_string(),
                "category": "whatever",
                "order": 1
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["category"], "competing/avoiding");

    let uri = format!("/admin/questions/tki/{}", created["id"].as_str().unwrap());
    let (status, _) = send(
        &h.app,
        json_request(
            "PUT",
            &uri,
            Some(&admin_token),
            json!({
                "assessment_type": "tki",
                "content": "{\"a\": 1}",
                "category": "competing/avoiding",
                "order": 1
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, questions) = send(&h.app, get("/assessments/tki/questions", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(questions.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn resubmitting_replaces_the_result() {
    let h = harness(false);
    let (token, _) = register(&h.app, "ada@example.com").await;

    let high = uniform_answers(&h.app, &token, "wellness", 5).await;
    let (status, first) = send(
        &h.app,
        json_request("POST", "/assessments/wellness", Some(&token), json!({ "answers": high })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{first}");
    assert_eq!(first["overall_score"], 100.0);

    let low = uniform_answers(&h.app, &token, "wellness", 1).await;
    let (status, _) = send(
        &h.app,
        json_request("POST", "/assessments/wellness", Some(&token), json!({ "answers": low })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, results) = send(&h.app, get("/results", Some(&token))).await;
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["overall_score"], 0.0);

    let (status, _) = send(&h.app, delete("/results/wellness", &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&h.app, get("/results/wellness", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn out_of_range_ratings_are_a_bad_request() {
    let h = harness(false);
    let (token, _) = register(&h.app, "ada@example.com").await;
    let answers = uniform_answers(&h.app, &token, "wellness", 6).await;
    let (status, body) = send(
        &h.app,
        json_request("POST", "/assessments/wellness", Some(&token), json!({ "answers": answers })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("outside 1-5"));
}

#[tokio::test]
async fn evaluator_lifecycle_and_completed_delete_conflict() {
    let h = harness(false);
    let (token, _) = register(&h.app, "ada@example.com").await;

    let (status, evaluator) = send(
        &h.app,
        json_request(
            "POST",
            "/evaluators",
            Some(&token),
            json!({ "name": "Grace", "email": "grace@example.com", "relationship": "peer" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = evaluator["id"].as_str().unwrap().to_string();
    let eval_token = evaluator["token"].as_str().unwrap().to_string();

    let (status, invited) = send(
        &h.app,
        json_request("POST", &format!("/evaluators/{id}/invite"), Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invited["status"], "invited");
    let invitation = h.mailer.sent().await.pop().unwrap();
    assert!(invitation.body.contains(&format!("/evaluate/{eval_token}")));

    let (status, page) = send(&h.app, get(&format!("/evaluations/{eval_token}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["status"], "started");
    assert_eq!(page["subject_name"], "Ada Lovelace");

    let answers: serde_json::Map<String, Value> = page["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| (q["id"].as_str().unwrap().to_string(), json!(4)))
        .collect();
    let (status, receipt) = send(
        &h.app,
        json_request(
            "POST",
            &format!("/evaluations/{eval_token}"),
            None,
            json!({ "answers": answers }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["status"], "completed");

    let (status, _) = send(
        &h.app,
        json_request(
            "POST",
            &format!("/evaluations/{eval_token}"),
            None,
            json!({ "answers": answers }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&h.app, delete(&format!("/evaluators/{id}"), &token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, list) = send(&h.app, get("/evaluators", Some(&token))).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, comparison) = send(&h.app, get("/three-sixty/comparison", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comparison["completed_evaluators"], 1);
    let first = &comparison["categories"][0];
    assert_eq!(first["others_score"], 75.0);
    assert!(first["self_score"].is_null());
}

#[tokio::test]
async fn pending_evaluators_can_be_deleted() {
    let h = harness(false);
    let (token, _) = register(&h.app, "ada@example.com").await;
    let (_, evaluator) = send(
        &h.app,
        json_request(
            "POST",
            "/evaluators",
            Some(&token),
            json!({ "name": "Grace", "email": "grace@example.com", "relationship": "manager" }),
        ),
    )
    .await;
    let id = evaluator["id"].as_str().unwrap();
    let (status, _) = send(&h.app, delete(&format!("/evaluators/{id}"), &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn mbti_upload_reads_the_type_or_answers_422() {
    let h = harness(false);
    let (token, _) = register(&h.app, "ada@example.com").await;

    let pdf = b"%PDF-1.4\n1 0 obj\n<< /Length 40 >>\nstream\nBT (Personality type: INFP) Tj ET\nendstream\nendobj\n%%EOF\n";
    let (status, body) = send(&h.app, multipart_pdf(&token, pdf)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["mbti_type"], "INFP");
    assert_eq!(body["stage"], "raw_buffer");

    let (_, result) = send(&h.app, get("/results/mbti", Some(&token))).await;
    assert_eq!(result["dominant_result"], "INFP");
    assert_eq!(result["scores"]["E_I"], 0.0);

    let blank = b"%PDF-1.4\n(nothing to see here)\n%%EOF\n";
    let (status, body) = send(&h.app, multipart_pdf(&token, blank)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, _) = send(&h.app, multipart_pdf(&token, b"plain text")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_needs_a_subscription_unless_admin() {
    let h = harness(false);
    let (token, _) = register(&h.app, "ada@example.com").await;
    let answers = uniform_answers(&h.app, &token, "wellness", 4).await;
    send(
        &h.app,
        json_request("POST", "/assessments/wellness", Some(&token), json!({ "answers": answers })),
    )
    .await;

    let (status, _) = send(
        &h.app,
        json_request("POST", "/reports/wellness/export", Some(&token), json!({ "format": "pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (admin_token, _) = register(&h.app, ADMIN_EMAIL).await;
    let answers = uniform_answers(&h.app, &admin_token, "wellness", 4).await;
    send(
        &h.app,
        json_request("POST", "/assessments/wellness", Some(&admin_token), json!({ "answers": answers })),
    )
    .await;

    let response = h
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/reports/wellness/export",
            Some(&admin_token),
            json!({ "format": "pdf" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn billing_is_unavailable_without_stripe() {
    let h = harness(false);
    let (token, _) = register(&h.app, "ada@example.com").await;
    let (status, _) = send(
        &h.app,
        json_request("POST", "/billing/checkout", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn signed_webhook_activates_the_subscription() {
    let h = harness(true);
    let (token, user) = register(&h.app, "ada@example.com").await;
    let user_id = user["id"].as_str().unwrap();

    let payload = json!({
        "type": "checkout.session.completed",
        "data": { "object": {
            "customer": "cus_123",
            "subscription": "sub_123",
            "client_reference_id": user_id,
        }},
    })
    .to_string();
    let now = jiff::Timestamp::now().as_second();
    let webhook = |signature: String| {
        Request::builder()
            .method("POST")
            .uri("/billing/webhook")
            .header("stripe-signature", signature)
            .body(Body::from(payload.clone()))
            .unwrap()
    };

    let forged = compass_billing::webhook::sign(payload.as_bytes(), now, "wrong").unwrap();
    let (status, _) = send(&h.app, webhook(format!("t={now},v1={forged}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stale = now - 3600;
    let old = compass_billing::webhook::sign(payload.as_bytes(), stale, WEBHOOK_SECRET).unwrap();
    let (status, _) = send(&h.app, webhook(format!("t={stale},v1={old}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let good = compass_billing::webhook::sign(payload.as_bytes(), now, WEBHOOK_SECRET).unwrap();
    let (status, _) = send(&h.app, webhook(format!("t={now},v1={good}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, me) = send(&h.app, get("/me", Some(&token))).await;
    assert_eq!(me["subscription"]["status"], "active");
    assert_eq!(me["can_export"], true);
}

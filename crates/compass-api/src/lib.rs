//! compass-api
//!
//! HTTP surface of Compass. Runs on Lambda behind API Gateway, or as a plain
//! TCP server for local development.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_mw;
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

/// Multipart overhead allowed on top of the upload limit.
const MULTIPART_SLACK: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/instruments", get(routes::instruments::list_instruments))
        .route(
            "/instruments/{id}",
            get(routes::instruments::get_instrument_detail),
        )
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route(
            "/evaluations/{token}",
            get(routes::evaluations::get_evaluation).post(routes::evaluations::submit_evaluation),
        )
        .route("/billing/webhook", post(routes::billing::webhook));

    let authenticated = Router::new()
        .route("/me", get(routes::me::get_me))
        .route(
            "/assessments/mbti/upload",
            post(routes::mbti::upload_report).layer(DefaultBodyLimit::max(
                routes::mbti::MAX_UPLOAD_BYTES + MULTIPART_SLACK,
            )),
        )
        .route(
            "/assessments/{type}/questions",
            get(routes::assessments::get_questions),
        )
        .route(
            "/assessments/{type}",
            post(routes::assessments::submit_assessment),
        )
        .route("/results", get(routes::results::list_results))
        .route(
            "/results/{type}",
            get(routes::results::get_result).delete(routes::results::delete_result),
        )
        .route(
            "/three-sixty/comparison",
            get(routes::three_sixty::get_comparison),
        )
        .route(
            "/evaluators",
            get(routes::evaluators::list_evaluators).post(routes::evaluators::create_evaluator),
        )
        .route(
            "/evaluators/{id}",
            delete(routes::evaluators::delete_evaluator),
        )
        .route(
            "/evaluators/{id}/invite",
            post(routes::evaluators::invite_evaluator),
        )
        .route(
            "/reports/{type}/export",
            post(routes::reports::export_report),
        )
        .route("/billing/checkout", post(routes::billing::create_checkout))
        .route("/billing/portal", post(routes::billing::create_portal))
        .route_layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let admin = Router::new()
        .route(
            "/admin/questions",
            get(routes::admin_questions::list_questions)
                .post(routes::admin_questions::create_question),
        )
        .route(
            "/admin/questions/{type}/{id}",
            put(routes::admin_questions::update_question)
                .delete(routes::admin_questions::delete_question),
        )
        .route(
            "/admin/questions/{type}/seed",
            post(routes::admin_questions::seed_questions),
        )
        .route("/admin/users", get(routes::admin_users::list_users))
        .route(
            "/admin/users/{id}",
            put(routes::admin_users::update_user).delete(routes::admin_users::delete_user),
        )
        .route_layer(axum_mw::from_fn(middleware::auth::require_admin))
        .route_layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}

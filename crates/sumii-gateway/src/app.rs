use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sumii_agent::RemoteAgent;
use sumii_artifact::email::EmailSender;
use sumii_artifact::SummaryPipeline;
use sumii_blob::BlobStore;
use sumii_core::SumiiConfig;
use sumii_db::Db;
use sumii_ocr::OcrEngine;
use sumii_orchestrator::{Turn, WebhookHandler};

use crate::anwalt_client::AnwaltClient;

/// Central shared state, passed as `Arc<AppState>` to every handler — one
/// struct tying together the DB handle and every external-boundary adapter,
/// with no module-level mutable state.
pub struct AppState {
    pub config: SumiiConfig,
    pub db: Arc<Db>,
    pub blob: Arc<dyn BlobStore>,
    pub ocr: Arc<dyn OcrEngine>,
    pub anwalt: AnwaltClient,
    pub turn: Turn,
    pub webhook: WebhookHandler,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SumiiConfig,
        db: Arc<Db>,
        blob: Arc<dyn BlobStore>,
        ocr: Arc<dyn OcrEngine>,
        agent: Arc<dyn RemoteAgent>,
        summaries: Arc<SummaryPipeline>,
        anwalt: AnwaltClient,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        let webhook = WebhookHandler {
            db: db.clone(),
            signing_secret: config.webhooks.lawyer_response_secret.clone(),
            email,
            link_base_url: config.email.link_base_url.clone(),
        };
        let turn = Turn { db: db.clone(), agent, summaries };
        Self { config, db, blob, ocr, anwalt, turn, webhook }
    }
}

/// Assembles the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/ws/chat/{conversation_id}", get(crate::ws::connection::ws_handler))
        .route("/api/v1/events/subscribe", get(crate::http::events::subscribe_handler))
        .route(
            "/api/v1/conversations",
            get(crate::http::conversations::list).post(crate::http::conversations::create),
        )
        .route(
            "/api/v1/conversations/{id}",
            get(crate::http::conversations::get_one)
                .patch(crate::http::conversations::patch)
                .delete(crate::http::conversations::delete_one),
        )
        .route(
            "/api/v1/documents",
            post(crate::http::documents::upload),
        )
        .route("/api/v1/documents/{id}", get(crate::http::documents::get_one).patch(crate::http::documents::patch).delete(crate::http::documents::delete_one))
        .route("/api/v1/documents/conversation/{id}", get(crate::http::documents::list_for_conversation))
        .route("/api/v1/summaries", post(crate::http::summaries::generate).get(crate::http::summaries::list))
        .route("/api/v1/summaries/{id}", get(crate::http::summaries::get_one).patch(crate::http::summaries::patch).delete(crate::http::summaries::delete_one))
        .route("/api/v1/summaries/{id}/pdf", get(crate::http::summaries::pdf_url))
        .route("/api/v1/summaries/{id}/regenerate", post(crate::http::summaries::regenerate))
        .route("/api/v1/summaries/conversation/{id}", get(crate::http::summaries::get_for_conversation))
        .route("/api/v1/anwalt/search", get(crate::http::anwalt::search))
        .route("/api/v1/anwalt/connect", post(crate::http::anwalt::connect))
        .route("/api/v1/anwalt/connections", get(crate::http::anwalt::connections))
        .route("/api/v1/status", get(crate::http::status::status))
        .route("/api/v1/status/agents", get(crate::http::status::agents))
        .route("/api/v1/status/conversations/{id}", get(crate::http::status::conversation_progress))
        .route("/api/v1/sync", post(crate::http::sync::sync))
        .route("/api/v1/users/push-token", post(crate::http::users::set_push_token))
        .route("/api/v1/users/profile", get(crate::http::users::get_profile).patch(crate::http::users::update_profile))
        .route("/api/v1/webhooks/lawyer-response", post(crate::http::webhooks::lawyer_response))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

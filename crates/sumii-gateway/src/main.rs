use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

mod anwalt_client;
mod app;
mod auth;
mod http;
mod respond;
mod ws;

use sumii_agent::{HttpRemoteAgent, NullRemoteAgent, RemoteAgent};
use sumii_artifact::email::{EmailSender, NullEmailSender, SmtpEmailSender};
use sumii_artifact::pdf::PdfRenderer;
use sumii_artifact::SummaryPipeline;
use sumii_blob::{BlobStore, NullBlobStore, S3BlobStore};
use sumii_core::config::PRESIGN_EXPIRY_DAYS;
use sumii_core::SumiiConfig;
use sumii_db::Db;
use sumii_ocr::{HttpOcrEngine, NullOcrEngine, OcrEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sumii_gateway=info,tower_http=debug".into()),
        )
        .init();

    let config_path = std::env::var("SUMII_CONFIG").ok();
    let config = SumiiConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("config load failed ({e}), using defaults");
        SumiiConfig::default()
    });

    let db = Arc::new(Db::open(&config.database.path)?);

    let blob: Arc<dyn BlobStore> = match &config.blob.endpoint_url {
        Some(_) => Arc::new(S3BlobStore::new(&config.blob.bucket, config.blob.endpoint_url.as_deref(), &config.blob.region).await),
        None if std::env::var("AWS_ACCESS_KEY_ID").is_ok() => {
            Arc::new(S3BlobStore::new(&config.blob.bucket, None, &config.blob.region).await)
        }
        None => {
            warn!("no blob backend configured, falling back to an in-memory store (documents will not survive a restart)");
            Arc::new(NullBlobStore::new())
        }
    };

    let ocr: Arc<dyn OcrEngine> = match &config.ocr.api_key {
        Some(key) => Arc::new(HttpOcrEngine::new(
            config.ocr.base_url.clone().unwrap_or_default(),
            key.clone(),
        )),
        None => {
            warn!("no OCR backend configured, extraction will return empty text for every document");
            Arc::new(NullOcrEngine::new(""))
        }
    };

    let agent: Arc<dyn RemoteAgent> = match &config.agent.api_key {
        Some(key) => Arc::new(HttpRemoteAgent::new(
            config.agent.base_url.clone().unwrap_or_default(),
            key.clone(),
        )),
        None => {
            warn!("no remote agent configured, chat turns will fail until SUMII_AGENT_API_KEY is set");
            Arc::new(NullRemoteAgent::new(Vec::new()))
        }
    };

    let pdf = Arc::new(PdfRenderer::load("assets/fonts")?);

    let email: Arc<dyn EmailSender> = match (&config.email.smtp_host, &config.email.smtp_user, &config.email.smtp_password) {
        (Some(host), Some(user), Some(password)) => {
            Arc::new(SmtpEmailSender::new(host, user, password, config.email.from_address.clone())?)
        }
        _ => {
            warn!("no SMTP relay configured, notification emails will be dropped");
            Arc::new(NullEmailSender)
        }
    };

    let summaries = Arc::new(SummaryPipeline::new(
        db.clone(),
        blob.clone(),
        pdf,
        email.clone(),
        Duration::from_secs(PRESIGN_EXPIRY_DAYS as u64 * 24 * 3600),
    ));

    let anwalt = anwalt_client::AnwaltClient::new(config.anwalt.base_url.clone(), config.anwalt.api_key.clone());

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;
    let state = Arc::new(app::AppState::new(config, db, blob, ocr, agent, summaries, anwalt, email));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("sumii gateway listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

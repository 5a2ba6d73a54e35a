use std::sync::Arc;

use compass_auth::jwt::SessionKeys;
use compass_billing::client::{StripeClient, StripeConfig};
use compass_mail::{LogMailer, Mailer, SendGridMailer};
use compass_mbti::stages::ModelIds;
use compass_mbti::{ExtractionChain, ocr};
use compass_storage::memory::MemoryStore;
use compass_storage::store::{ObjectStore, S3Store};

use crate::config::AppConfig;

/// Stripe client plus the settings it was built from.
pub struct Billing {
    pub client: StripeClient,
    pub config: StripeConfig,
}

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub keys: Arc<SessionKeys>,
    pub mailer: Arc<dyn Mailer>,
    /// `None` when Stripe is not configured; billing routes answer 503.
    pub billing: Option<Arc<Billing>>,
    pub chain: Arc<ExtractionChain>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire every integration from configuration.
    pub async fn from_config(config: AppConfig) -> eyre::Result<Self> {
        let store: Arc<dyn ObjectStore> = if config.memory_store {
            tracing::warn!("using in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        } else {
            let s3 = compass_storage::client::build_client().await;
            Arc::new(S3Store::new(s3, config.bucket.clone()))
        };

        let mailer: Arc<dyn Mailer> = match &config.sendgrid_api_key {
            Some(key) => Arc::new(SendGridMailer::new(key.clone(), config.mail_from.clone())?),
            None => {
                tracing::info!("SENDGRID_API_KEY not set, emails will be logged");
                Arc::new(LogMailer)
            }
        };

        let billing = match &config.stripe {
            Some(settings) => Some(Arc::new(Billing {
                client: StripeClient::new(settings.secret_key.clone())?,
                config: StripeConfig {
                    secret_key: settings.secret_key.clone(),
                    webhook_secret: settings.webhook_secret.clone(),
                    price_id: settings.price_id.clone(),
                },
            })),
            None => {
                tracing::info!("Stripe not configured, billing routes disabled");
                None
            }
        };

        let mut chain = ExtractionChain::local(ocr::default_engine(config.tessdata_dir.as_deref()));
        if config.bedrock_enabled {
            let client = compass_bedrock::client::build_client().await;
            chain = chain.with_models(
                client,
                &ModelIds {
                    text: config.text_model_id.clone(),
                    document: config.document_model_id.clone(),
                    vision: config.vision_model_id.clone(),
                },
            );
        }
        tracing::info!(
            store = store.backend_tag(),
            mailer = mailer.name(),
            stages = ?chain.stage_names(),
            "application state ready"
        );

        Ok(Self::new(store, mailer, billing, chain, config))
    }

    pub fn new(
        store: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
        billing: Option<Arc<Billing>>,
        chain: ExtractionChain,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            keys: Arc::new(SessionKeys::new(config.jwt_secret.as_bytes(), config.token_ttl)),
            mailer,
            billing,
            chain: Arc::new(chain),
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }
}

use std::path::PathBuf;
use std::time::Duration;

use eyre::{WrapErr, bail};

const DEV_JWT_SECRET: &str = "compass-dev-secret-do-not-deploy";

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bucket: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub public_url: String,
    /// Serve over TCP on this address instead of Lambda.
    pub bind: Option<String>,
    pub memory_store: bool,
    pub dev_mode: bool,
    /// Addresses that register as administrators.
    pub admin_emails: Vec<String>,
    pub bedrock_enabled: bool,
    pub text_model_id: String,
    pub document_model_id: String,
    pub vision_model_id: String,
    pub tessdata_dir: Option<PathBuf>,
    pub stripe: Option<StripeSettings>,
    pub sendgrid_api_key: Option<String>,
    pub mail_from: String,
}

#[derive(Debug, Clone)]
pub struct StripeSettings {
    pub secret_key: String,
    pub webhook_secret: String,
    pub price_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let flag = |name: &str| {
            var(name).is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        };

        let dev_mode = flag("COMPASS_DEV_MODE");
        let jwt_secret = match var("COMPASS_JWT_SECRET") {
            Some(secret) => secret,
            None if dev_mode => DEV_JWT_SECRET.to_string(),
            None => bail!("COMPASS_JWT_SECRET must be set (or COMPASS_DEV_MODE=1)"),
        };

        let ttl_hours: u64 = match var("COMPASS_TOKEN_TTL_HOURS") {
            Some(v) => v
                .parse()
                .wrap_err_with(|| format!("COMPASS_TOKEN_TTL_HOURS is not a number: {v}"))?,
            None => 168,
        };

        let stripe = match (var("STRIPE_SECRET_KEY"), var("STRIPE_WEBHOOK_SECRET")) {
            (Some(secret_key), Some(webhook_secret)) => Some(StripeSettings {
                secret_key,
                webhook_secret,
                price_id: var("STRIPE_PRICE_ID"),
            }),
            (Some(_), None) | (None, Some(_)) => {
                bail!("STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET must be set together")
            }
            (None, None) => None,
        };

        Ok(Self {
            bucket: var("COMPASS_BUCKET").unwrap_or_else(|| "compass".to_string()),
            jwt_secret,
            token_ttl: Duration::from_secs(ttl_hours * 3600),
            public_url: var("COMPASS_PUBLIC_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            bind: var("COMPASS_BIND"),
            memory_store: var("COMPASS_STORE").is_some_and(|v| v == "memory"),
            dev_mode,
            admin_emails: var("COMPASS_ADMIN_EMAILS")
                .map(|v| {
                    v.split(',')
                        .map(compass_core::s3_keys::normalize_email)
                        .filter(|e| !e.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            bedrock_enabled: flag("COMPASS_BEDROCK_ENABLED"),
            text_model_id: var("COMPASS_TEXT_MODEL_ID")
                .unwrap_or_else(|| "anthropic.claude-3-haiku-20240307-v1:0".to_string()),
            document_model_id: var("COMPASS_DOCUMENT_MODEL_ID")
                .unwrap_or_else(|| "anthropic.claude-3-5-sonnet-20240620-v1:0".to_string()),
            vision_model_id: var("COMPASS_VISION_MODEL_ID")
                .unwrap_or_else(|| "anthropic.claude-3-5-sonnet-20240620-v1:0".to_string()),
            tessdata_dir: var("COMPASS_TESSDATA_DIR").map(PathBuf::from),
            stripe,
            sendgrid_api_key: var("SENDGRID_API_KEY"),
            mail_from: var("COMPASS_MAIL_FROM")
                .unwrap_or_else(|| "no-reply@compass.local".to_string()),
        })
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = compass_core::s3_keys::normalize_email(email);
        self.admin_emails.iter().any(|e| *e == email)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> eyre::Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_in_dev_mode() {
        let c = config(&[("COMPASS_DEV_MODE", "1")]).unwrap();
        assert_eq!(c.bucket, "compass");
        assert_eq!(c.token_ttl, Duration::from_secs(168 * 3600));
        assert_eq!(c.public_url, "http://localhost:3000");
        assert!(c.stripe.is_none());
        assert!(c.sendgrid_api_key.is_none());
        assert!(!c.bedrock_enabled);
    }

    #[test]
    fn secret_is_required_outside_dev_mode() {
        assert!(config(&[]).is_err());
        assert!(config(&[("COMPASS_JWT_SECRET", "s3cret")]).is_ok());
    }

    #[test]
    fn stripe_keys_come_in_pairs() {
        let base = [("COMPASS_JWT_SECRET", "s")];
        assert!(config(&[base[0], ("STRIPE_SECRET_KEY", "sk")]).is_err());
        let c = config(&[
            base[0],
            ("STRIPE_SECRET_KEY", "sk"),
            ("STRIPE_WEBHOOK_SECRET", "whsec"),
            ("STRIPE_PRICE_ID", "price_1"),
        ])
        .unwrap();
        assert_eq!(c.stripe.unwrap().price_id.as_deref(), Some("price_1"));
    }

    #[test]
    fn admin_emails_are_normalized() {
        let c = config(&[
            ("COMPASS_DEV_MODE", "true"),
            ("COMPASS_ADMIN_EMAILS", " Root@Example.com ,ops@example.com"),
            ("COMPASS_PUBLIC_URL", "https://compass.test/"),
        ])
        .unwrap();
        assert!(c.is_admin_email("root@example.com"));
        assert!(!c.is_admin_email("ada@example.com"));
        assert_eq!(c.public_url, "https://compass.test");
    }
}

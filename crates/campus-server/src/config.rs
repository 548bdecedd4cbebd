use std::path::PathBuf;
use std::time::Duration;

use campus_advisor::AdvisorConfig;
use campus_notify::dispatcher::NotifyConfig;
use campus_notify::email::EmailConfig;
use campus_notify::sms::SmsConfig;

/// Process configuration, read once from the environment at startup and
/// handed to component constructors. Values equal to "placeholder" count
/// as unset, matching the original deployment convention.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub advisor: AdvisorConfig,
    pub notify: NotifyConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env_or("CAMPUS_HOST", "0.0.0.0");
        let port: u16 = env_or("CAMPUS_PORT", "8000").parse()?;
        let db_path = PathBuf::from(env_or("CAMPUS_DB_PATH", "campusupport.db"));
        let jwt_secret = env_or("CAMPUS_JWT_SECRET", "dev-secret-change-me");
        let token_ttl_minutes: i64 = env_or("CAMPUS_TOKEN_TTL_MINUTES", "30").parse()?;

        let advisor = AdvisorConfig {
            api_key: env_opt("OPENAI_API_KEY"),
            base_url: env_or("CAMPUS_ADVISOR_BASE_URL", "https://api.openai.com/v1"),
            model: env_or("CAMPUS_ADVISOR_MODEL", "gpt-3.5-turbo"),
            timeout: Duration::from_secs(env_or("CAMPUS_ADVISOR_TIMEOUT_SECS", "10").parse()?),
        };

        let email = env_opt("SMTP_HOST").map(|smtp_host| {
            anyhow::Ok(EmailConfig {
                host: smtp_host,
                port: env_or("SMTP_PORT", "587").parse()?,
                username: env_opt("SMTP_USERNAME"),
                password: env_opt("SMTP_PASSWORD"),
                from: env_or("SMTP_FROM", "noreply@campusupport.local"),
            })
        });
        let email = match email {
            Some(result) => Some(result?),
            None => None,
        };

        let sms = env_opt("SMS_API_URL").map(|api_url| SmsConfig {
            api_url,
            api_key: env_or("SMS_API_KEY", "placeholder"),
            to: env_opt("SMS_TO"),
        });

        let notify = NotifyConfig {
            email,
            webhook_url: env_opt("CAMPUS_WEBHOOK_URL").or_else(|| env_opt("SLACK_WEBHOOK_URL")),
            webhook_api_key: env_opt("CAMPUS_WEBHOOK_API_KEY"),
            sms,
        };

        Ok(Self {
            host,
            port,
            db_path,
            jwt_secret,
            token_ttl_minutes,
            advisor,
            notify,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty() && v != "placeholder")
}

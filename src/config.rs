use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "caterview".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "caterview-users".into()),
            // sessions last a week unless overridden
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 7),
        };
        let mail = MailConfig {
            api_url: std::env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "https://api.brevo.com/v3/smtp/email".into()),
            api_key: std::env::var("MAIL_API_KEY")?,
            sender_email: std::env::var("MAIL_SENDER_EMAIL")?,
            sender_name: std::env::var("MAIL_SENDER_NAME").unwrap_or_else(|_| "CATerview".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            mail,
        })
    }
}

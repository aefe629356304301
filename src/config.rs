use std::env;
use std::path::PathBuf;

/// Mail delivery settings. When absent, notification emails are skipped.
#[derive(Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
    pub admin_address: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Absolute URL prefix used when building public media links.
    pub public_base_url: String,
    pub media_root: PathBuf,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub mail: Option<MailConfig>,
    /// Operator contact details included in customer emails.
    pub contact_phone: String,
    pub contact_email: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mail = match (env::var("MAIL_API_URL"), env::var("MAIL_API_KEY")) {
            (Ok(api_url), Ok(api_key)) => Some(MailConfig {
                api_url,
                api_key,
                from_address: env::var("MAIL_FROM")
                    .expect("MAIL_FROM must be set when mail delivery is configured"),
                admin_address: env::var("MAIL_ADMIN_ADDRESS")
                    .expect("MAIL_ADMIN_ADDRESS must be set when mail delivery is configured"),
            }),
            _ => None,
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a number"),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            media_root: env::var("MEDIA_ROOT")
                .unwrap_or_else(|_| "media".to_string())
                .into(),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            mail,
            contact_phone: env::var("CONTACT_PHONE").unwrap_or_default(),
            contact_email: env::var("CONTACT_EMAIL").unwrap_or_default(),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub stripe: StripeConfig,
    pub smtp: SmtpConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    pub secret_key: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    /// Operator inbox that receives contact form notifications.
    pub contact_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Public origin of the web client; used for memorial and checkout URLs.
    pub frontend_url: String,
}

fn default_currency() -> String {
    "eur".to_string()
}

impl AppConfig {
    pub fn memorial_url(&self, code: &str) -> String {
        format!("{}/memory/{}", self.frontend_url.trim_end_matches('/'), code)
    }

    pub fn checkout_success_url(&self) -> String {
        format!(
            "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
            self.frontend_url.trim_end_matches('/')
        )
    }

    pub fn checkout_cancel_url(&self) -> String {
        format!("{}/shop", self.frontend_url.trim_end_matches('/'))
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // No config file means everything comes from the environment
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env()?,
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        // Environment variables win even when the file exists
        config.apply_env_overrides();

        Ok(config)
    }

    fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        fn get_env(name: &str) -> Option<String> {
            env::var(name).ok()
        }
        fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(default)
        }

        let database_url = get_env("DATABASE_URL")
            .ok_or("DATABASE_URL is not set and no config.toml was found")?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                refresh_token_expires_in: get_env_parse("JWT_REFRESH_EXPIRES_IN", 2_592_000i64),
            },
            stripe: StripeConfig {
                secret_key: get_env("STRIPE_SECRET_KEY").unwrap_or_default(),
                currency: get_env("STRIPE_CURRENCY").unwrap_or_else(default_currency),
            },
            smtp: SmtpConfig {
                host: get_env("SMTP_HOST").unwrap_or_default(),
                port: get_env_parse("SMTP_PORT", 465u16),
                username: get_env("SMTP_USERNAME").unwrap_or_default(),
                password: get_env("SMTP_PASSWORD").unwrap_or_default(),
                from_address: get_env("SMTP_FROM_ADDRESS").unwrap_or_default(),
                contact_address: get_env("CONTACT_ADDRESS").unwrap_or_default(),
            },
            app: AppConfig {
                frontend_url: get_env("FRONTEND_URL")
                    .unwrap_or_else(|| "http://localhost:5173".to_string()),
            },
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.refresh_token_expires_in = n;
        }
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            self.stripe.secret_key = v;
        }
        if let Ok(v) = env::var("STRIPE_CURRENCY") {
            self.stripe.currency = v;
        }
        if let Ok(v) = env::var("SMTP_HOST") {
            self.smtp.host = v;
        }
        if let Ok(v) = env::var("SMTP_PORT")
            && let Ok(p) = v.parse()
        {
            self.smtp.port = p;
        }
        if let Ok(v) = env::var("SMTP_USERNAME") {
            self.smtp.username = v;
        }
        if let Ok(v) = env::var("SMTP_PASSWORD") {
            self.smtp.password = v;
        }
        if let Ok(v) = env::var("SMTP_FROM_ADDRESS") {
            self.smtp.from_address = v;
        }
        if let Ok(v) = env::var("CONTACT_ADDRESS") {
            self.smtp.contact_address = v;
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.app.frontend_url = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_config() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/workersmate"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 60
            refresh_token_expires_in = 120

            [stripe]
            secret_key = "sk_test_123"

            [smtp]
            host = "smtp.example.com"
            port = 465
            username = "mailer"
            password = "pw"
            from_address = "noreply@example.com"
            contact_address = "hello@example.com"

            [app]
            frontend_url = "https://workersmate.example/"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.stripe.currency, "eur");
        assert_eq!(
            config.app.memorial_url("MEM-ABC123"),
            "https://workersmate.example/memory/MEM-ABC123"
        );
        assert_eq!(
            config.app.checkout_success_url(),
            "https://workersmate.example/payment-success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(
            config.app.checkout_cancel_url(),
            "https://workersmate.example/shop"
        );
    }
}

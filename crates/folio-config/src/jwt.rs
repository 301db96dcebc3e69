use crate::{ConfigError, ConfigView};

/// Token signing secret, cookie name and lifetimes (seconds).
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub token_name: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
    /// Remaining lifetime under which a valid access token is re-issued.
    pub refresh_window: i64,
}

impl JwtConfig {
    pub fn from_view(view: &ConfigView) -> Result<Self, ConfigError> {
        let config = Self {
            secret: view.require("JWT_SECRET")?.to_string(),
            token_name: view.get_or("JWT_NAME", "portfolio_token"),
            access_token_expiry: view.get_int("JWT_EXPIRY", 1800), // 30 minutes
            refresh_token_expiry: view.get_int("JWT_REFRESH_EXPIRY", 604800), // 7 days
            refresh_window: view.get_int("JWT_REFRESH_WINDOW", 300),
        };

        if config.access_token_expiry <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRY",
                value: config.access_token_expiry.to_string(),
            });
        }

        Ok(config)
    }

    pub fn refresh_token_name(&self) -> String {
        format!("{}_refresh", self.token_name)
    }
}

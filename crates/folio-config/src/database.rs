use crate::{ConfigError, ConfigView};

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Uses `DATABASE_URL` when set, otherwise assembles a Postgres URL from
    /// the `DB_*` variables. `DB_HOST` and `DB_NAME` are then required.
    pub fn from_view(view: &ConfigView) -> Result<Self, ConfigError> {
        let url = match view.get("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => url.to_string(),
            None => {
                let host = view.require("DB_HOST")?;
                let name = view.require("DB_NAME")?;
                let user = view.get_or("DB_USER", "postgres");
                let port = view.get_int("DB_PORT", 5432);
                match view.get("DB_PASSWORD").filter(|p| !p.is_empty()) {
                    Some(password) => {
                        format!("postgres://{user}:{password}@{host}:{port}/{name}")
                    }
                    None => format!("postgres://{user}@{host}:{port}/{name}"),
                }
            }
        };

        Ok(Self {
            url,
            max_connections: 5,
        })
    }
}

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{RegcoreError, RegcoreResult};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://regcore.db";
pub const DEFAULT_MEDIA_ROOT: &str = "media";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Settings read from the environment (and a `.env` file, if present).
///
/// | Variable       | Default               |
/// |----------------|-----------------------|
/// | `DATABASE_URL` | `sqlite://regcore.db` |
/// | `MEDIA_ROOT`   | `media`               |
/// | `BIND_ADDRESS` | `0.0.0.0:3000`        |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub media_root: PathBuf,
    pub bind_address: SocketAddr,
}

impl Config {
    pub fn from_env() -> RegcoreResult<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RegcoreResult<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let media_root =
            PathBuf::from(lookup("MEDIA_ROOT").unwrap_or_else(|| DEFAULT_MEDIA_ROOT.to_owned()));
        let bind_address = lookup("BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned())
            .parse()
            .map_err(|err| RegcoreError::Config {
                name: "BIND_ADDRESS",
                reason: format!("{}", err),
            })?;

        Ok(Self {
            database_url,
            media_root,
            bind_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> RegcoreResult<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.bind_address.port(), 3000);
    }

    #[test]
    fn variables_override_defaults() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("MEDIA_ROOT", "/srv/regcore/media"),
            ("BIND_ADDRESS", "127.0.0.1:8080"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.media_root, PathBuf::from("/srv/regcore/media"));
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let error = config_from(&[("BIND_ADDRESS", "localhost")]).unwrap_err();

        assert!(matches!(
            error,
            RegcoreError::Config {
                name: "BIND_ADDRESS",
                ..
            }
        ));
    }
}

/// Daemon configuration
use coda_core::config::LibraryConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(String);

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DaemonConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    pub library: LibraryConfig,
}

fn default_database_url() -> String {
    "sqlite://coda.db".to_string()
}

impl DaemonConfig {
    /// Load from an optional TOML file, then `CODA_`-prefixed environment
    /// variables (e.g. `CODA_DATABASE_URL`).
    pub fn load(path: Option<&PathBuf>) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.clone()));
            }
            None => {
                let default_path = PathBuf::from("coda.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CODA")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ConfigError(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConfigError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
database_url = "sqlite:///var/lib/coda/coda.db"

[library]
exclude_pattern = "@eaDir"
scan_interval_minutes = 30
scan_at_start = true
scan_watcher = true

[[library.roots]]
alias = "main"
path = "/music"

[library.multi_value]
genre = "delim ;"
artist = "multi"
"#
        )
        .unwrap();

        let config = DaemonConfig::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.database_url, "sqlite:///var/lib/coda/coda.db");
        assert_eq!(config.library.roots.len(), 1);
        assert_eq!(config.library.roots[0].alias.as_deref(), Some("main"));
        assert_eq!(config.library.scan_interval_minutes, 30);
        assert!(config.library.scan_at_start);
        assert!(config.library.scan_watcher);
        assert_eq!(
            config.library.multi_value.genre,
            coda_core::config::MultiValueSetting::Delim(";".to_string())
        );
        assert_eq!(
            config.library.multi_value.album_artist,
            coda_core::config::MultiValueSetting::None
        );
    }
}

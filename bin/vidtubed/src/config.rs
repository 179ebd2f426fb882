//! Server configuration, loaded from a TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub storage: StorageSection,
    pub jwt: JwtSection,
    #[serde(default)]
    pub views: ViewsSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// Directory holding all persistent data.
    pub data_dir: String,

    /// Override for the SQLite file, default `{data_dir}/data.sqlite`.
    #[serde(default)]
    pub db_path: Option<String>,

    /// Override for the media directory, default `{data_dir}/media`.
    #[serde(default)]
    pub media_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSection {
    /// HMAC secret for signing and verifying access tokens.
    pub secret: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewsSection {
    /// Deadline for aggregation-view reads, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ViewsSection {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_expire_secs() -> u64 {
    24 * 60 * 60
}

fn default_timeout_ms() -> u64 {
    5000
}

impl ServerConfig {
    /// Resolve a context name or path. A bare name resolves to
    /// `/etc/vidtube/<name>.toml`; anything with `/` or `.` is a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/vidtube/{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        if config.jwt.secret.len() < 16 {
            anyhow::bail!("jwt.secret must be at least 16 characters");
        }
        Ok(config)
    }

    pub fn view_timeout(&self) -> Duration {
        Duration::from_millis(self.views.timeout_ms)
    }

    /// Resolved storage layout for the core config.
    pub fn service_config(&self, listen_override: Option<&str>) -> vidtube_core::ServiceConfig {
        vidtube_core::ServiceConfig {
            data_dir: PathBuf::from(&self.storage.data_dir),
            db_path: self.storage.db_path.as_ref().map(PathBuf::from),
            media_dir: self.storage.media_dir.as_ref().map(PathBuf::from),
            listen: listen_override
                .unwrap_or(&self.server.listen)
                .to_string(),
            view_timeout: self.view_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_minimal_config_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        std::fs::write(
            &path,
            r#"
[storage]
data_dir = "/var/lib/vidtube"

[jwt]
secret = "0123456789abcdef"
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.views.timeout_ms, 5000);
        assert_eq!(config.jwt.expire_secs, 24 * 60 * 60);

        let svc = config.service_config(Some("127.0.0.1:9000"));
        assert_eq!(svc.listen, "127.0.0.1:9000");
        assert_eq!(
            svc.resolve_db_path(),
            PathBuf::from("/var/lib/vidtube/data.sqlite")
        );
    }

    #[test]
    fn short_secret_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"d\"\n\n[jwt]\nsecret = \"short\"\n",
        )
        .unwrap();
        assert!(ServerConfig::load(&path).is_err());
    }

    #[test]
    fn bare_names_resolve_under_etc() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/vidtube/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }
}

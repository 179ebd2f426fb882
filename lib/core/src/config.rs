use std::path::PathBuf;
use std::time::Duration;

/// Resolved storage/runtime configuration shared by all services.
///
/// The binary parses its TOML config and CLI flags, then hands this to
/// storage-layer initialization.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding all persistent data.
    pub data_dir: PathBuf,

    /// Path to the SQLite database file.
    /// Defaults to `{data_dir}/data.sqlite` if not specified.
    pub db_path: Option<PathBuf>,

    /// Directory for stored media files (video/thumbnail bytes).
    /// Defaults to `{data_dir}/media/` if not specified.
    pub media_dir: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,

    /// Deadline applied to aggregation-view reads.
    pub view_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            db_path: None,
            media_dir: None,
            listen: "0.0.0.0:8080".to_string(),
            view_timeout: Duration::from_millis(5000),
        }
    }
}

impl ServiceConfig {
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("data.sqlite"))
    }

    pub fn resolve_media_dir(&self) -> PathBuf {
        self.media_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("media"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_derive_from_data_dir() {
        let config = ServiceConfig {
            data_dir: PathBuf::from("/var/lib/vidtube"),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_db_path(),
            PathBuf::from("/var/lib/vidtube/data.sqlite")
        );
        assert_eq!(
            config.resolve_media_dir(),
            PathBuf::from("/var/lib/vidtube/media")
        );
    }

    #[test]
    fn explicit_paths_win() {
        let config = ServiceConfig {
            data_dir: PathBuf::from("/data"),
            db_path: Some(PathBuf::from("/elsewhere/db.sqlite")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/elsewhere/db.sqlite"));
    }
}

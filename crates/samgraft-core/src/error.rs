use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Chalice config store ──
    #[error("failed to open Chalice config store at {path}")]
    ConfigStoreOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse Chalice config store at {path}")]
    ConfigStoreParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Chalice config store at {path} has no `stages` object")]
    MissingStages { path: PathBuf },

    #[error("failed to write Chalice config store at {path}")]
    ConfigStoreWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize Chalice config store for {path}")]
    ConfigStoreSerialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

use std::path::{Path, PathBuf};

use crate::manifest::Manifest;

/// Location of an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedAsset {
    pub bucket: String,
    pub key: String,
}

/// The infrastructure tree the packaged app is grafted into.
///
/// Owns asset publishing and template inclusion. [`FsComposer`](crate::FsComposer)
/// stages both on disk; tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait TreeComposer: Send + Sync {
    /// Publish the file at `path` as a content-addressed asset named `asset_id`.
    async fn publish_asset(
        &self,
        asset_id: &str,
        path: &Path,
    ) -> Result<PublishedAsset, ComposeError>;

    /// Include `manifest` in the tree under `inclusion_key`.
    async fn include_template(
        &self,
        inclusion_key: &str,
        manifest: &Manifest,
    ) -> Result<(), ComposeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("failed to read asset {path}")]
    ReadAsset {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize template '{key}'")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    #[error("tree composition rejected the request: {detail}")]
    Rejected { detail: String },
}

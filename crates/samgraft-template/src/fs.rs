use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::composer::{ComposeError, PublishedAsset, TreeComposer};
use crate::manifest::Manifest;

/// Directory under the output root that holds published assets.
pub const ASSETS_DIR: &str = "assets";

/// Stages assets and templates in a local directory.
///
/// Assets are stored by the SHA-256 of their content, so publishing the same
/// archive twice yields the same key. Templates land next to them as
/// `<key>.template.json`.
#[derive(Debug, Clone)]
pub struct FsComposer {
    out_dir: PathBuf,
    bucket: String,
}

impl FsComposer {
    pub fn new(out_dir: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            bucket: bucket.into(),
        }
    }

    /// Where the template included under `inclusion_key` is written.
    pub fn template_path(&self, inclusion_key: &str) -> PathBuf {
        self.out_dir.join(format!("{inclusion_key}.template.json"))
    }

    async fn create_dir(path: &Path) -> Result<(), ComposeError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| ComposeError::Write {
                path: path.to_path_buf(),
                source: e,
            })
    }
}

impl TreeComposer for FsComposer {
    async fn publish_asset(
        &self,
        asset_id: &str,
        path: &Path,
    ) -> Result<PublishedAsset, ComposeError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| ComposeError::ReadAsset {
                path: path.to_path_buf(),
                source: e,
            })?;
        let digest = hex::encode(Sha256::digest(&content));

        let file_name = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{digest}.{ext}"),
            None => digest,
        };
        let key = format!("{ASSETS_DIR}/{file_name}");

        let assets_dir = self.out_dir.join(ASSETS_DIR);
        Self::create_dir(&assets_dir).await?;
        let staged = assets_dir.join(&file_name);
        tokio::fs::write(&staged, &content)
            .await
            .map_err(|e| ComposeError::Write {
                path: staged.clone(),
                source: e,
            })?;

        tracing::debug!(asset_id, key = %key, staged = %staged.display(), "asset staged");
        Ok(PublishedAsset {
            bucket: self.bucket.clone(),
            key,
        })
    }

    async fn include_template(
        &self,
        inclusion_key: &str,
        manifest: &Manifest,
    ) -> Result<(), ComposeError> {
        Self::create_dir(&self.out_dir).await?;

        let rendered =
            serde_json::to_string_pretty(manifest).map_err(|e| ComposeError::Serialize {
                key: inclusion_key.to_owned(),
                source: e,
            })?;
        let path = self.template_path(inclusion_key);
        tokio::fs::write(&path, rendered)
            .await
            .map_err(|e| ComposeError::Write {
                path: path.clone(),
                source: e,
            })?;

        tracing::debug!(inclusion_key, path = %path.display(), "template included");
        Ok(())
    }
}

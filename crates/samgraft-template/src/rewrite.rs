use std::path::PathBuf;

use samgraft_core::BuildOutput;
use serde_json::json;

use crate::composer::{ComposeError, TreeComposer};
use crate::manifest::{Manifest, ManifestError};

/// Asset id under which the deployment archive is published.
pub const ASSET_ID: &str = "ChaliceAppCode";

const CODE_URI: &str = "CodeUri";

/// Loads the SAM template from `output` and points every function's
/// `CodeUri` at the published deployment archive.
///
/// The archive is published exactly once, even when the template holds
/// several functions or none. The template file on disk is left as is.
pub async fn rewrite_code_uri<C: TreeComposer>(
    output: &BuildOutput,
    composer: &C,
) -> Result<Manifest, RewriteError> {
    let mut manifest = Manifest::load(&output.manifest_path())?;
    let functions = manifest.function_names()?;
    tracing::debug!(?functions, "found function resources");

    let archive = output.archive_path();
    if !archive.is_file() {
        return Err(RewriteError::ArchiveMissing { path: archive });
    }

    let asset = composer
        .publish_asset(ASSET_ID, &archive)
        .await
        .map_err(|e| RewriteError::Publish { source: e })?;

    let code_uri = json!({
        "Bucket": asset.bucket,
        "Key": asset.key,
    });
    let rewritten = manifest.set_function_property(CODE_URI, &code_uri)?;
    tracing::info!(
        functions = rewritten,
        bucket = %asset.bucket,
        key = %asset.key,
        "pointed CodeUri at deployment asset"
    );

    Ok(manifest)
}

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("deployment archive not found at {path}")]
    ArchiveMissing { path: PathBuf },

    #[error("failed to publish deployment archive")]
    Publish { source: ComposeError },
}

//! Package a Chalice app and graft its SAM template into an infrastructure
//! tree.
//!
//! This is the facade crate: it re-exports the samgraft sub-crates and
//! hosts [`Packager`], which runs the whole pipeline.
//!
//! # Feature flags
//!
//! | Feature | Default | Crate | Description |
//! |---------|---------|-------|-------------|
//! | `build` | yes | `samgraft-build` | Local and containerized `chalice package` runners |
//! | `template` | yes | `samgraft-template` | SAM template rewriting and asset staging |
//! | `packager` | yes | | The [`Packager`] pipeline (implies `build` and `template`) |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use samgraft::{FsComposer, PackageRequest, Packager, StageConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let composer = FsComposer::new("cdk.out", "my-assets-bucket");
//! let packager = Packager::new(composer);
//!
//! let mut stage_config = StageConfig::new();
//! stage_config.insert("api_gateway_stage".into(), "v1".into());
//!
//! let request = PackageRequest::new("./app", "prod").with_stage_config(stage_config);
//! let manifest = packager.package(&request).await?;
//! println!("{}", serde_json::to_string_pretty(&manifest)?);
//! # Ok(())
//! # }
//! ```

// Core types flattened into root namespace for convenience.
pub use samgraft_core::*;

/// Runners for `chalice package`.
#[cfg(feature = "build")]
pub mod build {
    pub use samgraft_build::*;
}

/// SAM template loading, rewriting, and tree composition.
#[cfg(feature = "template")]
pub mod template {
    pub use samgraft_template::*;
}

#[cfg(feature = "template")]
pub use samgraft_template::{FsComposer, Manifest, PublishedAsset, TreeComposer};

#[cfg(feature = "packager")]
pub mod packager;

#[cfg(feature = "packager")]
pub use packager::{DEFAULT_INCLUSION_KEY, PackageError, PackageRequest, Packager};

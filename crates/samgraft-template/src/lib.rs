//! SAM template handling for samgraft.
//!
//! After `chalice package` has run, the template's function resources
//! still point at a local `deployment.zip`. [`rewrite_code_uri`] publishes
//! that archive through a [`TreeComposer`] and replaces each function's
//! `CodeUri` with the resulting `{Bucket, Key}`:
//!
//! ```text
//! sam.json                         rewritten manifest
//!   MyFunction:                      MyFunction:
//!     Type: AWS::Serverless::Function  Type: AWS::Serverless::Function
//!     Properties:                      Properties:
//!       CodeUri: ./deployment.zip        CodeUri: {Bucket: b, Key: k}
//! ```

pub mod composer;
pub mod fs;
pub mod manifest;
pub mod rewrite;

pub use composer::{ComposeError, PublishedAsset, TreeComposer};
pub use fs::FsComposer;
pub use manifest::{FUNCTION_RESOURCE_TYPE, Manifest, ManifestError};
pub use rewrite::{ASSET_ID, RewriteError, rewrite_code_uri};

use std::path::{Path, PathBuf};

/// SAM template written by `chalice package`.
pub const MANIFEST_FILE: &str = "sam.json";

/// Deployment archive written by `chalice package`.
pub const ARCHIVE_FILE: &str = "deployment.zip";

/// A build output directory, unique per packaging run.
///
/// The directory is named with a random UUID so repeated or concurrent
/// runs never share output. Nothing removes it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    dir: PathBuf,
}

impl BuildOutput {
    /// Picks a fresh directory under `root`. The directory is not created.
    pub fn allocate(root: &Path) -> Self {
        let name = uuid::Uuid::new_v4().simple().to_string();
        Self {
            dir: root.join(name),
        }
    }

    /// Wraps an existing directory, e.g. one left behind by an earlier run.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.join(ARCHIVE_FILE)
    }
}

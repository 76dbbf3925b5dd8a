use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::container::ContainerSpec;
use crate::stage::StageConfig;

/// File name of the samgraft project configuration.
pub const CONFIG_FILE: &str = "samgraft.toml";

/// samgraft.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamgraftConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    /// Written to `stages.<stage>` of the Chalice config store
    #[serde(default)]
    pub stage_config: StageConfig,
    /// Present only when the app should be built in a container
    #[serde(default)]
    pub container: Option<ContainerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Chalice application root (defaults to the project directory)
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Stage to package
    pub stage: Option<String>,
    /// Parent directory of per-run build output
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Where templates and assets are staged for the infrastructure tree
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Bucket name reported for published assets
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Build image; empty or omitted selects the Lambda-like default
    #[serde(default)]
    pub image: Option<String>,
    /// Python version of the default image (defaults to 3.8)
    #[serde(default)]
    pub python_version: Option<String>,
    /// Environment variables passed to the build container
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Commands run before `chalice package`, e.g. `pip install chalice`
    #[serde(default)]
    pub init_commands: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            stage: None,
            output_root: default_output_root(),
            out_dir: default_out_dir(),
            bucket: default_bucket(),
        }
    }
}

impl SamgraftConfig {
    /// Load from samgraft.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Resolved container settings, if a `[container]` table is present.
    pub fn container_spec(&self) -> Option<ContainerSpec> {
        self.container.as_ref().map(ContainerSpec::from)
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("chalice.out")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("cdk.out")
}

fn default_bucket() -> String {
    "samgraft-assets".to_owned()
}

use std::collections::BTreeMap;

use crate::config::ContainerConfig;
use crate::env::apply_region_default;

/// Python version used to pick the default build image.
pub const DEFAULT_PYTHON_VERSION: &str = "3.8";

/// Lambda-like build image for a Python `major.minor` version.
pub fn default_image(python_version: &str) -> String {
    format!("lambci/lambda:build-python{python_version}")
}

/// Settings for building the Chalice app inside a container.
///
/// Use this when functions depend on packages with natively compiled
/// dependencies. Fixed at construction: an empty image falls back to
/// [`default_image`] and the environment always carries a region.
///
/// # Examples
///
/// ```
/// use samgraft_core::{ContainerSpec, REGION_VAR};
///
/// let spec = ContainerSpec::new("", Default::default(), vec!["pip install chalice".to_owned()]);
/// assert_eq!(spec.image(), "lambci/lambda:build-python3.8");
/// assert_eq!(spec.env().get(REGION_VAR).map(String::as_str), Some("us-east-1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    image: String,
    env: BTreeMap<String, String>,
    init_commands: Vec<String>,
}

impl ContainerSpec {
    /// Creates a spec, defaulting the image for [`DEFAULT_PYTHON_VERSION`].
    pub fn new(image: &str, env: BTreeMap<String, String>, init_commands: Vec<String>) -> Self {
        Self::with_python_version(image, DEFAULT_PYTHON_VERSION, env, init_commands)
    }

    /// Creates a spec whose default image targets `python_version`.
    pub fn with_python_version(
        image: &str,
        python_version: &str,
        mut env: BTreeMap<String, String>,
        init_commands: Vec<String>,
    ) -> Self {
        let image = if image.trim().is_empty() {
            default_image(python_version)
        } else {
            image.to_owned()
        };
        apply_region_default(&mut env);

        Self {
            image,
            env,
            init_commands,
        }
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Commands run, in order, before dependencies are installed.
    pub fn init_commands(&self) -> &[String] {
        &self.init_commands
    }
}

impl From<&ContainerConfig> for ContainerSpec {
    fn from(config: &ContainerConfig) -> Self {
        Self::with_python_version(
            config.image.as_deref().unwrap_or_default(),
            config
                .python_version
                .as_deref()
                .unwrap_or(DEFAULT_PYTHON_VERSION),
            config.env.clone(),
            config.init_commands.clone(),
        )
    }
}

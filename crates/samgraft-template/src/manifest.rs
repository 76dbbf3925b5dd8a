use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `Type` of the resources whose code location is rewritten.
pub const FUNCTION_RESOURCE_TYPE: &str = "AWS::Serverless::Function";

/// A SAM template as produced by `chalice package`.
///
/// Kept as a JSON document so that everything not rewritten round-trips
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Value);

impl Manifest {
    /// Reads and parses a template file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let value = serde_json::from_str(&content).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self(value))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The top-level `Resources` mapping.
    pub fn resources(&self) -> Result<&Map<String, Value>, ManifestError> {
        self.0
            .get("Resources")
            .and_then(Value::as_object)
            .ok_or(ManifestError::MissingResources)
    }

    fn resources_mut(&mut self) -> Result<&mut Map<String, Value>, ManifestError> {
        self.0
            .get_mut("Resources")
            .and_then(Value::as_object_mut)
            .ok_or(ManifestError::MissingResources)
    }

    /// Names of all function resources, in template order.
    ///
    /// Also checks the structure the `CodeUri` rewrite relies on: every
    /// resource has a `Type` and every function a `Properties` object.
    pub fn function_names(&self) -> Result<Vec<String>, ManifestError> {
        let mut names = Vec::new();
        for (name, resource) in self.resources()? {
            if !is_function(name, resource)? {
                continue;
            }
            if !resource.get("Properties").is_some_and(Value::is_object) {
                return Err(ManifestError::MissingProperties {
                    resource: name.clone(),
                });
            }
            names.push(name.clone());
        }
        Ok(names)
    }

    /// Replaces `Properties.<key>` of every function resource with `value`.
    /// Returns how many resources were changed.
    pub(crate) fn set_function_property(
        &mut self,
        key: &str,
        value: &Value,
    ) -> Result<usize, ManifestError> {
        let mut changed = 0;
        for (name, resource) in self.resources_mut()? {
            if !is_function(name, resource)? {
                continue;
            }
            let properties = resource
                .get_mut("Properties")
                .and_then(Value::as_object_mut)
                .ok_or_else(|| ManifestError::MissingProperties {
                    resource: name.clone(),
                })?;
            properties.insert(key.to_owned(), value.clone());
            changed += 1;
        }
        Ok(changed)
    }
}

fn is_function(name: &str, resource: &Value) -> Result<bool, ManifestError> {
    let kind = resource
        .get("Type")
        .and_then(Value::as_str)
        .ok_or_else(|| ManifestError::MissingType {
            resource: name.to_owned(),
        })?;
    Ok(kind == FUNCTION_RESOURCE_TYPE)
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read SAM template at {path} — did chalice package succeed?")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse SAM template at {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("SAM template has no `Resources` object")]
    MissingResources,

    #[error("resource '{resource}' has no `Type`")]
    MissingType { resource: String },

    #[error("function resource '{resource}' has no `Properties` object")]
    MissingProperties { resource: String },
}

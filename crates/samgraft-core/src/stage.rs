//! Chalice stage configuration store (`.chalice/config.json`).

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Location of the config store relative to the Chalice source tree.
pub const CONFIG_STORE_PATH: &str = ".chalice/config.json";

/// One stage's settings, in the same shape Chalice expects under
/// `stages.<name>` in its JSON config.
pub type StageConfig = Map<String, Value>;

/// Writes `stage_config` to `stages.<stage_name>` of the config store in
/// `source_dir`, replacing any previous entry for that stage.
///
/// The store must already exist and already contain a `stages` object.
/// Every other key keeps its value and position. The file is rewritten in
/// place with 2-space indentation; no backup is kept and concurrent writers
/// are not coordinated.
pub fn merge_stage_config(
    source_dir: &Path,
    stage_name: &str,
    stage_config: &StageConfig,
) -> Result<()> {
    let path = source_dir.join(CONFIG_STORE_PATH);
    tracing::debug!(path = %path.display(), stage = stage_name, "merging stage config");

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .map_err(|e| Error::ConfigStoreOpen {
            path: path.clone(),
            source: e,
        })?;

    let mut store = read_store(&mut file, &path)?;

    let stages = store
        .get_mut("stages")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| Error::MissingStages { path: path.clone() })?;
    stages.insert(stage_name.to_owned(), Value::Object(stage_config.clone()));

    let rendered =
        serde_json::to_string_pretty(&store).map_err(|e| Error::ConfigStoreSerialize {
            path: path.clone(),
            source: e,
        })?;

    write_store(&mut file, rendered.as_bytes())
        .map_err(|e| Error::ConfigStoreWrite { path, source: e })
}

/// Names of the stages in the config store of `source_dir`, in file order.
pub fn stage_names(source_dir: &Path) -> Result<Vec<String>> {
    let path = source_dir.join(CONFIG_STORE_PATH);
    let mut file = File::open(&path).map_err(|e| Error::ConfigStoreOpen {
        path: path.clone(),
        source: e,
    })?;
    let store = read_store(&mut file, &path)?;

    store
        .get("stages")
        .and_then(Value::as_object)
        .map(|stages| stages.keys().cloned().collect())
        .ok_or(Error::MissingStages { path })
}

fn read_store(file: &mut File, path: &Path) -> Result<Value> {
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ConfigStoreOpen {
            path: path.to_path_buf(),
            source: e,
        })?;

    serde_json::from_str(&content).map_err(|e| Error::ConfigStoreParse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_store(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(0))?;
    file.write_all(bytes)?;
    // Drop whatever remains of a longer previous document.
    file.set_len(bytes.len() as u64)?;
    file.flush()?;
    file.sync_all()
}

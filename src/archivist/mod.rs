use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::{
    error::{ErrorAction, ErrorKind, NutshellError},
    utils::{read_file::read_file, write_file::write_file},
    NutshellResult,
};

/// Owns the in-memory manifest and script configuration for a single run.
///
/// Each document is read from disk on first access and cached; every later read and write goes
/// through the cached copy until `persist` writes both back.
#[derive(Clone, PartialEq, Debug)]
pub struct Archivist {
    manifest_path: PathBuf,
    script_config_path: PathBuf,
    manifest: Option<Map<String, Value>>,
    script_config: Option<String>,
}

impl Archivist {
    pub fn new(manifest_path: PathBuf, script_config_path: PathBuf) -> Self {
        Self {
            manifest_path,
            script_config_path,
            manifest: None,
            script_config: None,
        }
    }

    /// Returns the decoded manifest, loading it on first call.
    ///
    /// # Errors
    /// - `MissingFileError` when the manifest does not exist.
    /// - `MalformedConfigError` when it is not valid JSON or its top level is not an object.
    pub async fn load_manifest(&mut self) -> NutshellResult<&mut Map<String, Value>> {
        if self.manifest.is_none() {
            let raw_manifest = read_file(
                &self.manifest_path,
                ErrorKind::ManifestFileMissing,
                ErrorKind::ManifestFileReadFailed,
            )
            .await?;

            let decoded = serde_json::from_str::<Value>(&raw_manifest).map_err(|err| {
                NutshellError::raise_critical_malformed_config_error(
                    ErrorKind::ManifestDecodeFailed,
                    &format!("Failed to decode `{}`: {}", self.manifest_path.display(), err),
                    ErrorAction::Fix,
                )
            })?;

            let Value::Object(manifest) = decoded else {
                return Err(NutshellError::raise_critical_malformed_config_error(
                    ErrorKind::ManifestNotAnObject,
                    &format!(
                        "The top level of `{}` must be a JSON object",
                        self.manifest_path.display()
                    ),
                    ErrorAction::Fix,
                ));
            };

            tracing::info!(
                "Loaded manifest {} with {} fields",
                self.manifest_path.display(),
                manifest.len()
            );

            self.manifest = Some(manifest);
        }

        Ok(self.manifest.get_or_insert_with(Map::new))
    }

    /// Returns the raw script configuration, loading it on first call.
    ///
    /// # Errors
    /// - `MissingFileError` when the script configuration does not exist.
    pub async fn load_script_config(&mut self) -> NutshellResult<&str> {
        if self.script_config.is_none() {
            let script_config = read_file(
                &self.script_config_path,
                ErrorKind::ScriptConfigFileMissing,
                ErrorKind::ScriptConfigFileReadFailed,
            )
            .await?;

            tracing::info!(
                "Loaded script config {} ({} bytes)",
                self.script_config_path.display(),
                script_config.len()
            );

            self.script_config = Some(script_config);
        }

        Ok(self.script_config.as_deref().unwrap_or_default())
    }

    /// Looks up a top-level manifest field.
    ///
    /// # Arguments
    /// - `name`: The top-level key, e.g. `name`.
    ///
    /// # Returns
    /// A clone of the field's value, or `None` when the manifest has no such key.
    ///
    /// # Errors
    /// Any error raised by `load_manifest` on first access.
    pub async fn manifest_field(&mut self, name: &str) -> NutshellResult<Option<Value>> {
        Ok(self.load_manifest().await?.get(name).cloned())
    }

    /// Assigns a top-level manifest field in memory, keeping its position when it already exists.
    ///
    /// # Errors
    /// Any error raised by `load_manifest` on first access.
    pub async fn set_manifest_field(&mut self, name: &str, value: Value) -> NutshellResult<()> {
        tracing::debug!("Setting manifest field `{}` to {}", name, value);

        self.load_manifest().await?.insert(name.to_string(), value);

        Ok(())
    }

    /// Replaces the in-memory script configuration.
    pub async fn set_script_config(&mut self, script_config: String) -> NutshellResult<()> {
        // Load first so a missing file still surfaces before the document is overwritten.
        self.load_script_config().await?;
        self.script_config = Some(script_config);

        Ok(())
    }

    /// Writes the manifest (pretty-printed, key order preserved) and the script configuration back to disk.
    ///
    /// # Errors
    /// - `PersistenceError` when the manifest cannot be encoded or either file cannot be written.
    /// - Any error raised while loading a document that was never accessed.
    pub async fn persist(&mut self) -> NutshellResult<()> {
        let manifest = Value::Object(self.load_manifest().await?.clone());
        let mut encoded = serde_json::to_string_pretty(&manifest).map_err(|err| {
            NutshellError::raise_critical_persistence_error(
                ErrorKind::ManifestEncodeFailed,
                &err.to_string(),
                ErrorAction::Exit,
            )
        })?;
        encoded.push('\n');

        let script_config = self.load_script_config().await?.to_string();

        write_file(&self.manifest_path, &encoded).await?;
        write_file(&self.script_config_path, &script_config).await?;

        tracing::info!(
            "Persisted {} and {}",
            self.manifest_path.display(),
            self.script_config_path.display()
        );

        Ok(())
    }
}

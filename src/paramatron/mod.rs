use std::fmt;

use serde_json::Value;

use crate::{
    archivist::Archivist,
    error::{ErrorAction, ErrorKind, NutshellError},
    utils::script_var::find_script_var,
    NutshellResult,
};

/// The two documents a parameter can live in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FileGroup {
    /// The structured JSON manifest (`package.json`).
    Manifest,
    /// The build-script configuration text (`gulpfile.js`).
    ScriptConfig,
}

impl fmt::Display for FileGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileGroup::Manifest => write!(f, "manifest"),
            FileGroup::ScriptConfig => write!(f, "script-config"),
        }
    }
}

/// The closed set of parameters the operator may customize.
///
/// Each variant knows where it lives, how it is explained to the operator and how its current value is read;
/// the matching side effects live in `transmutator`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ConfigurableParam {
    /// `name` field of the manifest.
    PackageName,
    /// `var themePath = "...";` in the script configuration.
    ThemePath,
    /// `var bsProxy = "...";` in the script configuration.
    BrowserSyncProxy,
}

impl ConfigurableParam {
    /// Every parameter, in the order the operator is asked about them.
    pub const ALL: [ConfigurableParam; 3] = [
        ConfigurableParam::PackageName,
        ConfigurableParam::ThemePath,
        ConfigurableParam::BrowserSyncProxy,
    ];

    pub fn file_group(&self) -> FileGroup {
        match self {
            ConfigurableParam::PackageName => FileGroup::Manifest,
            ConfigurableParam::ThemePath | ConfigurableParam::BrowserSyncProxy => {
                FileGroup::ScriptConfig
            }
        }
    }

    /// Key of the parameter inside its document.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigurableParam::PackageName => "name",
            ConfigurableParam::ThemePath => "themePath",
            ConfigurableParam::BrowserSyncProxy => "bsProxy",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            ConfigurableParam::PackageName => "Name of the project package",
            ConfigurableParam::ThemePath => "Folder holding the theme sources",
            ConfigurableParam::BrowserSyncProxy => "Host Browsersync proxies while developing",
        }
    }

    /// Reads the current value of the parameter.
    ///
    /// Manifest parameters must exist: an absent field is a `MissingFieldError`. Script parameters are optional:
    /// `None` means the script never assigns them and the parameter is not configurable for this run.
    pub async fn extract(&self, archivist: &mut Archivist) -> NutshellResult<Option<String>> {
        match self.file_group() {
            FileGroup::Manifest => extract_manifest_value(archivist, self.name())
                .await
                .map(Some),
            FileGroup::ScriptConfig => {
                let script_config = archivist.load_script_config().await?;

                Ok(find_script_var(script_config, self.name()))
            }
        }
    }
}

impl fmt::Display for ConfigurableParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.file_group(), self.name())
    }
}

async fn extract_manifest_value(archivist: &mut Archivist, name: &str) -> NutshellResult<String> {
    match archivist.manifest_field(name).await? {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(NutshellError::raise_critical_malformed_config_error(
            ErrorKind::ManifestFieldNotAString,
            &format!("Manifest field `{}` must be a string, found {}", name, other),
            ErrorAction::Fix,
        )),
        None => Err(NutshellError::raise_critical_missing_field_error(
            ErrorKind::ManifestFieldMissing,
            &format!("Manifest field `{}` is missing", name),
            ErrorAction::Fix,
        )),
    }
}

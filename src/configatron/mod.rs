use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::{
    error::{ErrorAction, ErrorKind, NutshellError},
    NutshellResult,
};

/// Name of the optional installer configuration file, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "nutshell.config.json";

/// Represents installer settings, deserialized from `nutshell.config.json`.
///
/// Every field has a default, so an empty object (or no file at all) yields the stock layout.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
pub struct ConfigurationJson {
    /// Structured manifest file name. Renamed in JSON as `manifestFile`, defaults to `package.json`.
    #[serde(rename = "manifestFile", default = "default_manifest_file")]
    pub manifest_file: String,

    /// Build-script configuration file name. Renamed in JSON as `scriptConfigFile`,
    /// defaults to `gulpfile.js`.
    #[serde(rename = "scriptConfigFile", default = "default_script_config_file")]
    pub script_config_file: String,

    /// Suffix of the distribution counterparts. Renamed in JSON as `distSuffix`, defaults to `.dist`.
    #[serde(rename = "distSuffix", default = "default_dist_suffix")]
    pub dist_suffix: String,

    /// Root segment every theme path lives under. Always stored with one trailing `/`.
    #[serde(
        rename = "themeRoot",
        default = "default_theme_root",
        deserialize_with = "normalize_theme_root"
    )]
    pub theme_root: String,

    /// Whether a log file is written for the run. Renamed in JSON as `enableLogs`, defaults to `false`.
    #[serde(rename = "enableLogs", default = "disabled_by_default")]
    pub enable_logs: bool,

    /// Folder receiving the log files. Renamed in JSON as `logsDir`, defaults to `logs`.
    #[serde(rename = "logsDir", default = "default_logs_dir")]
    pub logs_dir: String,
}

impl Default for ConfigurationJson {
    fn default() -> Self {
        Self {
            manifest_file: default_manifest_file(),
            script_config_file: default_script_config_file(),
            dist_suffix: default_dist_suffix(),
            theme_root: default_theme_root(),
            enable_logs: disabled_by_default(),
            logs_dir: default_logs_dir(),
        }
    }
}

fn default_manifest_file() -> String {
    info!("Setting default manifest file to 'package.json'");

    "package.json".to_string()
}

fn default_script_config_file() -> String {
    info!("Setting default script config file to 'gulpfile.js'");

    "gulpfile.js".to_string()
}

fn default_dist_suffix() -> String {
    ".dist".to_string()
}

fn default_theme_root() -> String {
    info!("Setting default theme root to 'files/'");

    "files/".to_string()
}

fn disabled_by_default() -> bool {
    false
}

fn default_logs_dir() -> String {
    "logs".to_string()
}

fn normalize_theme_root<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let root = String::deserialize(deserializer)?;
    let trimmed = root.trim().trim_matches('/');
    let normalized_root = if trimmed.is_empty() {
        default_theme_root()
    } else {
        format!("{}/", trimmed)
    };

    info!(
        "Normalized theme root from '{}' to '{}'",
        root, normalized_root
    );

    Ok(normalized_root)
}

/// Resolved installer settings, anchored at the project root.
#[derive(Clone, PartialEq, Debug)]
pub struct Configatron {
    /// Project root every relative path is resolved against.
    root_dir: PathBuf,
    manifest_file: String,
    script_config_file: String,
    dist_suffix: String,
    theme_root: String,
    enable_logs: bool,
    logs_dir: String,
}

impl Configatron {
    pub fn new(root_dir: PathBuf, config_json: ConfigurationJson) -> Self {
        info!(
            "Initializing Nutshell configurations with root: {:?}, manifest: {}, script config: {}, \
            dist suffix: {}, theme root: {}, logs enabled: {}",
            root_dir,
            config_json.manifest_file,
            config_json.script_config_file,
            config_json.dist_suffix,
            config_json.theme_root,
            config_json.enable_logs
        );

        Self {
            root_dir,
            manifest_file: config_json.manifest_file,
            script_config_file: config_json.script_config_file,
            dist_suffix: config_json.dist_suffix,
            theme_root: config_json.theme_root,
            enable_logs: config_json.enable_logs,
            logs_dir: config_json.logs_dir,
        }
    }

    /// Loads `nutshell.config.json` from `root_dir`, falling back to the defaults when the file is absent.
    ///
    /// # Errors
    /// A file that exists but cannot be read or parsed is a fatal runtime error.
    pub async fn load(root_dir: &Path) -> NutshellResult<Self> {
        let config_path = root_dir.join(CONFIG_FILE_NAME);

        if tokio::fs::metadata(&config_path).await.is_err() {
            info!("No {} found, using the default layout", CONFIG_FILE_NAME);

            return Ok(Self::new(root_dir.to_path_buf(), ConfigurationJson::default()));
        }

        let raw_config = tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|err| {
                NutshellError::raise_critical_runtime_error(
                    ErrorKind::ConfigFileReadError,
                    &format!("Failed to read {}: {}", config_path.display(), err),
                    ErrorAction::Fix,
                )
            })?;

        let config_json: ConfigurationJson = serde_json::from_str(&raw_config).map_err(|err| {
            NutshellError::raise_critical_runtime_error(
                ErrorKind::ConfigFileParsingError,
                &format!("Failed to parse {}: {}", config_path.display(), err),
                ErrorAction::Fix,
            )
        })?;

        Ok(Self::new(root_dir.to_path_buf(), config_json))
    }

    pub fn get_root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Absolute path of the structured manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.root_dir.join(&self.manifest_file)
    }

    /// Absolute path of the build-script configuration.
    pub fn script_config_path(&self) -> PathBuf {
        self.root_dir.join(&self.script_config_file)
    }

    /// Distribution counterpart of `target`, e.g. `package.json` -> `package.json.dist`.
    pub fn dist_path_of(&self, target: &Path) -> PathBuf {
        let mut dist = target.as_os_str().to_owned();
        dist.push(&self.dist_suffix);

        PathBuf::from(dist)
    }

    pub fn get_manifest_file(&self) -> String {
        self.manifest_file.clone()
    }

    pub fn get_script_config_file(&self) -> String {
        self.script_config_file.clone()
    }

    /// Theme root segment, always ending with a single `/`.
    pub fn get_theme_root(&self) -> String {
        self.theme_root.clone()
    }

    pub fn get_enable_logs(&self) -> bool {
        self.enable_logs
    }

    pub fn logs_path(&self) -> PathBuf {
        self.root_dir.join(&self.logs_dir)
    }
}

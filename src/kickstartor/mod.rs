use std::path::PathBuf;

use tokio::fs;

use crate::{
    configatron::Configatron,
    error::{ErrorAction, ErrorKind, NutshellError},
    NutshellResult,
};

/// Materializes the manifest and script configuration from their distribution files.
#[derive(Clone, PartialEq, Debug)]
pub struct Kickstartor {
    /// Target file paired with its distribution counterpart.
    targets: Vec<(PathBuf, PathBuf)>,
}

impl Kickstartor {
    pub fn new(configatron: &Configatron) -> Self {
        let targets = [configatron.manifest_path(), configatron.script_config_path()]
            .into_iter()
            .map(|target| {
                let dist = configatron.dist_path_of(&target);

                (target, dist)
            })
            .collect();

        Self { targets }
    }

    /// Copies every absent target from its distribution file and returns the copied targets.
    ///
    /// An empty result means the project was already initialized.
    ///
    /// # Errors
    /// - `MissingFileError` when a target is absent and so is its distribution file.
    /// - `PersistenceError` when the copy fails.
    pub async fn kickstart(&self) -> NutshellResult<Vec<PathBuf>> {
        let mut copied = vec![];

        for (target, dist) in &self.targets {
            if fs::metadata(target).await.is_ok() {
                tracing::debug!("{} already exists", target.display());
                continue;
            }

            if fs::metadata(dist).await.is_err() {
                return Err(NutshellError::raise_critical_missing_file_error(
                    ErrorKind::DistributionFileMissing,
                    &format!(
                        "Neither `{}` nor its distribution file `{}` exists",
                        target.display(),
                        dist.display()
                    ),
                    ErrorAction::Fix,
                ));
            }

            fs::copy(dist, target).await.map_err(|err| {
                NutshellError::raise_critical_persistence_error(
                    ErrorKind::DistributionFileCopyFailed,
                    &format!(
                        "Failed to copy `{}` to `{}`: {}",
                        dist.display(),
                        target.display(),
                        err
                    ),
                    ErrorAction::Exit,
                )
            })?;

            tracing::info!("Copied {} to {}", dist.display(), target.display());

            copied.push(target.clone());
        }

        Ok(copied)
    }
}

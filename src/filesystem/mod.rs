use std::path::Path;

use tokio::fs;

use crate::{
    error::{ErrorAction, ErrorKind, NutshellError},
    NutshellResult,
};

/// Filesystem primitives the installer relies on.
#[allow(async_fn_in_trait)]
pub trait Filesystem {
    /// Moves the directory at `from` to `to`.
    ///
    /// # Errors
    /// `RenameError` when `from` does not exist, `to` is already occupied, or the move itself fails.
    async fn rename(&self, from: &Path, to: &Path) -> NutshellResult<()>;

    /// Canonicalizes separators and `.`/`..` segments without touching the disk.
    fn normalize_path(&self, path: &str) -> String;
}

#[derive(Clone, Copy, Default, Debug)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    async fn rename(&self, from: &Path, to: &Path) -> NutshellResult<()> {
        tracing::info!("Renaming {} to {}", from.display(), to.display());

        if fs::metadata(from).await.is_err() {
            return Err(NutshellError::raise_critical_rename_error(
                ErrorKind::RenameSourceMissing,
                &format!("Cannot rename `{}`: it does not exist", from.display()),
                ErrorAction::Fix,
            ));
        }

        if fs::metadata(to).await.is_ok() {
            return Err(NutshellError::raise_critical_rename_error(
                ErrorKind::RenameTargetOccupied,
                &format!("Cannot rename to `{}`: it already exists", to.display()),
                ErrorAction::Fix,
            ));
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).await.map_err(|err| {
                NutshellError::raise_critical_rename_error(
                    ErrorKind::RenameParentCreationFailed,
                    &format!("Failed to create `{}`: {}", parent.display(), err),
                    ErrorAction::Fix,
                )
            })?;
        }

        fs::rename(from, to).await.map_err(|err| {
            NutshellError::raise_critical_rename_error(
                ErrorKind::DirectoryRenameFailed,
                &format!(
                    "Failed to rename `{}` to `{}`: {}",
                    from.display(),
                    to.display(),
                    err
                ),
                ErrorAction::Fix,
            )
        })
    }

    fn normalize_path(&self, path: &str) -> String {
        normalize_path(path)
    }
}

/// Lexically normalizes a `/`-separated path.
///
/// Backslashes become `/`, empty and `.` segments are dropped and `..` pops the previous segment. A relative path
/// keeps leading `..` segments; an absolute one cannot climb above `/`. The result has no trailing separator.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let is_absolute = unified.starts_with('/');
    let mut segments: Vec<&str> = vec![];

    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if !is_absolute => segments.push(".."),
                _ => {}
            },
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");

    if is_absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

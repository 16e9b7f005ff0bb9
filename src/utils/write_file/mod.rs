use std::path::Path;

use tokio::{fs, io::AsyncWriteExt};

use crate::{
    error::{ErrorAction, ErrorKind, NutshellError},
    NutshellResult,
};

/// Writes `write_context` to `file_path`, creating or truncating the file, and syncs it to storage.
///
/// # Arguments
/// - `file_path`: Destination file; its parent directory must already exist.
/// - `write_context`: The complete new content of the file.
///
/// # Returns
/// `Ok(())` once the content has been written and synced.
///
/// # Errors
/// Every failure is a critical persistence error:
/// - `FileCreationError`: the file cannot be created or truncated.
/// - `FileWriteError`: writing the content fails.
/// - `FileSyncError`: flushing the content to storage fails.
pub async fn write_file(file_path: &Path, write_context: &str) -> NutshellResult<()> {
    tracing::info!("Starting the write operation for file: {:?}", file_path);

    let mut file = fs::File::create(file_path).await.map_err(|err| {
        NutshellError::raise_critical_persistence_error(
            ErrorKind::FileCreationError,
            &format!("Failed to open `{}`: {}", file_path.display(), err),
            ErrorAction::Exit,
        )
    })?;

    tracing::debug!(
        "Writing content to file. Content size: {} bytes.",
        write_context.len()
    );

    file.write_all(write_context.as_bytes())
        .await
        .map_err(|err| {
            NutshellError::raise_critical_persistence_error(
                ErrorKind::FileWriteError,
                &format!("Failed to write `{}`: {}", file_path.display(), err),
                ErrorAction::Exit,
            )
        })?;

    file.sync_all().await.map_err(|err| {
        NutshellError::raise_critical_persistence_error(
            ErrorKind::FileSyncError,
            &format!("Failed to sync `{}`: {}", file_path.display(), err),
            ErrorAction::Exit,
        )
    })?;

    tracing::info!("Write operation completed successfully for file.");

    Ok(())
}

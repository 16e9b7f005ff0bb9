use std::path::Path;

use crate::{
    error::{ErrorAction, ErrorKind, NutshellError},
    NutshellResult,
};

/// Reads a required file into memory.
///
/// A path that does not exist raises `missing_kind`; any other I/O failure raises `read_kind`.
/// Both are reported as missing-file errors, since the run cannot continue without the file.
pub async fn read_file(
    path: &Path,
    missing_kind: ErrorKind,
    read_kind: ErrorKind,
) -> NutshellResult<String> {
    tracing::debug!("Reading file: {}", path.display());

    tokio::fs::read_to_string(path).await.map_err(|err| {
        let (kind, message) = if err.kind() == std::io::ErrorKind::NotFound {
            (
                missing_kind,
                format!(
                    "The file `{}` does not exist. Was the distribution file copied?",
                    path.display()
                ),
            )
        } else {
            (
                read_kind,
                format!("Failed to read `{}`: {}", path.display(), err),
            )
        };

        NutshellError::raise_critical_missing_file_error(kind, &message, ErrorAction::Fix)
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::{
        error::{ErrorKind, ErrorType},
        utils::read_file::read_file,
    };

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gulpfile.js");
        std::fs::write(&path, "var bsProxy = \"nutshell.localhost\";\n").unwrap();

        let content = read_file(
            &path,
            ErrorKind::ScriptConfigFileMissing,
            ErrorKind::ScriptConfigFileReadFailed,
        )
        .await
        .unwrap();

        assert_eq!(content, "var bsProxy = \"nutshell.localhost\";\n");
    }

    #[tokio::test]
    async fn missing_file_raises_missing_kind() {
        let dir = TempDir::new().unwrap();

        let error = read_file(
            &dir.path().join("package.json"),
            ErrorKind::ManifestFileMissing,
            ErrorKind::ManifestFileReadFailed,
        )
        .await
        .unwrap_err();

        assert_eq!(error.get_type(), ErrorType::MissingFileError);
        assert_eq!(error.get_kind(), ErrorKind::ManifestFileMissing);
    }
}

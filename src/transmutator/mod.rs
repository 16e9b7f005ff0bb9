use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{
    archivist::Archivist,
    filesystem::Filesystem,
    paramatron::ConfigurableParam,
    resolvatron::{Resolution, ResolvedValue},
    utils::script_var::replace_script_var,
    NutshellResult,
};

/// Applies accepted values to the in-memory documents, plus the theme folder rename.
///
/// Nothing is written to the documents on disk here; that is left to `Archivist::persist`.
pub struct Transmutator<'a, F: Filesystem> {
    filesystem: &'a F,
    root_dir: PathBuf,
    theme_root: String,
}

impl<'a, F: Filesystem> Transmutator<'a, F> {
    pub fn new(filesystem: &'a F, root_dir: &Path, theme_root: String) -> Self {
        Self {
            filesystem,
            root_dir: root_dir.to_path_buf(),
            theme_root,
        }
    }

    /// Runs the applier of every resolved parameter whose accepted value differs from its current value.
    ///
    /// # Arguments
    /// - `resolution`: The current and accepted values collected by `resolvatron::resolve`.
    /// - `archivist`: The in-memory documents receiving the accepted values.
    ///
    /// # Returns
    /// `Ok(())` once every changed parameter has been applied in memory.
    ///
    /// # Errors
    /// - `RenameError` when the theme folder cannot be moved; the script text keeps its old `themePath`.
    /// - Any error raised while loading the documents.
    pub async fn apply(
        &self,
        resolution: &Resolution,
        archivist: &mut Archivist,
    ) -> NutshellResult<()> {
        for (param, value) in resolution.iter() {
            if !value.is_changed() {
                tracing::debug!("{} unchanged, nothing to apply", param);
                continue;
            }

            tracing::info!("Applying {} = '{}'", param, value.accepted);

            match param {
                ConfigurableParam::PackageName => {
                    archivist
                        .set_manifest_field(param.name(), Value::String(value.accepted.clone()))
                        .await?;
                }
                ConfigurableParam::ThemePath => self.apply_theme_path(value, archivist).await?,
                ConfigurableParam::BrowserSyncProxy => {
                    self.rewrite_script_var(archivist, param.name(), &value.accepted)
                        .await?;
                }
            }
        }

        Ok(())
    }

    /// Moves the theme folder to the normalized accepted path, then points `themePath` at it.
    async fn apply_theme_path(
        &self,
        value: &ResolvedValue,
        archivist: &mut Archivist,
    ) -> NutshellResult<()> {
        let theme_path = self.normalize_theme_path(&value.accepted);

        if theme_path == value.current {
            tracing::info!("Theme path '{}' already in place", theme_path);

            return Ok(());
        }

        let current_dir = self.resolve_dir(&value.current);
        let target_dir = self.resolve_dir(&theme_path);

        if current_dir == target_dir {
            tracing::info!(
                "Theme folder {} already in place, only normalizing '{}' to '{}'",
                current_dir.display(),
                value.current,
                theme_path
            );
        } else {
            // The script must only reference the new folder once it exists.
            self.filesystem.rename(&current_dir, &target_dir).await?;
        }

        self.rewrite_script_var(
            archivist,
            ConfigurableParam::ThemePath.name(),
            &theme_path,
        )
        .await
    }

    async fn rewrite_script_var(
        &self,
        archivist: &mut Archivist,
        name: &str,
        value: &str,
    ) -> NutshellResult<()> {
        let rewritten = replace_script_var(archivist.load_script_config().await?, name, value);

        archivist.set_script_config(rewritten).await
    }

    /// Relative form under the theme root with exactly one trailing `/`, e.g. `new` -> `files/new/`.
    pub fn normalize_theme_path(&self, path: &str) -> String {
        let normalized = self.filesystem.normalize_path(path.trim());
        let relative = normalized.trim_start_matches('/');
        let root_segment = self.theme_root.trim_end_matches('/');

        let rooted = if relative == root_segment || relative.starts_with(&self.theme_root) {
            relative.to_string()
        } else {
            format!("{}{}", self.theme_root, relative)
        };

        format!("{}/", rooted.trim_end_matches('/'))
    }

    fn resolve_dir(&self, theme_path: &str) -> PathBuf {
        self.root_dir
            .join(self.filesystem.normalize_path(theme_path.trim()).trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::{
        archivist::Archivist,
        error::{ErrorKind, ErrorType},
        filesystem::LocalFilesystem,
        mocks::test_helpers::{
            mock_materialized_project, read, RecordingFilesystem, ScriptedInteraction, GULPFILE,
            MANIFEST,
        },
        resolvatron::resolve,
        transmutator::Transmutator,
    };

    #[test]
    fn normalizes_theme_paths() {
        let filesystem = LocalFilesystem;
        let transmutator =
            Transmutator::new(&filesystem, std::path::Path::new("/"), "files/".to_string());

        assert_eq!(transmutator.normalize_theme_path("new"), "files/new/");
        assert_eq!(transmutator.normalize_theme_path("files/new"), "files/new/");
        assert_eq!(transmutator.normalize_theme_path("files/new//"), "files/new/");
        assert_eq!(transmutator.normalize_theme_path("./themes/./new/"), "files/themes/new/");
        assert_eq!(transmutator.normalize_theme_path("/files/new"), "files/new/");
        assert_eq!(transmutator.normalize_theme_path("files\\new"), "files/new/");
        assert_eq!(transmutator.normalize_theme_path("filesystem"), "files/filesystem/");
    }

    async fn resolve_and_apply(
        dir: &tempfile::TempDir,
        answers: &[&str],
        filesystem: &RecordingFilesystem,
    ) -> (Archivist, crate::NutshellResult<()>) {
        let mut archivist = Archivist::new(
            dir.path().join("package.json"),
            dir.path().join("gulpfile.js"),
        );
        let mut interaction = ScriptedInteraction::answering(answers);
        let resolution = resolve(&mut archivist, &mut interaction).await.unwrap();
        let transmutator = Transmutator::new(filesystem, dir.path(), "files/".to_string());
        let result = transmutator.apply(&resolution, &mut archivist).await;

        (archivist, result)
    }

    #[tokio::test]
    async fn theme_path_change_renames_folder_and_rewrites_script() {
        let dir = mock_materialized_project(MANIFEST, GULPFILE);
        let filesystem = RecordingFilesystem::default();

        let (mut archivist, result) = resolve_and_apply(&dir, &["", "new", ""], &filesystem).await;
        result.unwrap();

        assert_eq!(
            filesystem.renames.borrow().as_slice(),
            &[(dir.path().join("files/old"), dir.path().join("files/new"))]
        );
        assert!(dir.path().join("files/new/theme.scss").exists());
        assert!(!dir.path().join("files/old").exists());

        let script = archivist.load_script_config().await.unwrap();
        assert!(script.contains("var themePath = \"files/new/\";"));
        assert_eq!(script, GULPFILE.replace("files/old/", "files/new/"));
    }

    #[tokio::test]
    async fn equivalent_theme_path_is_a_no_op() {
        let dir = mock_materialized_project(MANIFEST, GULPFILE);
        let filesystem = RecordingFilesystem::default();

        let (mut archivist, result) = resolve_and_apply(&dir, &["", "old", ""], &filesystem).await;
        result.unwrap();

        assert!(filesystem.renames.borrow().is_empty());
        assert_eq!(archivist.load_script_config().await.unwrap(), GULPFILE);
    }

    #[tokio::test]
    async fn unnormalized_current_theme_path_is_rewritten_without_rename() {
        let gulpfile = GULPFILE.replace("\"files/old/\"", "\"files/old\"");
        let dir = mock_materialized_project(MANIFEST, &gulpfile);
        let filesystem = RecordingFilesystem::default();

        let (mut archivist, result) = resolve_and_apply(&dir, &["", "old", ""], &filesystem).await;
        result.unwrap();

        assert!(filesystem.renames.borrow().is_empty());
        assert!(dir.path().join("files/old/theme.scss").exists());
        assert_eq!(archivist.load_script_config().await.unwrap(), GULPFILE);
    }

    #[tokio::test]
    async fn failed_rename_leaves_script_untouched() {
        let dir = mock_materialized_project(MANIFEST, GULPFILE);
        std::fs::create_dir_all(dir.path().join("files/new")).unwrap();
        let filesystem = RecordingFilesystem::default();

        let (mut archivist, result) = resolve_and_apply(&dir, &["", "new", ""], &filesystem).await;
        let error = result.unwrap_err();

        assert_eq!(error.get_type(), ErrorType::RenameError);
        assert_eq!(error.get_kind(), ErrorKind::RenameTargetOccupied);
        assert_eq!(archivist.load_script_config().await.unwrap(), GULPFILE);
        assert!(dir.path().join("files/old/theme.scss").exists());
    }

    #[tokio::test]
    async fn proxy_change_only_rewrites_script() {
        let dir = mock_materialized_project(MANIFEST, GULPFILE);
        let filesystem = RecordingFilesystem::default();

        let (mut archivist, result) =
            resolve_and_apply(&dir, &["", "", "example.localhost"], &filesystem).await;
        result.unwrap();

        assert!(filesystem.renames.borrow().is_empty());
        assert_eq!(
            archivist.load_script_config().await.unwrap(),
            GULPFILE.replace(
                "var bsProxy = \"nutshell.localhost\";",
                "var bsProxy = \"example.localhost\";"
            )
        );
    }

    #[tokio::test]
    async fn package_name_change_only_touches_name() {
        let dir = mock_materialized_project(MANIFEST, GULPFILE);
        let filesystem = RecordingFilesystem::default();

        let (mut archivist, result) =
            resolve_and_apply(&dir, &["new-project", "", ""], &filesystem).await;
        result.unwrap();

        let manifest = archivist.load_manifest().await.unwrap().clone();
        let original: Value = serde_json::from_str(MANIFEST).unwrap();

        assert_eq!(manifest.get("name"), Some(&json!("new-project")));
        assert_eq!(manifest.get("version"), original.get("version"));
        assert_eq!(
            manifest.get("devDependencies"),
            original.get("devDependencies")
        );
        assert_eq!(manifest.keys().next().map(String::as_str), Some("name"));

        // Appliers work in memory only.
        assert_eq!(read(&dir, "package.json"), MANIFEST);
    }
}

use std::{io, path::PathBuf};

use archivist::Archivist;
use chrono::Local;
use configatron::Configatron;
use error::{ErrorAction, ErrorKind, NutshellError};
use filesystem::{Filesystem, LocalFilesystem};
use interaction::{Interaction, TerminalInteraction};
use kickstartor::Kickstartor;
use resolvatron::Resolution;
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::FmtSubscriber;
use transmutator::Transmutator;

pub mod archivist;
pub mod configatron;
pub mod error;
pub mod filesystem;
pub mod interaction;
pub mod kickstartor;
pub mod paramatron;
pub mod resolvatron;
pub mod transmutator;

mod utils;

#[derive(Clone, PartialEq, Debug)]
pub enum NutshellRuntimeKind {
    /// Bootstrap the project and customize it.
    Init,
}

/// Flags of a runtime invocation.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct NutshellOptions {
    /// Never prompt, even on a terminal.
    pub no_interaction: bool,
    /// Customize again even when both files already exist.
    pub reconfigure: bool,
}

pub type NutshellRuntimeResult<T> = io::Result<T>;
pub type NutshellResult<T> = Result<T, NutshellError>;

/// What a run ended up doing.
#[derive(Clone, PartialEq, Debug)]
pub enum InitializationOutcome {
    /// No operator available; only the listed distribution files were copied.
    NonInteractive { copied: Vec<PathBuf> },
    /// Both files were already present, nothing was asked or written.
    AlreadyInitialized,
    /// The operator was asked and both files were persisted.
    Customized(Resolution),
}

/// Bootstraps the project and, when an operator is available, walks through every configurable parameter.
///
/// Files are written only at the very end: any error raised before that leaves both documents as they were
/// after the bootstrap copy.
pub async fn initialize_nutshell<I: Interaction, F: Filesystem>(
    configatron: &Configatron,
    interaction: &mut I,
    filesystem: &F,
    reconfigure: bool,
) -> NutshellResult<InitializationOutcome> {
    let copied = Kickstartor::new(configatron).kickstart().await?;

    if !interaction.is_interactive() {
        tracing::info!("Distribution files are copied. Nothing left to do.");

        return Ok(InitializationOutcome::NonInteractive { copied });
    }

    if copied.is_empty() && !reconfigure {
        tracing::info!("Project already initialized, skipping customization");

        return Ok(InitializationOutcome::AlreadyInitialized);
    }

    let mut archivist = Archivist::new(
        configatron.manifest_path(),
        configatron.script_config_path(),
    );

    let resolution = resolvatron::resolve(&mut archivist, interaction).await?;

    Transmutator::new(
        filesystem,
        configatron.get_root_dir(),
        configatron.get_theme_root(),
    )
    .apply(&resolution, &mut archivist)
    .await?;

    archivist.persist().await?;

    tracing::info!(
        "Customization finished. Changed parameters: {}",
        resolution.iter().filter(|(_, value)| value.is_changed()).count()
    );

    Ok(InitializationOutcome::Customized(resolution))
}

#[derive(Clone, PartialEq, Debug)]
pub struct NutshellRuntime {
    runtime_mode: NutshellRuntimeKind,
    current_dir: PathBuf,
    options: NutshellOptions,
}

impl NutshellRuntime {
    pub fn new(
        runtime_mode: NutshellRuntimeKind,
        current_dir: PathBuf,
        options: NutshellOptions,
    ) -> Self {
        Self {
            runtime_mode,
            current_dir,
            options,
        }
    }

    pub async fn run(&mut self) -> NutshellRuntimeResult<()> {
        match self.runtime_mode {
            NutshellRuntimeKind::Init => self.start_init_mode().await,
        }
    }

    async fn start_init_mode(&mut self) -> NutshellRuntimeResult<()> {
        let configatron = Configatron::load(&self.current_dir).await?;

        // Keeps the non-blocking log writer alive until the run is over.
        let _guard = self.install_log_subscriber(&configatron);

        let mut interaction = TerminalInteraction::new(self.options.no_interaction);

        let outcome = initialize_nutshell(
            &configatron,
            &mut interaction,
            &LocalFilesystem,
            self.options.reconfigure,
        )
        .await?;

        if let InitializationOutcome::AlreadyInitialized = outcome {
            println!("Nutshell is already initialized. Run with --reconfigure to customize it again.");
        }

        Ok(())
    }

    fn generate_log_filename(&self) -> String {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();

        format!("nutshell_log_{}.log", timestamp)
    }

    /// Routes traces to a log file when enabled, otherwise only warnings and errors reach stderr.
    fn install_log_subscriber(&self, configatron: &Configatron) -> Option<WorkerGuard> {
        let (result, guard) = if configatron.get_enable_logs() {
            let file_appender =
                rolling::never(configatron.logs_path(), self.generate_log_filename());
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let subscriber = FmtSubscriber::builder()
                .with_max_level(Level::TRACE)
                .with_writer(non_blocking)
                .finish();

            (tracing::subscriber::set_global_default(subscriber), Some(guard))
        } else {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(Level::WARN)
                .with_writer(io::stderr)
                .finish();

            (tracing::subscriber::set_global_default(subscriber), None)
        };

        if let Err(err) = result {
            NutshellError::raise_general_runtime_error(
                ErrorKind::TracingSubscriberInitializationFailed,
                &err.to_string(),
                ErrorAction::Ignore,
            );
        }

        guard
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::{
        error::ErrorType,
        initialize_nutshell,
        mocks::test_helpers::{
            mock_configatron, mock_distribution_project, mock_materialized_project, read,
            RecordingFilesystem, ScriptedInteraction, GULPFILE, MANIFEST,
        },
        InitializationOutcome,
    };

    #[tokio::test]
    async fn non_interactive_run_only_copies_distribution_files() {
        let dir = mock_distribution_project();
        let mut interaction = ScriptedInteraction::non_interactive();
        let filesystem = RecordingFilesystem::default();

        let outcome = initialize_nutshell(
            &mock_configatron(&dir),
            &mut interaction,
            &filesystem,
            false,
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            InitializationOutcome::NonInteractive {
                copied: vec![dir.path().join("package.json"), dir.path().join("gulpfile.js")],
            }
        );
        assert!(interaction.prompts.is_empty());
        assert!(filesystem.renames.borrow().is_empty());
        assert_eq!(read(&dir, "package.json"), MANIFEST);
        assert_eq!(read(&dir, "gulpfile.js"), GULPFILE);
    }

    #[tokio::test]
    async fn already_initialized_project_is_left_alone() {
        let dir = mock_materialized_project(r#"{"name":"compact"}"#, GULPFILE);
        let mut interaction = ScriptedInteraction::answering(&["new-project"]);

        let outcome = initialize_nutshell(
            &mock_configatron(&dir),
            &mut interaction,
            &RecordingFilesystem::default(),
            false,
        )
        .await
        .unwrap();

        assert_eq!(outcome, InitializationOutcome::AlreadyInitialized);
        assert!(interaction.prompts.is_empty());
        assert_eq!(read(&dir, "package.json"), r#"{"name":"compact"}"#);
    }

    #[tokio::test]
    async fn customization_persists_every_change() {
        let dir = mock_distribution_project();
        let mut interaction =
            ScriptedInteraction::answering(&["new-project", "new", "example.localhost"]);
        let filesystem = RecordingFilesystem::default();

        let outcome = initialize_nutshell(
            &mock_configatron(&dir),
            &mut interaction,
            &filesystem,
            false,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, InitializationOutcome::Customized(ref r) if r.has_changes()));

        let manifest: Value = serde_json::from_str(&read(&dir, "package.json")).unwrap();
        let mut expected: Value = serde_json::from_str(MANIFEST).unwrap();
        expected["name"] = json!("new-project");
        assert_eq!(manifest, expected);

        assert_eq!(
            read(&dir, "gulpfile.js"),
            GULPFILE
                .replace("var themePath = \"files/old/\";", "var themePath = \"files/new/\";")
                .replace(
                    "var bsProxy = \"nutshell.localhost\";",
                    "var bsProxy = \"example.localhost\";"
                )
        );
        assert!(dir.path().join("files/new/theme.scss").exists());
        assert!(!dir.path().join("files/old").exists());
    }

    #[tokio::test]
    async fn accepting_defaults_keeps_files_byte_identical() {
        let dir = mock_distribution_project();
        let mut interaction = ScriptedInteraction::answering(&["", "", ""]);

        initialize_nutshell(
            &mock_configatron(&dir),
            &mut interaction,
            &RecordingFilesystem::default(),
            false,
        )
        .await
        .unwrap();

        assert_eq!(interaction.prompts.len(), 3);
        assert_eq!(read(&dir, "package.json"), MANIFEST);
        assert_eq!(read(&dir, "gulpfile.js"), GULPFILE);
    }

    #[tokio::test]
    async fn reconfiguring_with_same_answers_is_idempotent() {
        let dir = mock_distribution_project();
        let configatron = mock_configatron(&dir);
        let filesystem = RecordingFilesystem::default();

        let mut first = ScriptedInteraction::answering(&["new-project", "new", "example.localhost"]);
        initialize_nutshell(&configatron, &mut first, &filesystem, false)
            .await
            .unwrap();
        let manifest_after_first = read(&dir, "package.json");
        let script_after_first = read(&dir, "gulpfile.js");

        let mut second =
            ScriptedInteraction::answering(&["new-project", "new", "example.localhost"]);
        let outcome = initialize_nutshell(&configatron, &mut second, &filesystem, true)
            .await
            .unwrap();

        assert!(matches!(outcome, InitializationOutcome::Customized(_)));
        // "new" normalizes to the current "files/new/", so no second rename happens.
        assert_eq!(second.prompts[1].1, "files/new/");
        assert_eq!(filesystem.renames.borrow().len(), 1);
        assert_eq!(read(&dir, "package.json"), manifest_after_first);
        assert_eq!(read(&dir, "gulpfile.js"), script_after_first);
    }

    #[tokio::test]
    async fn failed_rename_persists_nothing() {
        let dir = mock_distribution_project();
        std::fs::create_dir_all(dir.path().join("files/new")).unwrap();
        let mut interaction =
            ScriptedInteraction::answering(&["new-project", "new", "example.localhost"]);

        let error = initialize_nutshell(
            &mock_configatron(&dir),
            &mut interaction,
            &RecordingFilesystem::default(),
            false,
        )
        .await
        .unwrap_err();

        assert_eq!(error.get_type(), ErrorType::RenameError);
        assert_eq!(read(&dir, "package.json"), MANIFEST);
        assert_eq!(read(&dir, "gulpfile.js"), GULPFILE);
    }

    #[tokio::test]
    async fn missing_manifest_name_aborts_before_prompting() {
        let dir = mock_materialized_project(r#"{"version": "1.0.0"}"#, GULPFILE);
        let mut interaction = ScriptedInteraction::answering(&[]);

        let error = initialize_nutshell(
            &mock_configatron(&dir),
            &mut interaction,
            &RecordingFilesystem::default(),
            true,
        )
        .await
        .unwrap_err();

        assert_eq!(error.get_type(), ErrorType::MissingFieldError);
        assert!(interaction.prompts.is_empty());
    }
}

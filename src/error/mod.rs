use std::{fmt, io};

use tracing::error;

/// Enum representing errors raised by the Nutshell installer. It can be either a `CriticalError` or a
/// `GeneralError`, each wrapping a specific type of error information.
#[derive(Clone, PartialEq, Debug)]
pub enum NutshellError {
    /// A critical error, aborting the current run before anything is persisted.
    CriticalError(NutshellErrorType),
    /// A general error, reported but not stopping the run.
    GeneralError(NutshellErrorType),
}

impl fmt::Display for NutshellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TYPE: {:?}\nKIND: {:?}\nACTION: {:?}\nMESSAGE: {}",
            self.get_type(),
            self.get_kind(),
            self.get_action(),
            self.get_message()
        )
    }
}

impl std::error::Error for NutshellError {}

impl From<NutshellError> for io::Error {
    fn from(err: NutshellError) -> Self {
        io::Error::new(io::ErrorKind::Other, err.to_string())
    }
}

impl NutshellError {
    /// Checks if the error is a critical error.
    pub fn is_critical(&self) -> bool {
        matches!(self, NutshellError::CriticalError(_))
    }

    /// Checks if the error is a general error.
    pub fn is_general(&self) -> bool {
        matches!(self, NutshellError::GeneralError(_))
    }

    /// Returns the action the operator is expected to take.
    pub fn get_action(&self) -> ErrorAction {
        match self {
            NutshellError::CriticalError(err) => err.get_action(),
            NutshellError::GeneralError(err) => err.get_action(),
        }
    }

    /// Retrieves the error message associated with the error.
    pub fn get_message(&self) -> String {
        match self {
            NutshellError::CriticalError(err) => err.get_message(),
            NutshellError::GeneralError(err) => err.get_message(),
        }
    }

    /// Retrieves the fine-grained kind of the error.
    pub fn get_kind(&self) -> ErrorKind {
        match self {
            NutshellError::CriticalError(err) => err.get_kind(),
            NutshellError::GeneralError(err) => err.get_kind(),
        }
    }

    /// Retrieves the category of the error.
    pub fn get_type(&self) -> ErrorType {
        match self {
            NutshellError::CriticalError(err) => err.get_type(),
            NutshellError::GeneralError(err) => err.get_type(),
        }
    }

    /// ==============================================================================================================
    ///
    /// Each `raise_*` function names both the severity and the category of the error it builds, so a call site
    /// such as `Err(NutshellError::raise_critical_rename_error(kind, message, action))` reads on its own.
    /// Every constructor logs the error through `tracing` before returning it.
    ///
    /// ==============================================================================================================

    /// Raises a critical error for a required file that does not exist.
    ///
    /// # Parameters
    /// - `kind`: The specific kind of error.
    /// - `message`: A message describing the error.
    /// - `action`: The action to be taken for this error.
    pub fn raise_critical_missing_file_error(
        kind: ErrorKind,
        message: &str,
        action: ErrorAction,
    ) -> Self {
        error!(
            "Critical Missing File Error raised. Kind: {:?}, Message: '{}', Action: {:?}",
            kind, message, action
        );

        NutshellError::CriticalError(NutshellErrorType::MissingFileError {
            kind,
            message: message.to_string(),
            action,
        })
    }

    /// Raises a critical error for a document or configuration file that cannot be decoded.
    pub fn raise_critical_malformed_config_error(
        kind: ErrorKind,
        message: &str,
        action: ErrorAction,
    ) -> Self {
        error!(
            "Critical Malformed Config Error raised. Kind: {:?}, Message: '{}', Action: {:?}",
            kind, message, action
        );

        NutshellError::CriticalError(NutshellErrorType::MalformedConfigError {
            kind,
            message: message.to_string(),
            action,
        })
    }

    /// Raises a critical error for an expected manifest field that is absent.
    pub fn raise_critical_missing_field_error(
        kind: ErrorKind,
        message: &str,
        action: ErrorAction,
    ) -> Self {
        error!(
            "Critical Missing Field Error raised. Kind: {:?}, Message: '{}', Action: {:?}",
            kind, message, action
        );

        NutshellError::CriticalError(NutshellErrorType::MissingFieldError {
            kind,
            message: message.to_string(),
            action,
        })
    }

    /// Raises a critical error for a directory rename that could not be carried out.
    pub fn raise_critical_rename_error(kind: ErrorKind, message: &str, action: ErrorAction) -> Self {
        error!(
            "Critical Rename Error raised. Kind: {:?}, Message: '{}', Action: {:?}",
            kind, message, action
        );

        NutshellError::CriticalError(NutshellErrorType::RenameError {
            kind,
            message: message.to_string(),
            action,
        })
    }

    /// Raises a critical error for a failed final write.
    pub fn raise_critical_persistence_error(
        kind: ErrorKind,
        message: &str,
        action: ErrorAction,
    ) -> Self {
        error!(
            "Critical Persistence Error raised. Kind: {:?}, Message: '{}', Action: {:?}",
            kind, message, action
        );

        NutshellError::CriticalError(NutshellErrorType::PersistenceError {
            kind,
            message: message.to_string(),
            action,
        })
    }

    /// Raises a critical error for a prompt that could not be written or answered.
    pub fn raise_critical_interaction_error(
        kind: ErrorKind,
        message: &str,
        action: ErrorAction,
    ) -> Self {
        error!(
            "Critical Interaction Error raised. Kind: {:?}, Message: '{}', Action: {:?}",
            kind, message, action
        );

        NutshellError::CriticalError(NutshellErrorType::InteractionError {
            kind,
            message: message.to_string(),
            action,
        })
    }

    pub fn raise_critical_runtime_error(
        kind: ErrorKind,
        message: &str,
        action: ErrorAction,
    ) -> Self {
        error!(
            "Critical Nutshell Runtime Error raised. Kind: {:?}, Message: '{}', Action: {:?}",
            kind, message, action
        );

        NutshellError::CriticalError(NutshellErrorType::RuntimeError {
            kind,
            message: message.to_string(),
            action,
        })
    }

    pub fn raise_general_runtime_error(
        kind: ErrorKind,
        message: &str,
        action: ErrorAction,
    ) -> Self {
        error!(
            "General Nutshell Runtime Error raised. Kind: {:?}, Message: '{}', Action: {:?}",
            kind, message, action
        );

        NutshellError::GeneralError(NutshellErrorType::RuntimeError {
            kind,
            message: message.to_string(),
            action,
        })
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum NutshellErrorType {
    MissingFileError {
        kind: ErrorKind,
        message: String,
        action: ErrorAction,
    },
    MalformedConfigError {
        kind: ErrorKind,
        message: String,
        action: ErrorAction,
    },
    MissingFieldError {
        kind: ErrorKind,
        message: String,
        action: ErrorAction,
    },
    RenameError {
        kind: ErrorKind,
        message: String,
        action: ErrorAction,
    },
    PersistenceError {
        kind: ErrorKind,
        message: String,
        action: ErrorAction,
    },
    InteractionError {
        kind: ErrorKind,
        message: String,
        action: ErrorAction,
    },
    RuntimeError {
        kind: ErrorKind,
        message: String,
        action: ErrorAction,
    },
}

impl NutshellErrorType {
    pub fn get_action(&self) -> ErrorAction {
        match self {
            NutshellErrorType::MissingFileError { action, .. } => action.clone(),
            NutshellErrorType::MalformedConfigError { action, .. } => action.clone(),
            NutshellErrorType::MissingFieldError { action, .. } => action.clone(),
            NutshellErrorType::RenameError { action, .. } => action.clone(),
            NutshellErrorType::PersistenceError { action, .. } => action.clone(),
            NutshellErrorType::InteractionError { action, .. } => action.clone(),
            NutshellErrorType::RuntimeError { action, .. } => action.clone(),
        }
    }

    pub fn get_message(&self) -> String {
        match self {
            NutshellErrorType::MissingFileError { message, .. } => message.clone(),
            NutshellErrorType::MalformedConfigError { message, .. } => message.clone(),
            NutshellErrorType::MissingFieldError { message, .. } => message.clone(),
            NutshellErrorType::RenameError { message, .. } => message.clone(),
            NutshellErrorType::PersistenceError { message, .. } => message.clone(),
            NutshellErrorType::InteractionError { message, .. } => message.clone(),
            NutshellErrorType::RuntimeError { message, .. } => message.clone(),
        }
    }

    pub fn get_kind(&self) -> ErrorKind {
        match self {
            NutshellErrorType::MissingFileError { kind, .. } => kind.clone(),
            NutshellErrorType::MalformedConfigError { kind, .. } => kind.clone(),
            NutshellErrorType::MissingFieldError { kind, .. } => kind.clone(),
            NutshellErrorType::RenameError { kind, .. } => kind.clone(),
            NutshellErrorType::PersistenceError { kind, .. } => kind.clone(),
            NutshellErrorType::InteractionError { kind, .. } => kind.clone(),
            NutshellErrorType::RuntimeError { kind, .. } => kind.clone(),
        }
    }

    pub fn get_type(&self) -> ErrorType {
        match self {
            NutshellErrorType::MissingFileError { .. } => ErrorType::MissingFileError,
            NutshellErrorType::MalformedConfigError { .. } => ErrorType::MalformedConfigError,
            NutshellErrorType::MissingFieldError { .. } => ErrorType::MissingFieldError,
            NutshellErrorType::RenameError { .. } => ErrorType::RenameError,
            NutshellErrorType::PersistenceError { .. } => ErrorType::PersistenceError,
            NutshellErrorType::InteractionError { .. } => ErrorType::InteractionError,
            NutshellErrorType::RuntimeError { .. } => ErrorType::RuntimeError,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum ErrorAction {
    Ignore,
    Notify,
    Exit,
    Fix,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ErrorType {
    MissingFileError,
    MalformedConfigError,
    MissingFieldError,
    RenameError,
    PersistenceError,
    InteractionError,
    RuntimeError,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ErrorKind {
    TracingSubscriberInitializationFailed,
    ConfigFileReadError,
    ConfigFileParsingError,
    DistributionFileMissing,
    DistributionFileCopyFailed,
    ManifestFileMissing,
    ManifestFileReadFailed,
    ManifestDecodeFailed,
    ManifestNotAnObject,
    ManifestFieldMissing,
    ManifestFieldNotAString,
    ManifestEncodeFailed,
    ScriptConfigFileMissing,
    ScriptConfigFileReadFailed,
    RenameSourceMissing,
    RenameTargetOccupied,
    RenameParentCreationFailed,
    DirectoryRenameFailed,
    FileCreationError,
    FileWriteError,
    FileSyncError,
    PromptWriteFailed,
    PromptReadFailed,
}

use thiserror::Error;

/// All errors that can occur while normalizing a record.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to load XML document: {0}")]
    XmlLoad(String),

    #[error("unknown record schema: no {attribute} declaration on the metadata root")]
    NoSchema { attribute: String },

    #[error("wrong schema for {dialect}: {found}")]
    WrongSchema { dialect: String, found: String },

    #[error("no title found")]
    MissingTitle,

    #[error("no contributors found")]
    MissingAuthors,

    #[error("unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Coarse grouping of [`IngestError`] so batch callers can decide between
/// "skip this record and log" and "abort the whole batch".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The fragment could not be turned into a tree.
    Load,
    /// Parsed fine, but not the kind of document the dialect expects.
    Schema,
    /// Parsed and recognized, but a required field is absent.
    RequiredField,
    /// Anything outside the record itself: I/O, config, serialization.
    Environment,
}

impl IngestError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::XmlLoad(_) => ErrorClass::Load,
            Self::NoSchema { .. } | Self::WrongSchema { .. } => ErrorClass::Schema,
            Self::MissingTitle | Self::MissingAuthors => ErrorClass::RequiredField,
            Self::UnknownDialect(_)
            | Self::ConfigError(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::TomlParse(_)
            | Self::TomlSerialize(_) => ErrorClass::Environment,
        }
    }

    /// Record-level failures leave sibling fragments unaffected.
    pub fn is_record_level(&self) -> bool {
        self.class() != ErrorClass::Environment
    }
}

/// Exit codes used by the `ingestscope` binary.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    LoadError = 4,
    SchemaError = 5,
    MissingField = 6,
    PartialFailure = 7,
}

impl From<ErrorClass> for ExitCode {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Load => Self::LoadError,
            ErrorClass::Schema => Self::SchemaError,
            ErrorClass::RequiredField => Self::MissingField,
            ErrorClass::Environment => Self::GeneralError,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

use thiserror::Error;

/// Unified result type for the classifier crate.
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Structural problems found while validating a batch of width definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("`{name}` has to be an object but {found} was provided")]
    NotAnObject { name: String, found: &'static str },
    #[error("`{name}` is missing the required key `{key}`")]
    MissingKey { name: String, key: &'static str },
    #[error("`{key}` for `{name}` has to be {expected} but {found} was provided")]
    FieldType {
        name: String,
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("`min` ({min}) has to be less than or equal to `max` ({max}) for `{name}`")]
    RangeOrder { name: String, min: f64, max: f64 },
    #[error("invalid inclusion `{token}` for `{name}`, expected one of \"[]\", \"()\", \"[)\", \"(]\"")]
    InvalidInclusion { name: String, token: String },
    #[error("`{slot}` for `{name}` has to be a callback")]
    CallbackType { name: String, slot: &'static str },
}

impl DefinitionError {
    /// Breakpoint the violation was found on.
    pub fn breakpoint(&self) -> &str {
        match self {
            Self::NotAnObject { name, .. }
            | Self::MissingKey { name, .. }
            | Self::FieldType { name, .. }
            | Self::RangeOrder { name, .. }
            | Self::InvalidInclusion { name, .. }
            | Self::CallbackType { name, .. } => name,
        }
    }
}

/// Errors surfaced by the classifier and its configuration layer.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("option `{option}` has to be {expected} but {found} was provided")]
    ConfigType {
        option: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid width definitions: {0}")]
    ConfigValidation(#[from] DefinitionError),
    #[error("breakpoint `{name}` not found")]
    NotFound { name: String },
    #[error("invalid phase `{phase}`, expected \"enter\", \"inside\" or \"leave\"")]
    InvalidPhase { phase: String },
    #[error("invalid inclusion `{token}` for `{name}`")]
    InvalidInclusion { name: String, token: String },
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

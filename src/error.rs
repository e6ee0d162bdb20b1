use thiserror::Error;

/// A raw string that could not be converted into a flag's value type.
///
/// Produced by [`FlagValue::parse`](crate::FlagValue::parse) implementations;
/// the loader wraps it with the flag name and the offending text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValueError(String);

impl ValueError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum FlagError {
    #[error("Failed to load flag '{name}': Failed to load value '{value}': {source}")]
    InvalidValue {
        name: String,
        value: String,
        source: ValueError,
    },

    #[error("Failed to load unknown flag '{name}'")]
    UnknownFlag { name: String },

    #[error("Failed to load unknown flag '{name}' via '{via}'")]
    UnknownFlagNegated { name: String, via: String },

    #[error("Failed to load boolean flag '{name}' via '{via}' with value '{value}'")]
    NegatedWithValue {
        name: String,
        via: String,
        value: String,
    },

    #[error("Failed to load non-boolean flag '{name}' via '{via}'")]
    NegatedNonBoolean { name: String, via: String },

    #[error("Failed to load non-boolean flag '{name}': Missing value")]
    MissingValue { name: String },

    #[error("Flag '{name}' is required, but it was not provided")]
    MissingRequired { name: String },

    #[error("Duplicate flag '{name}'")]
    Duplicate { name: String },

    /// A per-flag validator rejected a freshly stored value. Carries the
    /// validator's message verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Flag '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("Invalid flag name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Boolean flag '{name}' has no default; use add_optional for a tri-state boolean")]
    RequiredBoolean { name: String },
}

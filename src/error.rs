use std::fmt;

/// A single violated schema rule, tagged with the document entry and field
/// it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub entry: String,
    pub field: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(
        entry: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            entry: entry.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry '{}': {}: {}", self.entry, self.field, self.message)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Schema validation failed:\n{}", render_violations(.0))]
    SchemaValidation(Vec<SchemaViolation>),

    #[error("Malformed configuration document: {0}")]
    MalformedDocument(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization failed: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

impl AppError {
    /// Shorthand for a validation error carrying a single violation.
    pub fn violation(
        entry: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        AppError::SchemaValidation(vec![SchemaViolation::new(entry, field, message)])
    }
}

fn render_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, AppError>;

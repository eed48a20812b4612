use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimError {
    /// Rejected before any solver runs; names the offending field.
    #[error("Invalid input ({field}): {message}")]
    InvalidInput { field: String, message: String },

    /// The proportional-scaling fallback has no defined scale factor.
    #[error("target calories > 0 but no starting calories to scale from")]
    FallbackUndefined,

    #[error("Ingredient not found in catalog: {0}")]
    IngredientNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl OptimError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        OptimError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimError>;

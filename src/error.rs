//! Crate-wide error type. Converted to `JsValue` at the wasm boundary.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum QuizError {
    /// Input did not start with an integer; the round state is untouched.
    #[error("answer '{0}' is not a number")]
    InvalidAnswer(String),

    #[error("round is over; no further answers accepted")]
    RoundOver,

    #[error("expected {expected} problems, got {actual}")]
    ProblemCountMismatch { expected: usize, actual: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config is not valid JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    #[error("quiz is not mounted")]
    NotMounted,

    #[error("missing element #{0}")]
    MissingElement(String),

    #[error("dom error: {0}")]
    Dom(String),
}

impl From<JsValue> for QuizError {
    fn from(value: JsValue) -> Self {
        QuizError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<QuizError> for JsValue {
    fn from(err: QuizError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T, E = QuizError> = std::result::Result<T, E>;

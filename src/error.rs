//! Error types for the plan engine.

use serde::Serialize;
use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, PlanError>;

/// ---------------------------------------------------------------------------
/// Error Type
/// ---------------------------------------------------------------------------

/// Failures surfaced by the plan engine.
///
/// `MissingApiKey` is a configuration error and is raised before any network
/// call. `Request` is a transport failure the caller may retry. `Api` and
/// `Parse` are generation failures: the transport worked but the content was
/// rejected or unusable. Truncated responses are not errors; they are logged
/// and sent through the repair path.
#[derive(Error, Debug, Serialize)]
pub enum PlanError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),

  #[error("Invalid plan state: {0}")]
  InvalidState(String),

  #[error("Store error: {0}")]
  Store(String),
}

impl PlanError {
  /// True for failures the caller can retry without reconfiguring anything.
  pub fn is_recoverable(&self) -> bool {
    matches!(self, PlanError::Request(_) | PlanError::Api(_) | PlanError::Parse(_))
  }
}

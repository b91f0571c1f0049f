//! plan-coach: adaptive endurance training plans, one week at a time.
//!
//! The engine compresses training history into a bounded context block,
//! asks Claude for the next training week, repairs and parses the response
//! into a typed plan, and sequences week generation, completion, and
//! history accumulation across the life of a training block.

pub mod engine;
pub mod error;
pub mod fallback;
pub mod history;
pub mod llm;
pub mod logging;
pub mod models;
pub mod parser;
pub mod phase;
pub mod prompt;
pub mod repair;
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use engine::{PlanStatus, TrainingEngine, WeekOutcome};
pub use error::{PlanError, Result};
pub use llm::ClaudeClient;
pub use models::onboarding::OnboardingData;
pub use models::plan::{TrainingPlan, WeekPlan, Workout};
pub use store::{PlanStore, SqliteStore};

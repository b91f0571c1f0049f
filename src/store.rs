//! Persisted state, abstracted as a key-value store of text blobs.
//!
//! The engine owns no ambient storage: callers inject a `PlanStore` and
//! the engine reads/writes exactly two records through it - the training
//! plan aggregate and the onboarding snapshot. Dates inside the blobs are
//! RFC3339 strings; serde rehydrates them into real date values on load.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{PlanError, Result};

/// Store key for the serialized `TrainingPlan` aggregate
pub const PLAN_KEY: &str = "training_plan";
/// Store key for the serialized `OnboardingData` snapshot
pub const ONBOARDING_KEY: &str = "onboarding_data";

/// ---------------------------------------------------------------------------
/// Store Interface
/// ---------------------------------------------------------------------------

/// Injected persistence seam: a flat map of text blobs.
///
/// Implementations must treat a missing key as `Ok(None)`, never an error.
#[async_trait]
pub trait PlanStore: Send + Sync {
  async fn load(&self, key: &str) -> Result<Option<String>>;
  async fn save(&self, key: &str, value: &str) -> Result<()>;
  async fn clear(&self, key: &str) -> Result<()>;
}

/// ---------------------------------------------------------------------------
/// SQLite Store
/// ---------------------------------------------------------------------------

/// Key-value store backed by a single SQLite table
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Open (or create) the store at the given file path and run migrations
  pub async fn open(db_path: &Path) -> Result<Self> {
    if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
      fs::create_dir_all(dir).map_err(|e| PlanError::Store(e.to_string()))?;
    }
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    info!("Opening plan store at {}", db_path.display());

    let pool = SqlitePoolOptions::new()
      .max_connections(5)
      .connect(&db_url)
      .await
      .map_err(|e| PlanError::Store(e.to_string()))?;

    Self::from_pool(pool).await
  }

  /// Build a store from an existing pool (in-memory database in tests)
  pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .map_err(|e| PlanError::Store(e.to_string()))?;

    Ok(Self { pool })
  }
}

#[async_trait]
impl PlanStore for SqliteStore {
  async fn load(&self, key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> =
      sqlx::query_as("SELECT value FROM app_store WHERE key = ?1")
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PlanError::Store(e.to_string()))?;

    Ok(row.map(|(value,)| value))
  }

  async fn save(&self, key: &str, value: &str) -> Result<()> {
    sqlx::query(
      r#"
      INSERT INTO app_store (key, value, updated_at)
      VALUES (?1, ?2, CURRENT_TIMESTAMP)
      ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
      "#,
    )
    .bind(key)
    .bind(value)
    .execute(&self.pool)
    .await
    .map_err(|e| PlanError::Store(e.to_string()))?;

    Ok(())
  }

  async fn clear(&self, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM app_store WHERE key = ?1")
      .bind(key)
      .execute(&self.pool)
      .await
      .map_err(|e| PlanError::Store(e.to_string()))?;

    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

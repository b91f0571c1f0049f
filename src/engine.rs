//! Plan lifecycle state machine.
//!
//! Owns the training plan aggregate and sequences it through its life:
//! initialize (week 1), advance (archive the finished week, generate the
//! next one), record workout status changes, and answer read queries for
//! the UI layer.
//!
//! Single-plan, single-writer: one mutex guards the aggregate and is held
//! across each mutating operation, including the in-flight generation
//! call. Concurrent advances queue rather than interleave, and a status
//! update cannot race a week that is about to be archived.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{PlanError, Result};
use crate::fallback;
use crate::llm::ClaudeClient;
use crate::models::onboarding::OnboardingData;
use crate::models::plan::{
  ActualData, CompletedWeek, TrainingPlan, WeekFeedback, WeekPlan, WeekSummary, Workout,
  WorkoutStatus, WorkoutType,
};
use crate::parser;
use crate::phase;
use crate::prompt;
use crate::store::{PlanStore, ONBOARDING_KEY, PLAN_KEY};

/// Output token limit for one week-generation request
const GENERATION_MAX_TOKENS: u32 = 8000;

/// ---------------------------------------------------------------------------
/// Outcome Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
  /// A current week exists (or is awaiting a retried generation)
  Active,
  /// Every week of the block has been archived
  Completed,
}

/// Result of a generation operation.
///
/// `fallback_error` carries the underlying failure when the installed week
/// came from the local fallback generator, so the UI can disclose that the
/// content is not personalized.
#[derive(Debug)]
pub struct WeekOutcome {
  pub status: PlanStatus,
  pub week: Option<WeekPlan>,
  pub fallback_error: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Engine State
/// ---------------------------------------------------------------------------

#[derive(Default)]
struct EngineState {
  plan: Option<TrainingPlan>,
  onboarding: Option<OnboardingData>,
}

pub struct TrainingEngine {
  client: ClaudeClient,
  store: Arc<dyn PlanStore>,
  /// Substitute a deterministic placeholder week when generation fails,
  /// instead of surfacing a bare error
  use_fallback: bool,
  state: Mutex<EngineState>,
}

impl TrainingEngine {
  /// Engine with empty in-memory state
  pub fn new(client: ClaudeClient, store: Arc<dyn PlanStore>) -> Self {
    Self {
      client,
      store,
      use_fallback: true,
      state: Mutex::new(EngineState::default()),
    }
  }

  /// Disable or re-enable fallback-week substitution
  pub fn with_fallback(mut self, use_fallback: bool) -> Self {
    self.use_fallback = use_fallback;
    self
  }

  /// Engine hydrated from the store.
  ///
  /// A blob that fails to deserialize is logged and treated as absent:
  /// corruption means "no plan exists", never a crash.
  pub async fn load(client: ClaudeClient, store: Arc<dyn PlanStore>) -> Result<Self> {
    let plan = Self::load_blob::<TrainingPlan>(&*store, PLAN_KEY).await?;
    let onboarding = Self::load_blob::<OnboardingData>(&*store, ONBOARDING_KEY).await?;

    if let Some(plan) = &plan {
      info!(
        plan_id = %plan.id,
        current_week = plan.current_week_number,
        "restored training plan from store"
      );
    }

    Ok(Self {
      client,
      store,
      use_fallback: true,
      state: Mutex::new(EngineState { plan, onboarding }),
    })
  }

  async fn load_blob<T: serde::de::DeserializeOwned>(
    store: &dyn PlanStore,
    key: &str,
  ) -> Result<Option<T>> {
    match store.load(key).await? {
      Some(blob) => match serde_json::from_str(&blob) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
          warn!("stored {} is corrupt, treating as absent: {}", key, e);
          Ok(None)
        }
      },
      None => Ok(None),
    }
  }

  /// -------------------------------------------------------------------------
  /// Mutating Operations
  /// -------------------------------------------------------------------------

  /// Create a new training plan and generate week 1.
  ///
  /// On generation failure with fallback disabled, no plan is created and
  /// nothing is persisted.
  pub async fn initialize_plan(&self, data: OnboardingData) -> Result<WeekOutcome> {
    let mut state = self.state.lock().await;

    if state.plan.is_some() {
      warn!("initializing a new plan over an existing one");
    }

    let now = Utc::now();
    let total_weeks = phase::total_weeks_until(data.goal.race_date, now);
    info!(
      race = %data.goal.race_name,
      total_weeks,
      "initializing training plan"
    );

    let (week, fallback_error) = match self.request_week(&data, 1, total_weeks, &[], None).await
    {
      Ok(week) => (week, None),
      Err(e) if self.use_fallback => {
        warn!("week 1 generation failed, substituting fallback week: {}", e);
        let week = fallback::generate_fallback_week(&data, 1, total_weeks, phase::monday_of(now));
        (week, Some(e.to_string()))
      }
      Err(e) => return Err(e),
    };

    let plan = TrainingPlan {
      id: format!("plan-{}", now.timestamp_millis()),
      created_at: now,
      race_name: data.goal.race_name.clone(),
      race_date: data.goal.race_date,
      race_type: data.goal.race_type,
      total_weeks,
      current_week_number: 1,
      current_week: Some(week.clone()),
      completed_weeks: Vec::new(),
    };

    self.save_onboarding(&data).await?;
    self.save_plan(&plan).await?;
    state.onboarding = Some(data);
    state.plan = Some(plan);

    Ok(WeekOutcome {
      status: PlanStatus::Active,
      week: Some(week),
      fallback_error,
    })
  }

  /// Archive the current week and generate the next one.
  ///
  /// The archive step persists before the generation request, so a failed
  /// request never rolls it back; calling again retries only the
  /// generation step without duplicating the archive.
  pub async fn generate_next_week(
    &self,
    feedback: WeekFeedback,
    constraints: Option<String>,
  ) -> Result<WeekOutcome> {
    let mut state = self.state.lock().await;

    let Some(plan) = state.plan.as_mut() else {
      return Err(PlanError::InvalidState("no active training plan".to_string()));
    };
    if plan.is_complete() {
      return Err(PlanError::InvalidState(
        "training plan is already complete".to_string(),
      ));
    }

    let constraints = constraints.or_else(|| feedback.next_week_constraints.clone());

    if let Some(current) = plan.current_week.take() {
      info!(week = current.week_number, "archiving completed week");
      let summary = WeekSummary::from_week(&current, feedback);
      plan.completed_weeks.push(CompletedWeek::from_week(current, summary));
      plan.current_week_number += 1;
      let snapshot = plan.clone();
      self.save_plan(&snapshot).await?;
    } else {
      // A previous advance archived the week and then failed to generate;
      // this call is a retry of the generation step only.
      debug!(
        week = plan.current_week_number,
        "current week already archived, retrying generation"
      );
    }

    let plan = state.plan.as_ref().expect("plan checked above");
    if plan.is_complete() {
      info!(total_weeks = plan.total_weeks, "training block complete");
      return Ok(WeekOutcome {
        status: PlanStatus::Completed,
        week: None,
        fallback_error: None,
      });
    }

    let week_number = plan.current_week_number;
    let total_weeks = plan.total_weeks;
    let data = state
      .onboarding
      .clone()
      .ok_or_else(|| PlanError::InvalidState("no onboarding data".to_string()))?;

    let history = &state.plan.as_ref().expect("plan checked above").completed_weeks;
    let result = self
      .request_week(&data, week_number, total_weeks, history, constraints.as_deref())
      .await;

    let (week, fallback_error) = match result {
      Ok(week) => (week, None),
      Err(e) if self.use_fallback => {
        warn!(
          week = week_number,
          "generation failed, substituting fallback week: {}", e
        );
        let week = fallback::generate_fallback_week(
          &data,
          week_number,
          total_weeks,
          phase::monday_of(Utc::now()),
        );
        (week, Some(e.to_string()))
      }
      // The archive above stays in place; the caller may call again to
      // retry the generation step.
      Err(e) => return Err(e),
    };

    let plan = state.plan.as_mut().expect("plan checked above");
    plan.current_week = Some(week.clone());
    let snapshot = plan.clone();
    self.save_plan(&snapshot).await?;

    Ok(WeekOutcome {
      status: PlanStatus::Active,
      week: Some(week),
      fallback_error,
    })
  }

  /// Record a status change for a workout in the current week.
  ///
  /// Archived weeks are immutable; an id that only exists in history is
  /// reported as not found.
  pub async fn update_workout_status(
    &self,
    workout_id: &str,
    status: WorkoutStatus,
    actual_data: Option<ActualData>,
  ) -> Result<()> {
    let mut state = self.state.lock().await;

    let Some(plan) = state.plan.as_mut() else {
      return Err(PlanError::InvalidState("no active training plan".to_string()));
    };
    let Some(week) = plan.current_week.as_mut() else {
      return Err(PlanError::InvalidState("no current week".to_string()));
    };

    let Some(workout) = week.workouts.iter_mut().find(|w| w.id == workout_id) else {
      return Err(PlanError::InvalidState(format!(
        "workout {} not found in current week",
        workout_id
      )));
    };

    debug!(workout_id, ?status, "updating workout status");
    workout.status = status;
    workout.actual_data = actual_data;

    let snapshot = plan.clone();
    self.save_plan(&snapshot).await
  }

  /// -------------------------------------------------------------------------
  /// Read Accessors
  /// -------------------------------------------------------------------------

  /// Snapshot of the current plan, if any
  pub async fn plan(&self) -> Option<TrainingPlan> {
    self.state.lock().await.plan.clone()
  }

  /// Find a workout by id in the current week, then in history
  pub async fn workout_by_id(&self, workout_id: &str) -> Option<Workout> {
    let state = self.state.lock().await;
    let plan = state.plan.as_ref()?;

    if let Some(week) = &plan.current_week {
      if let Some(w) = week.workouts.iter().find(|w| w.id == workout_id) {
        return Some(w.clone());
      }
    }
    plan
      .completed_weeks
      .iter()
      .flat_map(|cw| cw.workouts.iter())
      .find(|w| w.id == workout_id)
      .cloned()
  }

  /// All workouts scheduled for the given calendar day
  pub async fn workouts_for_date(&self, date: DateTime<Utc>) -> Vec<Workout> {
    let state = self.state.lock().await;
    let Some(plan) = state.plan.as_ref() else {
      return Vec::new();
    };

    let day = date.date_naive();
    plan
      .current_week
      .iter()
      .flat_map(|week| week.workouts.iter())
      .chain(plan.completed_weeks.iter().flat_map(|cw| cw.workouts.iter()))
      .filter(|w| w.date.date_naive() == day)
      .cloned()
      .collect()
  }

  /// Today's first non-rest workout, if any
  pub async fn todays_workout(&self) -> Option<Workout> {
    self
      .workouts_for_date(Utc::now())
      .await
      .into_iter()
      .find(|w| w.workout_type != WorkoutType::Rest)
  }

  /// The next `count` future-dated, non-rest workouts, date-sorted
  pub async fn upcoming_workouts(&self, count: usize) -> Vec<Workout> {
    let state = self.state.lock().await;
    let Some(week) = state.plan.as_ref().and_then(|p| p.current_week.as_ref()) else {
      return Vec::new();
    };

    let today = Utc::now().date_naive();
    let mut upcoming: Vec<Workout> = week
      .workouts
      .iter()
      .filter(|w| w.workout_type != WorkoutType::Rest && w.date.date_naive() > today)
      .cloned()
      .collect();
    upcoming.sort_by_key(|w| w.date);
    upcoming.truncate(count);
    upcoming
  }

  /// -------------------------------------------------------------------------
  /// Generation Pipeline
  /// -------------------------------------------------------------------------

  /// One generation attempt: prompt, transport, repair, strict parse
  async fn request_week(
    &self,
    data: &OnboardingData,
    week_number: u32,
    total_weeks: u32,
    history: &[CompletedWeek],
    constraints: Option<&str>,
  ) -> Result<WeekPlan> {
    let user_prompt =
      prompt::build_week_prompt(data, week_number, total_weeks, history, constraints);

    info!(week_number, total_weeks, "requesting week generation");
    let completion = self
      .client
      .complete(prompt::COACH_SYSTEM_PROMPT, &user_prompt, GENERATION_MAX_TOKENS)
      .await?;

    if completion.truncated {
      // Not fatal: the repair pass exists for exactly this case
      warn!(
        week_number,
        output_tokens = completion.usage.output_tokens,
        "generation stopped at the output limit, repairing"
      );
    }
    debug!(
      input_tokens = completion.usage.input_tokens,
      output_tokens = completion.usage.output_tokens,
      "generation finished"
    );

    let expected_phase = phase::phase_for(week_number, total_weeks).to_string();
    parser::parse_week_response(
      &completion.text,
      week_number,
      &expected_phase,
      phase::is_recovery_week(week_number),
      phase::monday_of(Utc::now()),
    )
  }

  /// -------------------------------------------------------------------------
  /// Persistence
  /// -------------------------------------------------------------------------

  async fn save_plan(&self, plan: &TrainingPlan) -> Result<()> {
    let blob =
      serde_json::to_string(plan).map_err(|e| PlanError::Store(e.to_string()))?;
    self.store.save(PLAN_KEY, &blob).await
  }

  async fn save_onboarding(&self, data: &OnboardingData) -> Result<()> {
    let blob =
      serde_json::to_string(data).map_err(|e| PlanError::Store(e.to_string()))?;
    self.store.save(ONBOARDING_KEY, &blob).await
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

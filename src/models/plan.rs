//! Plan entities: workouts, weeks, feedback, summaries, and the
//! training plan aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::onboarding::RaceType;

/// Round hours to one decimal place for display and summaries
pub fn round_hours(hours: f64) -> f64 {
  (hours * 10.0).round() / 10.0
}

/// ---------------------------------------------------------------------------
/// Workout Enums
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
  Run,
  Bike,
  Swim,
  Strength,
  Rest,
}

impl WorkoutType {
  /// Parse a discipline token from generated content, defaulting to Run
  /// for anything unrecognized.
  pub fn from_token(token: &str) -> Self {
    match token.trim().to_lowercase().as_str() {
      "run" => Self::Run,
      "bike" => Self::Bike,
      "swim" => Self::Swim,
      "strength" => Self::Strength,
      "rest" => Self::Rest,
      _ => Self::Run,
    }
  }
}

impl std::fmt::Display for WorkoutType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Run => write!(f, "run"),
      Self::Bike => write!(f, "bike"),
      Self::Swim => write!(f, "swim"),
      Self::Strength => write!(f, "strength"),
      Self::Rest => write!(f, "rest"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutStatus {
  Planned,
  Completed,
  Skipped,
  Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekFeeling {
  Struggling,
  Tired,
  Okay,
  Good,
  Great,
}

impl std::fmt::Display for WeekFeeling {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Struggling => write!(f, "struggling"),
      Self::Tired => write!(f, "tired"),
      Self::Okay => write!(f, "okay"),
      Self::Good => write!(f, "good"),
      Self::Great => write!(f, "great"),
    }
  }
}

impl WeekFeeling {
  /// True when the athlete reported meaningful fatigue
  pub fn is_fatigued(&self) -> bool {
    matches!(self, Self::Struggling | Self::Tired)
  }
}

/// ---------------------------------------------------------------------------
/// Workout
/// ---------------------------------------------------------------------------

/// Target heart-rate or power band inside a segment
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetRange {
  pub min: i64,
  pub max: i64,
}

/// One block of a structured workout (warm-up, main set, cool-down, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSegment {
  pub name: String,
  /// Duration label as prescribed, e.g. "15 min" or "3 x 10min"
  pub duration: String,
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_hr: Option<TargetRange>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_pace: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_power: Option<TargetRange>,
}

/// What actually happened, recorded when the athlete marks a workout done
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualData {
  /// Minutes
  pub duration: i64,
  /// Km
  pub distance: Option<f64>,
  pub avg_hr: Option<i64>,
  /// Subjective feeling, 1 (awful) to 5 (great)
  pub feeling: u8,
  pub notes: Option<String>,
}

/// One training session.
///
/// After creation only `status` and `actual_data` ever change, and only
/// through the engine's workout-status operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
  pub id: String,
  pub date: DateTime<Utc>,
  pub workout_type: WorkoutType,
  pub name: String,
  /// Minutes
  pub duration: i64,
  /// Km
  pub distance: Option<f64>,
  pub description: String,
  pub purpose: String,
  pub structure: Vec<WorkoutSegment>,
  pub heart_rate_guidance: String,
  pub pace_guidance: String,
  pub coaching_tips: Vec<String>,
  pub adaptation_notes: String,
  pub status: WorkoutStatus,
  pub actual_data: Option<ActualData>,
}

/// ---------------------------------------------------------------------------
/// Week Plan
/// ---------------------------------------------------------------------------

/// One training week. Exactly one WeekPlan is current at a time; it is
/// replaced wholesale when the plan advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekPlan {
  /// 1-based, monotonically increasing within a plan
  pub week_number: u32,
  /// Monday-aligned
  pub start_date: DateTime<Utc>,
  pub end_date: DateTime<Utc>,
  pub theme: String,
  pub focus: String,
  pub phase: String,
  /// Sum of workout durations / 60, one decimal
  pub total_planned_hours: f64,
  pub is_recovery_week: bool,
  /// Set when this week came from the local fallback generator rather
  /// than a personalized generation
  #[serde(default)]
  pub is_fallback: bool,
  /// Insertion order = generation order, not necessarily date-sorted
  pub workouts: Vec<Workout>,
}

/// ---------------------------------------------------------------------------
/// Feedback & Summaries
/// ---------------------------------------------------------------------------

/// End-of-week athlete input, supplied by the review form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekFeedback {
  pub overall_feeling: WeekFeeling,
  pub physical_issues: Vec<String>,
  pub notes: String,
  /// Free text such as "traveling Wed-Fri", carried into the next prompt
  pub next_week_constraints: Option<String>,
}

/// Summary of a key workout, for history context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyWorkoutSummary {
  pub name: String,
  pub workout_type: WorkoutType,
  pub completed: bool,
  pub notes: Option<String>,
}

/// Compact statistics for a finished week, computed once at archive time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
  pub week_number: u32,
  pub phase: String,
  pub theme: String,
  pub planned_hours: f64,
  pub completed_hours: f64,
  /// Percent of non-rest workouts completed
  pub completion_rate: i64,
  /// Up to 3 longest non-rest, non-strength sessions
  pub key_workouts: Vec<KeyWorkoutSummary>,
  pub feedback: WeekFeedback,
}

impl WeekSummary {
  /// Build the archival summary from a finished week and its feedback
  pub fn from_week(week: &WeekPlan, feedback: WeekFeedback) -> Self {
    let completed: Vec<&Workout> = week
      .workouts
      .iter()
      .filter(|w| w.status == WorkoutStatus::Completed)
      .collect();

    let completed_hours = round_hours(
      completed
        .iter()
        .map(|w| w.actual_data.as_ref().map_or(w.duration, |a| a.duration) as f64)
        .sum::<f64>()
        / 60.0,
    );

    let non_rest = week
      .workouts
      .iter()
      .filter(|w| w.workout_type != WorkoutType::Rest)
      .count();
    let completion_rate = if non_rest > 0 {
      ((completed.len() as f64 / non_rest as f64) * 100.0).round() as i64
    } else {
      100
    };

    // Key workouts: the longest quality sessions of the week
    let mut key_candidates: Vec<&Workout> = week
      .workouts
      .iter()
      .filter(|w| {
        w.workout_type != WorkoutType::Rest && w.workout_type != WorkoutType::Strength
      })
      .collect();
    key_candidates.sort_by(|a, b| b.duration.cmp(&a.duration));

    let key_workouts = key_candidates
      .iter()
      .take(3)
      .map(|w| KeyWorkoutSummary {
        name: w.name.clone(),
        workout_type: w.workout_type,
        completed: w.status == WorkoutStatus::Completed,
        notes: w.actual_data.as_ref().and_then(|a| a.notes.clone()),
      })
      .collect();

    Self {
      week_number: week.week_number,
      phase: week.phase.clone(),
      theme: week.theme.clone(),
      planned_hours: week.total_planned_hours,
      completed_hours,
      completion_rate,
      key_workouts,
      feedback,
    }
  }
}

/// Archival record for one finished week. Appended to the plan history,
/// never mutated or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedWeek {
  pub week_number: u32,
  pub start_date: DateTime<Utc>,
  pub end_date: DateTime<Utc>,
  pub phase: String,
  pub theme: String,
  pub focus: String,
  pub workouts: Vec<Workout>,
  pub summary: WeekSummary,
}

impl CompletedWeek {
  pub fn from_week(week: WeekPlan, summary: WeekSummary) -> Self {
    Self {
      week_number: week.week_number,
      start_date: week.start_date,
      end_date: week.end_date,
      phase: week.phase,
      theme: week.theme,
      focus: week.focus,
      workouts: week.workouts,
      summary,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Training Plan Aggregate
/// ---------------------------------------------------------------------------

/// The aggregate root.
///
/// Invariants: while a current week exists its number equals
/// `current_week_number` and `current_week_number - 1 ==
/// completed_weeks.len()`; `current_week` is None once
/// `current_week_number > total_weeks` (plan complete) or transiently
/// after a failed advance, awaiting a retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPlan {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub race_name: String,
  pub race_date: DateTime<Utc>,
  pub race_type: RaceType,
  /// Clamped to [1, 52] at initialization
  pub total_weeks: u32,
  pub current_week_number: u32,
  pub current_week: Option<WeekPlan>,
  pub completed_weeks: Vec<CompletedWeek>,
}

impl TrainingPlan {
  /// True once every week of the block has been archived
  pub fn is_complete(&self) -> bool {
    self.current_week_number > self.total_weeks
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{mock_feedback, mock_week_plan};

  #[test]
  fn test_workout_type_token_parsing() {
    assert_eq!(WorkoutType::from_token("Swim"), WorkoutType::Swim);
    assert_eq!(WorkoutType::from_token("REST"), WorkoutType::Rest);
    // Unrecognized disciplines default to run
    assert_eq!(WorkoutType::from_token("yoga"), WorkoutType::Run);
    assert_eq!(WorkoutType::from_token(""), WorkoutType::Run);
  }

  #[test]
  fn test_week_summary_math() {
    // Arrange: week with 4 non-rest workouts, 2 completed
    let mut week = mock_week_plan(3, 5);
    week.workouts[0].status = WorkoutStatus::Completed;
    week.workouts[1].status = WorkoutStatus::Completed;
    week.workouts[1].actual_data = Some(ActualData {
      duration: 90,
      distance: Some(15.0),
      avg_hr: Some(148),
      feeling: 4,
      notes: Some("felt strong".to_string()),
    });

    // Act
    let summary = WeekSummary::from_week(&week, mock_feedback(WeekFeeling::Good));

    // Assert: actual duration overrides planned for completed hours
    // workouts[0] planned 60min + workouts[1] actual 90min = 2.5h
    assert_eq!(summary.completed_hours, 2.5);
    // 2 of 4 non-rest workouts = 50%
    assert_eq!(summary.completion_rate, 50);
    assert_eq!(summary.week_number, 3);
  }

  #[test]
  fn test_week_summary_key_workouts_longest_first() {
    let week = mock_week_plan(1, 5);
    let summary = WeekSummary::from_week(&week, mock_feedback(WeekFeeling::Okay));

    // Strength and rest never appear as key workouts
    assert!(summary.key_workouts.len() <= 3);
    assert!(summary
      .key_workouts
      .iter()
      .all(|k| k.workout_type != WorkoutType::Rest && k.workout_type != WorkoutType::Strength));

    // Sorted by descending duration
    let durations: Vec<i64> = week
      .workouts
      .iter()
      .filter(|w| {
        w.workout_type != WorkoutType::Rest && w.workout_type != WorkoutType::Strength
      })
      .map(|w| w.duration)
      .collect();
    let max = durations.iter().max().copied().unwrap();
    let first = week
      .workouts
      .iter()
      .find(|w| w.name == summary.key_workouts[0].name)
      .unwrap();
    assert_eq!(first.duration, max);
  }

  #[test]
  fn test_week_summary_all_rest_week() {
    let mut week = mock_week_plan(2, 5);
    for w in &mut week.workouts {
      w.workout_type = WorkoutType::Rest;
    }

    let summary = WeekSummary::from_week(&week, mock_feedback(WeekFeeling::Okay));

    // No division by zero; nothing to complete means fully on plan
    assert_eq!(summary.completion_rate, 100);
    assert!(summary.key_workouts.is_empty());
  }

  #[test]
  fn test_round_hours() {
    assert_eq!(round_hours(5.25), 5.3);
    assert_eq!(round_hours(5.24), 5.2);
    assert_eq!(round_hours(0.0), 0.0);
  }
}

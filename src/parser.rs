//! Strict parsing of repaired generation output into a typed week plan.
//!
//! The raw response shape is its own serde schema; a pure mapping function
//! turns it into the canonical `WeekPlan`, and that mapping is the single
//! source of truth for what a missing field becomes.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::models::plan::{round_hours, WeekPlan, Workout, WorkoutSegment, WorkoutStatus, WorkoutType};
use crate::repair;

/// ---------------------------------------------------------------------------
/// Raw Response Schema
/// ---------------------------------------------------------------------------

/// Top-level shape of a generation response.
///
/// Week-level generations carry a `workouts` list; the legacy
/// plan-initialization shape nests full weeks under `weeks`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawWeekResponse {
  pub week_number: Option<f64>,
  pub theme: Option<String>,
  pub focus: Option<String>,
  pub phase: Option<String>,
  pub workouts: Option<Vec<RawWorkout>>,
  pub weeks: Option<Vec<RawWeekResponse>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawWorkout {
  pub day_of_week: Option<String>,
  #[serde(rename = "type")]
  pub workout_type: Option<String>,
  pub name: Option<String>,
  pub duration: Option<f64>,
  pub distance: Option<f64>,
  pub purpose: Option<String>,
  pub description: Option<String>,
  pub structure: Option<Vec<RawSegment>>,
  pub heart_rate_guidance: Option<String>,
  pub pace_guidance: Option<String>,
  pub coaching_tips: Option<Vec<String>>,
  pub adaptation_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSegment {
  pub name: Option<String>,
  pub duration: Option<String>,
  pub description: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Parsing
/// ---------------------------------------------------------------------------

/// Parse a raw generation response into a week plan.
///
/// `expected_phase` is the phase the calculator derived for this week; the
/// generator's value wins only when it actually supplied one.
pub fn parse_week_response(
  response_text: &str,
  week_number: u32,
  expected_phase: &str,
  is_recovery_week: bool,
  week_start: DateTime<Utc>,
) -> Result<WeekPlan> {
  debug!(
    response_len = response_text.len(),
    week_number, "parsing generation response"
  );

  let repaired = repair::repair(response_text);

  let parsed: RawWeekResponse = serde_json::from_str(&repaired)
    .map_err(|e| PlanError::Parse(format!("response is not valid JSON: {}", e)))?;

  let (raw_workouts, theme, focus, phase) = select_week(parsed, week_number)?;

  let workouts: Vec<Workout> = raw_workouts
    .into_iter()
    .map(|raw| map_workout(raw, week_number, week_start))
    .collect();

  let total_minutes: i64 = workouts.iter().map(|w| w.duration).sum();

  Ok(WeekPlan {
    week_number,
    start_date: week_start,
    end_date: week_start + Duration::days(6),
    theme: theme
      .filter(|t| !t.trim().is_empty())
      .unwrap_or_else(|| format!("Week {}", week_number)),
    focus: focus.unwrap_or_default(),
    phase: phase
      .filter(|p| !p.trim().is_empty())
      .unwrap_or_else(|| expected_phase.to_string()),
    total_planned_hours: round_hours(total_minutes as f64 / 60.0),
    is_recovery_week,
    is_fallback: false,
    workouts,
  })
}

/// Pick the workout list out of either response shape
fn select_week(
  parsed: RawWeekResponse,
  week_number: u32,
) -> Result<(Vec<RawWorkout>, Option<String>, Option<String>, Option<String>)> {
  if let Some(workouts) = parsed.workouts {
    return Ok((workouts, parsed.theme, parsed.focus, parsed.phase));
  }

  // Legacy plan-shaped response: take the requested week, else the first
  if let Some(weeks) = parsed.weeks {
    let mut weeks = weeks;
    let idx = weeks
      .iter()
      .position(|w| w.week_number.map(|n| n as u32) == Some(week_number))
      .unwrap_or(0);
    if idx < weeks.len() {
      let week = weeks.swap_remove(idx);
      if let Some(workouts) = week.workouts {
        return Ok((workouts, week.theme, week.focus, week.phase));
      }
    }
  }

  Err(PlanError::Parse(
    "response contains no workouts list".to_string(),
  ))
}

/// Map one raw workout into the canonical type, filling defaults.
///
/// Generated content never dictates completion state: status is always
/// planned, whatever the response claimed.
fn map_workout(raw: RawWorkout, week_number: u32, week_start: DateTime<Utc>) -> Workout {
  let day_token = raw
    .day_of_week
    .as_deref()
    .unwrap_or("monday")
    .trim()
    .to_lowercase();
  let date = week_start + Duration::days(day_offset(&day_token));

  Workout {
    id: synthesize_id(week_number, &day_token),
    date,
    workout_type: WorkoutType::from_token(raw.workout_type.as_deref().unwrap_or("run")),
    name: raw.name.unwrap_or_else(|| "Workout".to_string()),
    duration: raw.duration.map_or(45, |d| d.round() as i64),
    distance: raw.distance,
    description: raw
      .description
      .unwrap_or_default()
      .replace("\\n", "\n"),
    purpose: raw.purpose.unwrap_or_default(),
    structure: raw
      .structure
      .unwrap_or_default()
      .into_iter()
      .map(|s| WorkoutSegment {
        name: s.name.unwrap_or_default(),
        duration: s.duration.unwrap_or_default(),
        description: s.description.unwrap_or_default(),
        target_hr: None,
        target_pace: None,
        target_power: None,
      })
      .collect(),
    heart_rate_guidance: raw.heart_rate_guidance.unwrap_or_default(),
    pace_guidance: raw.pace_guidance.unwrap_or_default(),
    coaching_tips: raw.coaching_tips.unwrap_or_default(),
    adaptation_notes: raw.adaptation_notes.unwrap_or_default(),
    status: WorkoutStatus::Planned,
    actual_data: None,
  }
}

/// Zero-based day offset from Monday; unrecognized tokens land on Monday
fn day_offset(day_token: &str) -> i64 {
  match day_token {
    "monday" => 0,
    "tuesday" => 1,
    "wednesday" => 2,
    "thursday" => 3,
    "friday" => 4,
    "saturday" => 5,
    "sunday" => 6,
    _ => 0,
  }
}

/// Unique id even across repeated generation attempts for the same day
pub(crate) fn synthesize_id(week_number: u32, day_token: &str) -> String {
  let suffix = uuid::Uuid::new_v4().simple().to_string();
  format!(
    "w{}-{}-{}-{}",
    week_number,
    day_token,
    Utc::now().timestamp_millis(),
    &suffix[..6]
  )
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

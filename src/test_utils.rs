//! Test utilities and helpers for unit and integration testing
//!
//! Mock data factories, an in-memory store, and canned generation
//! responses shared by the module test suites.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use crate::models::onboarding::{
  DayAvailability, FitnessAssessment, FitnessLevel, Gender, GoalPriority, Integrations,
  OnboardingData, RaceGoal, RaceType, SwimLevel, TimeSlot, UserProfile, WeeklyAvailability,
};
use crate::models::plan::{
  CompletedWeek, WeekFeedback, WeekFeeling, WeekPlan, WeekSummary, Workout, WorkoutStatus,
  WorkoutType,
};
use crate::store::SqliteStore;

/// ---------------------------------------------------------------------------
/// Store Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite store for testing
///
/// Uses max_connections(1) so the single in-memory database is shared by
/// every connection the pool hands out
pub async fn setup_test_store() -> SqliteStore {
  let pool = SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  SqliteStore::from_pool(pool)
    .await
    .expect("Failed to run migrations")
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// A fixed Monday for date-sensitive assertions
pub fn monday() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap()
}

fn available_day(max_duration: &str, long_session: bool) -> DayAvailability {
  DayAvailability {
    available: true,
    time_slots: vec![TimeSlot::Morning, TimeSlot::Evening],
    max_duration: max_duration.to_string(),
    long_session,
  }
}

/// Onboarding data for a half-marathon 12 weeks out, LTHR 172
pub fn mock_onboarding_data() -> OnboardingData {
  OnboardingData {
    profile: UserProfile {
      first_name: "Alex".to_string(),
      age: 34,
      gender: Gender::Female,
      weight: 62.0,
      height: 170.0,
    },
    fitness: FitnessAssessment {
      fitness_level: FitnessLevel::Intermediate,
      lthr: 172,
      threshold_pace: "4:45".to_string(),
      max_hr: 190,
      ftp: Some(240),
      swim_level: SwimLevel::Comfortable,
    },
    goal: RaceGoal {
      race_type: RaceType::HalfMarathon,
      race_name: "City Half Marathon".to_string(),
      race_date: Utc::now() + Duration::weeks(12),
      goal_time: Some("1:45:00".to_string()),
      priority: GoalPriority::Pb,
    },
    availability: WeeklyAvailability {
      monday: available_day("60min", false),
      tuesday: available_day("60min", false),
      wednesday: available_day("90min", false),
      thursday: available_day("60min", false),
      friday: available_day("45min", false),
      saturday: available_day("3h+", true),
      sunday: available_day("2h", false),
      weekly_hours_target: "6-8 hours".to_string(),
    },
    integrations: Integrations::default(),
  }
}

pub fn mock_feedback(overall_feeling: WeekFeeling) -> WeekFeedback {
  WeekFeedback {
    overall_feeling,
    physical_issues: Vec::new(),
    notes: String::new(),
    next_week_constraints: None,
  }
}

fn mock_workout(
  week_start: DateTime<Utc>,
  day_index: i64,
  workout_type: WorkoutType,
  name: &str,
  duration: i64,
) -> Workout {
  Workout {
    id: format!("w-test-{}-{}", day_index, name.to_lowercase().replace(' ', "-")),
    date: week_start + Duration::days(day_index),
    workout_type,
    name: name.to_string(),
    duration,
    distance: None,
    description: String::new(),
    purpose: String::new(),
    structure: Vec::new(),
    heart_rate_guidance: String::new(),
    pace_guidance: String::new(),
    coaching_tips: Vec::new(),
    adaptation_notes: String::new(),
    status: WorkoutStatus::Planned,
    actual_data: None,
  }
}

/// A week plan with the first `workout_count` sessions of a fixed pattern
pub fn mock_week_plan(week_number: u32, workout_count: usize) -> WeekPlan {
  let start = monday();
  let pattern: [(WorkoutType, &str, i64); 7] = [
    (WorkoutType::Run, "Easy Run", 60),
    (WorkoutType::Bike, "Endurance Ride", 75),
    (WorkoutType::Run, "Tempo Run", 45),
    (WorkoutType::Strength, "Core Strength", 30),
    (WorkoutType::Rest, "Rest Day", 0),
    (WorkoutType::Run, "Long Run", 100),
    (WorkoutType::Swim, "Endurance Swim", 50),
  ];

  let workouts: Vec<Workout> = pattern
    .iter()
    .take(workout_count)
    .enumerate()
    .map(|(i, (t, name, dur))| mock_workout(start, i as i64, *t, name, *dur))
    .collect();

  let total_minutes: i64 = workouts.iter().map(|w| w.duration).sum();

  WeekPlan {
    week_number,
    start_date: start,
    end_date: start + Duration::days(6),
    theme: format!("Week {} Theme", week_number),
    focus: "Aerobic development".to_string(),
    phase: "Build 1".to_string(),
    total_planned_hours: crate::models::plan::round_hours(total_minutes as f64 / 60.0),
    is_recovery_week: week_number % 4 == 0,
    is_fallback: false,
    workouts,
  }
}

/// A history of `count` completed weeks with every workout completed
pub fn mock_completed_weeks(count: usize) -> Vec<CompletedWeek> {
  (1..=count as u32)
    .map(|n| {
      let mut week = mock_week_plan(n, 5);
      for w in &mut week.workouts {
        if w.workout_type != WorkoutType::Rest {
          w.status = WorkoutStatus::Completed;
        }
      }
      let summary = WeekSummary::from_week(&week, mock_feedback(WeekFeeling::Okay));
      CompletedWeek::from_week(week, summary)
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Canned Generation Responses
/// ---------------------------------------------------------------------------

/// A valid week-generation JSON payload with a non-rest workout every day
pub fn sample_week_json(week_number: u32) -> String {
  let days = [
    ("monday", "run", "Easy Run", 45),
    ("tuesday", "strength", "Core Strength", 30),
    ("wednesday", "run", "Tempo Run", 55),
    ("thursday", "bike", "Easy Spin", 60),
    ("friday", "run", "Recovery Jog", 30),
    ("saturday", "run", "Long Run", 100),
    ("sunday", "swim", "Endurance Swim", 50),
  ];

  let workouts = days
    .iter()
    .map(|(day, t, name, dur)| {
      format!(
        r#"{{"dayOfWeek": "{}", "type": "{}", "name": "{}", "duration": {}, "purpose": "steady aerobic work", "description": "WARM-UP: 10min easy\\n\\nMAIN SET: steady", "coachingTips": ["stay relaxed"]}}"#,
        day, t, name, dur
      )
    })
    .collect::<Vec<_>>()
    .join(",\n    ");

  format!(
    r#"{{
  "weekNumber": {},
  "theme": "Aerobic Base Building",
  "focus": "Easy volume and consistency",
  "phase": "Base",
  "workouts": [
    {}
  ]
}}"#,
    week_number, workouts
  )
}

/// Wrap generated text in a Messages API response envelope
pub fn claude_success_body(text: &str) -> String {
  serde_json::json!({
    "content": [{"type": "text", "text": text}],
    "model": "claude-sonnet-4-20250514",
    "stop_reason": "end_turn",
    "usage": {"input_tokens": 1500, "output_tokens": 900}
  })
  .to_string()
}

/// Same envelope, flagged as cut off at the output limit
pub fn claude_truncated_body(text: &str) -> String {
  serde_json::json!({
    "content": [{"type": "text", "text": text}],
    "model": "claude-sonnet-4-20250514",
    "stop_reason": "max_tokens",
    "usage": {"input_tokens": 1500, "output_tokens": 8000}
  })
  .to_string()
}

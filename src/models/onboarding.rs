//! Athlete onboarding data: profile, fitness assessment, race goal,
//! weekly availability, and integration connection state.
//!
//! All of this is collected by the onboarding UI and is read-only input
//! to the engine. It is persisted as its own blob so prompts can be
//! rebuilt for every week of the plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Enums
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RaceType {
  Marathon,
  HalfMarathon,
  OlympicTriathlon,
  SprintTriathlon,
  #[serde(rename = "70.3-ironman")]
  HalfIronman,
  FullIronman,
  Custom,
}

impl RaceType {
  /// Triathlon races get the three-discipline distribution rules in prompts.
  pub fn is_triathlon(&self) -> bool {
    matches!(
      self,
      RaceType::OlympicTriathlon
        | RaceType::SprintTriathlon
        | RaceType::HalfIronman
        | RaceType::FullIronman
    )
  }
}

impl std::fmt::Display for RaceType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Marathon => write!(f, "marathon"),
      Self::HalfMarathon => write!(f, "half-marathon"),
      Self::OlympicTriathlon => write!(f, "olympic-triathlon"),
      Self::SprintTriathlon => write!(f, "sprint-triathlon"),
      Self::HalfIronman => write!(f, "70.3-ironman"),
      Self::FullIronman => write!(f, "full-ironman"),
      Self::Custom => write!(f, "custom"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
  Beginner,
  Intermediate,
  Advanced,
  Elite,
}

impl std::fmt::Display for FitnessLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Beginner => write!(f, "beginner"),
      Self::Intermediate => write!(f, "intermediate"),
      Self::Advanced => write!(f, "advanced"),
      Self::Elite => write!(f, "elite"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwimLevel {
  CantSwim,
  Learning,
  Comfortable,
  Competitive,
}

impl std::fmt::Display for SwimLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::CantSwim => write!(f, "cant-swim"),
      Self::Learning => write!(f, "learning"),
      Self::Comfortable => write!(f, "comfortable"),
      Self::Competitive => write!(f, "competitive"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
  /// Get to the finish line healthy
  Finish,
  /// Personal best
  Pb,
  /// Race for a placing
  Podium,
}

impl std::fmt::Display for GoalPriority {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Finish => write!(f, "finish"),
      Self::Pb => write!(f, "pb"),
      Self::Podium => write!(f, "podium"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
  Male,
  Female,
  Other,
  PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
  Morning,
  Midday,
  Evening,
}

impl std::fmt::Display for TimeSlot {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Morning => write!(f, "morning"),
      Self::Midday => write!(f, "midday"),
      Self::Evening => write!(f, "evening"),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Profile & Assessment
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub first_name: String,
  pub age: i64,
  pub gender: Gender,
  /// Weight in kg
  pub weight: f64,
  /// Height in cm
  pub height: f64,
}

/// Fitness assessment collected during onboarding.
///
/// LTHR drives the zone calculation; threshold pace and FTP are passed
/// through to the prompt so workout descriptions reference real numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessAssessment {
  pub fitness_level: FitnessLevel,
  /// Lactate threshold heart rate, bpm
  pub lthr: i64,
  /// Threshold pace per km, e.g. "4:45"
  pub threshold_pace: String,
  pub max_hr: i64,
  /// Cycling functional threshold power, watts
  pub ftp: Option<i64>,
  pub swim_level: SwimLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceGoal {
  pub race_type: RaceType,
  pub race_name: String,
  /// Validated to be in the future by the onboarding layer
  pub race_date: DateTime<Utc>,
  /// Target finishing time, e.g. "1:45:00"
  pub goal_time: Option<String>,
  pub priority: GoalPriority,
}

/// ---------------------------------------------------------------------------
/// Availability
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
  pub available: bool,
  pub time_slots: Vec<TimeSlot>,
  /// Max session duration label, e.g. "60min", "2h"
  pub max_duration: String,
  #[serde(default)]
  pub long_session: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyAvailability {
  pub monday: DayAvailability,
  pub tuesday: DayAvailability,
  pub wednesday: DayAvailability,
  pub thursday: DayAvailability,
  pub friday: DayAvailability,
  pub saturday: DayAvailability,
  pub sunday: DayAvailability,
  /// e.g. "6-8 hours"
  pub weekly_hours_target: String,
}

impl WeeklyAvailability {
  /// Days in calendar order with their display names
  pub fn days(&self) -> [(&'static str, &DayAvailability); 7] {
    [
      ("Monday", &self.monday),
      ("Tuesday", &self.tuesday),
      ("Wednesday", &self.wednesday),
      ("Thursday", &self.thursday),
      ("Friday", &self.friday),
      ("Saturday", &self.saturday),
      ("Sunday", &self.sunday),
    ]
  }
}

/// ---------------------------------------------------------------------------
/// Integrations (connection state only)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarIntegration {
  pub connected: bool,
  pub read_calendar: Option<String>,
  pub write_calendar: Option<String>,
  #[serde(default)]
  pub avoid_conflicts: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerIntegration {
  pub connected: bool,
  #[serde(default)]
  pub auto_complete: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Integrations {
  pub google_calendar: CalendarIntegration,
  pub strava: TrackerIntegration,
}

/// ---------------------------------------------------------------------------
/// Onboarding Bundle
/// ---------------------------------------------------------------------------

/// Everything the onboarding wizard collects, persisted as one blob and
/// read on every generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingData {
  pub profile: UserProfile,
  pub fitness: FitnessAssessment,
  pub goal: RaceGoal,
  pub availability: WeeklyAvailability,
  #[serde(default)]
  pub integrations: Integrations,
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_race_type_triathlon_detection() {
    assert!(RaceType::OlympicTriathlon.is_triathlon());
    assert!(RaceType::HalfIronman.is_triathlon());
    assert!(!RaceType::Marathon.is_triathlon());
    assert!(!RaceType::Custom.is_triathlon());
  }

  #[test]
  fn test_race_type_serde_tags() {
    let json = serde_json::to_string(&RaceType::HalfIronman).unwrap();
    assert_eq!(json, r#""70.3-ironman""#);

    let parsed: RaceType = serde_json::from_str(r#""half-marathon""#).unwrap();
    assert_eq!(parsed, RaceType::HalfMarathon);
  }

  #[test]
  fn test_onboarding_roundtrip_rehydrates_dates() {
    let data = crate::test_utils::mock_onboarding_data();
    let json = serde_json::to_string(&data).unwrap();
    let back: OnboardingData = serde_json::from_str(&json).unwrap();
    assert_eq!(back.goal.race_date, data.goal.race_date);
    assert_eq!(back.fitness.lthr, 172);
  }
}

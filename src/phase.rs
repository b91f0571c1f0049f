//! Periodization arithmetic: training phases, recovery cadence, heart-rate
//! zones, and block length.
//!
//! Everything here is a pure function of its inputs so the prompt builder
//! and the state machine can share one source of truth.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Plans never exceed a year; longer lead times start in an extended base.
const MAX_PLAN_WEEKS: u32 = 52;

/// ---------------------------------------------------------------------------
/// Training Phase
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPhase {
  Base,
  Build1,
  Build2,
  Peak,
  Taper,
  RaceWeek,
}

impl std::fmt::Display for TrainingPhase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Base => write!(f, "Base"),
      Self::Build1 => write!(f, "Build 1"),
      Self::Build2 => write!(f, "Build 2"),
      Self::Peak => write!(f, "Peak"),
      Self::Taper => write!(f, "Taper"),
      Self::RaceWeek => write!(f, "Race Week"),
    }
  }
}

impl std::str::FromStr for TrainingPhase {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Base" => Ok(Self::Base),
      "Build 1" => Ok(Self::Build1),
      "Build 2" => Ok(Self::Build2),
      "Peak" => Ok(Self::Peak),
      "Taper" => Ok(Self::Taper),
      "Race Week" => Ok(Self::RaceWeek),
      _ => Err(format!("Unknown training phase: {}", s)),
    }
  }
}

/// Phase for a given week of the block.
///
/// Buckets by weeks remaining until race day; a tie lands in the earlier
/// (more conservative) phase.
pub fn phase_for(week_number: u32, total_weeks: u32) -> TrainingPhase {
  let remaining = total_weeks.saturating_sub(week_number);

  if remaining <= 1 {
    TrainingPhase::RaceWeek
  } else if remaining <= 3 {
    TrainingPhase::Taper
  } else if remaining <= 6 {
    TrainingPhase::Peak
  } else if remaining <= 8 {
    TrainingPhase::Build2
  } else if remaining <= 10 {
    TrainingPhase::Build1
  } else {
    TrainingPhase::Base
  }
}

/// Every 4th week is a recovery/deload week
pub fn is_recovery_week(week_number: u32) -> bool {
  week_number % 4 == 0
}

/// ---------------------------------------------------------------------------
/// Heart Rate Zones
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HrZone {
  pub min: i64,
  pub max: i64,
  pub name: &'static str,
}

/// The five zones as fixed percentage bands of LTHR
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HrZones {
  pub zone1: HrZone,
  pub zone2: HrZone,
  pub zone3: HrZone,
  pub zone4: HrZone,
  pub zone5: HrZone,
}

/// Zone boundaries from lactate threshold heart rate, rounded to whole bpm
pub fn hr_zones(lthr: i64) -> HrZones {
  let pct = |p: f64| (lthr as f64 * p).round() as i64;

  HrZones {
    zone1: HrZone { min: pct(0.68), max: pct(0.73), name: "Recovery" },
    zone2: HrZone { min: pct(0.73), max: pct(0.80), name: "Aerobic" },
    zone3: HrZone { min: pct(0.80), max: pct(0.87), name: "Tempo" },
    zone4: HrZone { min: pct(0.87), max: pct(0.93), name: "Threshold" },
    zone5: HrZone { min: pct(0.93), max: pct(1.05), name: "VO2max" },
  }
}

/// ---------------------------------------------------------------------------
/// Calendar Helpers
/// ---------------------------------------------------------------------------

/// Whole weeks until race day, rounded up and clamped to [1, 52].
///
/// The clamp bounds every downstream loop and array size; out-of-range
/// values never reach the state machine.
pub fn total_weeks_until(race_date: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
  let days = (race_date - now).num_days();
  let weeks = (days as f64 / 7.0).ceil() as i64;
  weeks.clamp(1, MAX_PLAN_WEEKS as i64) as u32
}

/// Monday 00:00 UTC of the week containing `date`
pub fn monday_of(date: DateTime<Utc>) -> DateTime<Utc> {
  let days_from_monday = date.weekday().num_days_from_monday() as i64;
  (date - Duration::days(days_from_monday))
    .with_hour(0)
    .and_then(|d| d.with_minute(0))
    .and_then(|d| d.with_second(0))
    .and_then(|d| d.with_nanosecond(0))
    .expect("midnight is always a valid time")
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

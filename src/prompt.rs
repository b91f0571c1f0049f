//! Prompt construction for week generation.
//!
//! One instruction string carries everything the generator needs: athlete
//! stats, computed HR zones, the goal, the current phase, feedback carried
//! over from last week, the compressed history, day-by-day availability,
//! and the exact output schema. The schema wording here is the contract
//! the parser accepts; change them together.

use crate::history;
use crate::models::onboarding::{DayAvailability, OnboardingData};
use crate::models::plan::CompletedWeek;
use crate::phase::{self, HrZones};

/// Static coach persona sent as the system prompt
pub const COACH_SYSTEM_PROMPT: &str = include_str!("prompts/coach_system.txt");

/// Build the user-message prompt for generating one training week
pub fn build_week_prompt(
  data: &OnboardingData,
  week_number: u32,
  total_weeks: u32,
  completed_weeks: &[CompletedWeek],
  next_week_constraints: Option<&str>,
) -> String {
  let phase = phase::phase_for(week_number, total_weeks);
  let is_recovery = phase::is_recovery_week(week_number);
  let zones = phase::hr_zones(data.fitness.lthr);
  let weeks_until_race = total_weeks - week_number;
  let is_triathlon = data.goal.race_type.is_triathlon();

  let history_context = history::compress(completed_weeks);
  let last_feedback = completed_weeks.last().map(|w| &w.summary.feedback);

  let mut prompt = String::with_capacity(4096);

  prompt.push_str(&format!(
    "You are creating week {} of a {} training plan.\n\n",
    week_number,
    if is_triathlon { "triathlon" } else { "running" }
  ));

  // Athlete profile
  prompt.push_str("## ATHLETE PROFILE\n");
  prompt.push_str(&format!("- Name: {}\n", data.profile.first_name));
  prompt.push_str(&format!(
    "- Age: {}, Weight: {}kg, Height: {}cm\n",
    data.profile.age, data.profile.weight, data.profile.height
  ));
  prompt.push_str(&format!("- Level: {}\n", data.fitness.fitness_level));
  prompt.push_str(&format!("- Max HR: {}bpm\n", data.fitness.max_hr));
  prompt.push_str(&format!("- LTHR: {}bpm\n", data.fitness.lthr));
  prompt.push_str(&format!(
    "- Threshold Pace: {}/km\n",
    data.fitness.threshold_pace
  ));
  if let Some(ftp) = data.fitness.ftp {
    prompt.push_str(&format!("- FTP: {}W\n", ftp));
  }
  prompt.push_str(&format!("- Swim Level: {}\n", data.fitness.swim_level));

  // HR zones
  prompt.push_str(&format!(
    "\n## HEART RATE ZONES (based on LTHR {})\n",
    data.fitness.lthr
  ));
  prompt.push_str(&render_zones(&zones));

  // Race goal
  prompt.push_str("\n## RACE GOAL\n");
  prompt.push_str(&format!(
    "- Race: {} ({})\n",
    data.goal.race_name, data.goal.race_type
  ));
  prompt.push_str(&format!(
    "- Date: {}\n",
    data.goal.race_date.format("%Y-%m-%d")
  ));
  prompt.push_str(&format!("- Weeks until race: {}\n", weeks_until_race));
  prompt.push_str(&format!("- Goal: {}\n", data.goal.priority));
  if let Some(goal_time) = &data.goal.goal_time {
    prompt.push_str(&format!("- Target time: {}\n", goal_time));
  }

  if is_triathlon {
    prompt.push_str(&triathlon_distribution_rules(data));
  }

  // Training context
  prompt.push_str("\n## TRAINING CONTEXT\n");
  prompt.push_str(&format!(
    "- Currently generating: WEEK {} of {}\n",
    week_number, total_weeks
  ));
  prompt.push_str(&format!("- Training phase: {}\n", phase));
  if is_recovery {
    prompt.push_str(
      "- THIS IS A RECOVERY/DELOAD WEEK - Reduce volume by 30-40%, keep intensity low\n",
    );
  }
  if let Some(feedback) = last_feedback {
    if feedback.overall_feeling.is_fatigued() {
      prompt.push_str("- Athlete reported fatigue last week - consider reducing load\n");
    }
    if !feedback.physical_issues.is_empty() {
      prompt.push_str(&format!(
        "- Physical issues reported: {} - adapt accordingly\n",
        feedback.physical_issues.join(", ")
      ));
    }
  }
  if let Some(constraints) = next_week_constraints {
    prompt.push_str(&format!(
      "- Athlete constraint: \"{}\" - adapt schedule accordingly\n",
      constraints
    ));
  }

  // History
  prompt.push_str("\n## TRAINING HISTORY\n");
  prompt.push_str(&history_context);
  prompt.push('\n');

  // Availability
  prompt.push_str("\n## WEEKLY AVAILABILITY\n");
  for (day_name, day) in data.availability.days() {
    prompt.push_str(&format!("- {}: {}\n", day_name, render_day(day)));
  }
  prompt.push_str(&format!(
    "- Weekly hours target: {}\n",
    data.availability.weekly_hours_target
  ));

  // Output schema and rules
  prompt.push_str(&output_instructions(week_number, &phase.to_string(), is_triathlon, is_recovery));

  prompt
}

fn render_zones(zones: &HrZones) -> String {
  let z = [
    (1, zones.zone1),
    (2, zones.zone2),
    (3, zones.zone3),
    (4, zones.zone4),
    (5, zones.zone5),
  ];
  z.iter()
    .map(|(n, zone)| format!("- Zone {} {}: {}-{}bpm\n", n, zone.name, zone.min, zone.max))
    .collect()
}

fn render_day(day: &DayAvailability) -> String {
  if !day.available {
    return "REST DAY".to_string();
  }
  let slots = day
    .time_slots
    .iter()
    .map(|s| s.to_string())
    .collect::<Vec<_>>()
    .join(", ");
  let mut line = format!("Available ({}, max {})", slots, day.max_duration);
  if day.long_session {
    line.push_str(" - LONG SESSION DAY");
  }
  line
}

/// Equal-frequency rules for the three disciplines. Weaker disciplines get
/// adjusted intensity and complexity, never reduced frequency.
fn triathlon_distribution_rules(data: &OnboardingData) -> String {
  format!(
    "\n## WORKOUT DISTRIBUTION FOR TRIATHLON\n\
     You MUST include ALL THREE disciplines (swim, bike, run) each week with EQUAL frequency:\n\
     - SWIM: 2 sessions per week (skill level affects intensity, NOT frequency)\n\
     - BIKE: 2 sessions per week\n\
     - RUN: 2 sessions per week\n\
     - Optional: 1 strength/mobility session\n\n\
     The athlete's swim level is \"{}\". If beginner: focus swim sessions on technique \
     drills, shorter intervals, more rest. If intermediate: mix technique with aerobic \
     development. If advanced: include threshold and race-pace work.\n\n\
     DO NOT reduce swim frequency because the athlete is a weaker swimmer. Weaker \
     disciplines need MORE practice, not less. Adjust INTENSITY and COMPLEXITY, not frequency.\n",
    data.fitness.swim_level
  )
}

fn output_instructions(
  week_number: u32,
  phase: &str,
  is_triathlon: bool,
  is_recovery: bool,
) -> String {
  let mut out = String::with_capacity(1536);

  out.push_str(
    "\n## INSTRUCTIONS\n\
     Generate a DETAILED training week. For each workout provide a clear warm-up \
     protocol, a main set with SPECIFIC intervals, paces, HR zones and recovery \
     periods, a cool-down, and why the workout matters for the goal. Use the \
     athlete's ACTUAL HR zones and threshold pace in every description.\n\n",
  );

  out.push_str(&format!(
    "Return ONLY valid JSON (no markdown, no explanation):\n\
     {{\n\
     \x20 \"weekNumber\": {week_number},\n\
     \x20 \"theme\": \"Week theme (e.g., 'Aerobic Base Building')\",\n\
     \x20 \"focus\": \"Primary focus for the week\",\n\
     \x20 \"phase\": \"{phase}\",\n\
     \x20 \"workouts\": [\n\
     \x20   {{\n\
     \x20     \"dayOfWeek\": \"monday\",\n\
     \x20     \"type\": \"run\",\n\
     \x20     \"name\": \"Workout Name\",\n\
     \x20     \"duration\": 60,\n\
     \x20     \"distance\": 10,\n\
     \x20     \"purpose\": \"Why this workout - connect to the race goal\",\n\
     \x20     \"description\": \"WARM-UP: ...\\n\\nMAIN SET: ...\\n\\nCOOL-DOWN: ...\",\n\
     \x20     \"coachingTips\": [\"tip1\", \"tip2\", \"tip3\"]\n\
     \x20   }}\n\
     \x20 ]\n\
     }}\n\n",
  ));

  out.push_str("RULES:\n");
  out.push_str("- Generate 5-7 workouts based on availability (rest days where not available)\n");
  if is_triathlon {
    out.push_str(
      "- MANDATORY: Include exactly 2 swim, 2 bike, and 2 run sessions. Adjust intensity \
       based on skill, not frequency.\n",
    );
  } else {
    out.push_str("- Focus on running with supporting strength work\n");
  }
  out.push_str("- type must be: \"run\", \"bike\", \"swim\", \"strength\", or \"rest\"\n");
  out.push_str("- distance in km (null for strength/rest)\n");
  out.push_str("- duration in minutes\n");
  out.push_str("- Use \\n for line breaks in description\n");
  out.push_str("- Include SPECIFIC HR zones and paces in every description\n");
  out.push_str("- NO trailing commas\n");
  if is_recovery {
    out.push_str("- This is a recovery week: shorter sessions, lower intensity\n");
  }

  out
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::onboarding::RaceType;
  use crate::models::plan::WeekFeeling;
  use crate::test_utils::{mock_completed_weeks, mock_onboarding_data};

  #[test]
  fn test_prompt_contains_athlete_and_zone_data() {
    let data = mock_onboarding_data();
    let prompt = build_week_prompt(&data, 1, 12, &[], None);

    assert!(prompt.contains("- LTHR: 172bpm"));
    // Zone 4 for LTHR 172 is 150-160
    assert!(prompt.contains("- Zone 4 Threshold: 150-160bpm"));
    assert!(prompt.contains("WEEK 1 of 12"));
    assert!(prompt.contains(history::FIRST_WEEK_CONTEXT));
    assert!(prompt.contains("NO trailing commas"));
  }

  #[test]
  fn test_running_race_skips_triathlon_rules() {
    let data = mock_onboarding_data();
    assert_eq!(data.goal.race_type, RaceType::HalfMarathon);

    let prompt = build_week_prompt(&data, 1, 12, &[], None);
    assert!(!prompt.contains("WORKOUT DISTRIBUTION FOR TRIATHLON"));
    assert!(prompt.contains("Focus on running with supporting strength work"));
  }

  #[test]
  fn test_triathlon_race_includes_distribution_rules() {
    let mut data = mock_onboarding_data();
    data.goal.race_type = RaceType::OlympicTriathlon;

    let prompt = build_week_prompt(&data, 1, 12, &[], None);
    assert!(prompt.contains("WORKOUT DISTRIBUTION FOR TRIATHLON"));
    assert!(prompt.contains("exactly 2 swim, 2 bike, and 2 run sessions"));
  }

  #[test]
  fn test_recovery_week_flagged() {
    let data = mock_onboarding_data();
    let prompt = build_week_prompt(&data, 4, 12, &mock_completed_weeks(3), None);
    assert!(prompt.contains("RECOVERY/DELOAD WEEK"));
  }

  #[test]
  fn test_last_week_feedback_carries_over() {
    let data = mock_onboarding_data();
    let mut weeks = mock_completed_weeks(2);
    weeks[1].summary.feedback.overall_feeling = WeekFeeling::Tired;
    weeks[1].summary.feedback.physical_issues = vec!["sore knee".to_string()];

    let prompt = build_week_prompt(&data, 3, 12, &weeks, Some("traveling Thursday"));

    assert!(prompt.contains("reported fatigue last week"));
    assert!(prompt.contains("sore knee"));
    assert!(prompt.contains("traveling Thursday"));
  }

  #[test]
  fn test_unavailable_days_render_as_rest() {
    let mut data = mock_onboarding_data();
    data.availability.friday.available = false;

    let prompt = build_week_prompt(&data, 1, 12, &[], None);
    assert!(prompt.contains("- Friday: REST DAY"));
  }
}

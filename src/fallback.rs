//! Deterministic placeholder week used when generation fails outright.
//!
//! The athlete is never left with an empty week: after transport, repair,
//! and parse attempts are exhausted the engine can install one of these
//! template weeks instead. Fallback weeks are tagged (`is_fallback` plus a
//! theme suffix) so the UI can disclose that the content is not
//! personalized, and the underlying error is still surfaced to the caller.

use chrono::{DateTime, Duration, Utc};

use crate::models::onboarding::OnboardingData;
use crate::models::plan::{
  round_hours, WeekPlan, Workout, WorkoutSegment, WorkoutStatus, WorkoutType,
};
use crate::parser;
use crate::phase;

/// Volume reduction applied on recovery weeks
const RECOVERY_SCALE: f64 = 0.7;

struct Template {
  name: &'static str,
  duration: i64,
  distance: Option<f64>,
  purpose: &'static str,
  description: &'static str,
  hr_guidance: &'static str,
  pace_guidance: &'static str,
  tips: &'static [&'static str],
  segments: &'static [(&'static str, &'static str, &'static str)],
}

const RUN_TEMPLATES: &[Template] = &[
  Template {
    name: "Easy Recovery Run",
    duration: 45,
    distance: Some(7.0),
    purpose: "Active recovery to promote blood flow while maintaining aerobic fitness.",
    description: "Steady, genuinely easy running. Keep the effort conversational throughout; \
                  this is active rest, not training stress.",
    hr_guidance: "Zone 1-2. If breathing becomes labored, slow down.",
    pace_guidance: "Conversation pace throughout. Slower is better today.",
    tips: &[
      "Leave your ego at the door - slower is better today",
      "Focus on relaxed form and quick turnover",
      "If legs feel heavy, walking breaks are fine",
    ],
    segments: &[
      ("Warm-up", "5 min", "Very easy jog to loosen up"),
      ("Main run", "35 min", "Steady Zone 1-2 effort"),
      ("Cool-down", "5 min", "Easy jog to walk"),
    ],
  },
  Template {
    name: "Tempo Run",
    duration: 55,
    distance: Some(10.0),
    purpose: "Raise the lactate threshold with comfortably hard sustained efforts.",
    description: "Warm up well, then 3 x 10min at tempo effort with 2min easy jog recovery. \
                  Challenging but sustainable; the last interval should feel hard but doable.",
    hr_guidance: "Tempo intervals in Zone 4, recoveries back to Zone 2.",
    pace_guidance: "Intervals near threshold pace; recovery jog very easy.",
    tips: &[
      "Start each interval conservatively",
      "Relaxed shoulders, quick cadence",
      "Better to finish slightly slower than to stop",
    ],
    segments: &[
      ("Warm-up", "15 min", "Easy jog + 4 x 20sec strides"),
      ("Main set", "3 x 10min", "Tempo pace with 2min easy jog recovery"),
      ("Cool-down", "10 min", "Easy jog"),
    ],
  },
  Template {
    name: "Long Run",
    duration: 100,
    distance: Some(16.0),
    purpose: "Build aerobic endurance and fat-burning efficiency over an extended effort.",
    description: "Steady Zone 2 running. You should be able to hold a conversation the whole \
                  way; take fluids every 20 minutes.",
    hr_guidance: "Zone 2 throughout. If HR drifts up late, slow down or walk briefly.",
    pace_guidance: "Easy pace - slower than feels productive. It is.",
    tips: &[
      "Break it into thirds mentally",
      "Practice race-day fueling",
      "Flat to rolling terrain preferred",
    ],
    segments: &[
      ("Warm-up", "10 min", "Start very easy, build to easy pace"),
      ("Main run", "80 min", "Steady Zone 2 effort"),
      ("Cool-down", "10 min", "Gradually slow to a walk"),
    ],
  },
];

const BIKE_TEMPLATES: &[Template] = &[
  Template {
    name: "Easy Spin",
    duration: 60,
    distance: Some(25.0),
    purpose: "Flush the legs and maintain cycling fitness without adding stress.",
    description: "High cadence, low resistance spinning. If your legs burn you are going \
                  too hard.",
    hr_guidance: "Below Zone 2 ceiling. True recovery.",
    pace_guidance: "Cadence 90-100 rpm, flat terrain preferred.",
    tips: &[
      "High cadence, low resistance",
      "Practice smooth pedaling technique",
      "Indoor trainer is fine for this session",
    ],
    segments: &[
      ("Warm-up", "10 min", "Very easy spinning, high cadence"),
      ("Main ride", "45 min", "Steady Zone 1-2 effort"),
      ("Cool-down", "5 min", "Very easy spinning"),
    ],
  },
  Template {
    name: "Endurance Ride",
    duration: 120,
    distance: Some(50.0),
    purpose: "Build cycling endurance and practice nutrition strategy.",
    description: "Steady Zone 2 riding at consistent effort. Use it to test equipment and \
                  practice eating on the bike.",
    hr_guidance: "Zone 2; avoid Zone 3 creep, stay patient.",
    pace_guidance: "Cadence 85-95 rpm, consistent effort over speed.",
    tips: &[
      "Aim for 60-80g carbs per hour",
      "Stay aero on the flats",
      "Can be split across the trainer if weather is bad",
    ],
    segments: &[
      ("Warm-up", "15 min", "Easy spinning, gradually building"),
      ("Main set", "95 min", "Steady Zone 2 effort"),
      ("Cool-down", "10 min", "Easy spinning"),
    ],
  },
];

const SWIM_TEMPLATES: &[Template] = &[Template {
  name: "Technique & Endurance Swim",
  duration: 50,
  distance: Some(2.0),
  purpose: "Build swimming endurance while maintaining good technique.",
  description: "Drill-focused warm-up, then a steady endurance set. Efficiency over speed: \
                count strokes per length and aim for consistency.",
  hr_guidance: "Moderate effort on the endurance set, easy everywhere else.",
  pace_guidance: "Finish feeling like you could do more.",
  tips: &[
    "Bilateral breathing during warm-up",
    "Push off walls strong - free speed",
    "Quality over speed in drill segments",
  ],
  segments: &[
    ("Warm-up", "400m", "200m easy freestyle + 4 x 50m drill/swim"),
    ("Technique set", "600m", "6 x 100m as 25m drill + 75m swim, 15sec rest"),
    ("Endurance set", "800m", "4 x 200m steady with 20sec rest"),
    ("Cool-down", "200m", "Easy backstroke or choice"),
  ],
}];

const STRENGTH_TEMPLATES: &[Template] = &[Template {
  name: "Core & Stability",
  duration: 30,
  distance: None,
  purpose: "Build core strength and stability to improve form and prevent injury.",
  description: "Two circuits of core and single-leg stability work. Quality movements over \
                rep counts; rest as needed.",
  hr_guidance: "Not an HR session - focus on movement quality.",
  pace_guidance: "8-12 reps per exercise, 2-3 rounds per circuit.",
  tips: &[
    "Perfect form is the whole point",
    "Breathe - don't brace and hold",
    "Pairs well with an easy run day",
  ],
  segments: &[
    ("Warm-up", "5 min", "Dynamic stretches and activation"),
    ("Circuit 1", "10 min", "Plank variations, dead bugs, bird dogs"),
    ("Circuit 2", "10 min", "Single-leg work, glute bridges, clamshells"),
    ("Cool-down", "5 min", "Static stretching"),
  ],
}];

const REST_TEMPLATE: Template = Template {
  name: "Rest Day",
  duration: 0,
  distance: None,
  purpose: "Complete rest so the body can adapt to training stress.",
  description: "Rest is when you get stronger. Sleep well, eat well, hydrate. Light \
                stretching or a short walk is fine; a sneaky workout is not.",
  hr_guidance: "",
  pace_guidance: "",
  tips: &[
    "Rest is training",
    "Focus on sleep quality tonight",
  ],
  segments: &[],
};

const THEMES: &[(&str, &str)] = &[
  ("Base Building", "Aerobic foundation and easy volume"),
  ("Endurance Development", "Longer sessions, steady effort"),
  ("Threshold Building", "Quality tempo work"),
  ("Recovery Week", "Reduced volume, maintain frequency"),
];

/// Generate a deterministic placeholder week.
///
/// Same inputs produce the same week (apart from workout ids, which stay
/// unique across attempts).
pub fn generate_fallback_week(
  data: &OnboardingData,
  week_number: u32,
  total_weeks: u32,
  week_start: DateTime<Utc>,
) -> WeekPlan {
  let is_triathlon = data.goal.race_type.is_triathlon();
  let is_recovery = phase::is_recovery_week(week_number);
  let phase = phase::phase_for(week_number, total_weeks);

  let pattern: [Option<WorkoutType>; 7] = if is_triathlon {
    [
      Some(WorkoutType::Swim),
      Some(WorkoutType::Bike),
      Some(WorkoutType::Run),
      Some(WorkoutType::Strength),
      Some(WorkoutType::Rest),
      Some(WorkoutType::Bike),
      Some(WorkoutType::Run),
    ]
  } else {
    [
      Some(WorkoutType::Run),
      Some(WorkoutType::Strength),
      Some(WorkoutType::Run),
      Some(WorkoutType::Bike),
      Some(WorkoutType::Rest),
      Some(WorkoutType::Run),
      Some(WorkoutType::Rest),
    ]
  };

  const DAY_TOKENS: [&str; 7] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
  ];

  let mut workouts = Vec::new();
  for (day_index, slot) in pattern.iter().enumerate() {
    let Some(workout_type) = slot else { continue };
    let template = pick_template(*workout_type, week_number, day_index);
    let duration = if is_recovery && template.duration > 0 {
      ((template.duration as f64) * RECOVERY_SCALE).round() as i64
    } else {
      template.duration
    };

    workouts.push(Workout {
      id: parser::synthesize_id(week_number, DAY_TOKENS[day_index]),
      date: week_start + Duration::days(day_index as i64),
      workout_type: *workout_type,
      name: template.name.to_string(),
      duration,
      distance: template.distance,
      description: template.description.to_string(),
      purpose: template.purpose.to_string(),
      structure: template
        .segments
        .iter()
        .map(|(name, dur, desc)| WorkoutSegment {
          name: name.to_string(),
          duration: dur.to_string(),
          description: desc.to_string(),
          target_hr: None,
          target_pace: None,
          target_power: None,
        })
        .collect(),
      heart_rate_guidance: template.hr_guidance.to_string(),
      pace_guidance: template.pace_guidance.to_string(),
      coaching_tips: template.tips.iter().map(|t| t.to_string()).collect(),
      adaptation_notes: String::new(),
      status: WorkoutStatus::Planned,
      actual_data: None,
    });
  }

  let (theme, focus) = THEMES[((week_number as usize).saturating_sub(1)) % THEMES.len()];
  let total_minutes: i64 = workouts.iter().map(|w| w.duration).sum();

  WeekPlan {
    week_number,
    start_date: week_start,
    end_date: week_start + Duration::days(6),
    theme: format!("{} (fallback)", theme),
    focus: focus.to_string(),
    phase: phase.to_string(),
    total_planned_hours: round_hours(total_minutes as f64 / 60.0),
    is_recovery_week: is_recovery,
    is_fallback: true,
    workouts,
  }
}

/// Template choice is keyed on week and day so the same week regenerates
/// identically, with variety across the block
fn pick_template(workout_type: WorkoutType, week_number: u32, day_index: usize) -> &'static Template {
  let templates: &[Template] = match workout_type {
    WorkoutType::Run => RUN_TEMPLATES,
    WorkoutType::Bike => BIKE_TEMPLATES,
    WorkoutType::Swim => SWIM_TEMPLATES,
    WorkoutType::Strength => STRENGTH_TEMPLATES,
    WorkoutType::Rest => return &REST_TEMPLATE,
  };
  &templates[(week_number as usize + day_index) % templates.len()]
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::onboarding::RaceType;
  use crate::test_utils::{mock_onboarding_data, monday};

  #[test]
  fn test_fallback_week_is_tagged() {
    let data = mock_onboarding_data();
    let week = generate_fallback_week(&data, 1, 12, monday());

    assert!(week.is_fallback);
    assert!(week.theme.contains("(fallback)"));
    assert!(!week.workouts.is_empty());
    assert!(week.workouts.iter().any(|w| w.workout_type != WorkoutType::Rest));
  }

  #[test]
  fn test_fallback_is_deterministic_apart_from_ids() {
    let data = mock_onboarding_data();
    let a = generate_fallback_week(&data, 3, 12, monday());
    let b = generate_fallback_week(&data, 3, 12, monday());

    assert_eq!(a.theme, b.theme);
    assert_eq!(a.total_planned_hours, b.total_planned_hours);
    assert_eq!(a.workouts.len(), b.workouts.len());
    for (wa, wb) in a.workouts.iter().zip(&b.workouts) {
      assert_eq!(wa.name, wb.name);
      assert_eq!(wa.duration, wb.duration);
      assert_eq!(wa.date, wb.date);
      // Ids stay unique across attempts
      assert_ne!(wa.id, wb.id);
    }
  }

  #[test]
  fn test_triathlon_pattern_covers_all_disciplines() {
    let mut data = mock_onboarding_data();
    data.goal.race_type = RaceType::OlympicTriathlon;

    let week = generate_fallback_week(&data, 1, 16, monday());
    let types: Vec<WorkoutType> = week.workouts.iter().map(|w| w.workout_type).collect();

    assert!(types.contains(&WorkoutType::Swim));
    assert!(types.contains(&WorkoutType::Bike));
    assert!(types.contains(&WorkoutType::Run));
  }

  #[test]
  fn test_recovery_week_reduces_volume() {
    let data = mock_onboarding_data();
    let normal = generate_fallback_week(&data, 3, 12, monday());
    let recovery = generate_fallback_week(&data, 4, 12, monday());

    assert!(recovery.is_recovery_week);
    assert!(recovery.total_planned_hours < normal.total_planned_hours);
    assert_eq!(recovery.theme, "Recovery Week (fallback)");
  }

  #[test]
  fn test_rest_days_have_zero_duration() {
    let data = mock_onboarding_data();
    let week = generate_fallback_week(&data, 2, 12, monday());
    for w in week.workouts.iter().filter(|w| w.workout_type == WorkoutType::Rest) {
      assert_eq!(w.duration, 0);
    }
  }
}

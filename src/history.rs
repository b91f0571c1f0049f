//! History compression for prompt context.
//!
//! The plan history grows without bound, so the context block sent to the
//! generator must not. The last two weeks are rendered in full detail;
//! everything older collapses into a single aggregate block. That split is
//! the only thing keeping prompt size flat over a long block, so keep it.

use std::collections::HashMap;

use crate::models::plan::CompletedWeek;

/// How many recent weeks get the detailed rendering
const DETAILED_WEEKS: usize = 2;

/// An issue tag must show up in at least this many older weeks to be
/// called recurring
const RECURRING_ISSUE_MIN: usize = 2;

pub const FIRST_WEEK_CONTEXT: &str =
  "This is the athlete's first week of training. No prior history.";

/// Build the bounded history block for the generation prompt
pub fn compress(completed_weeks: &[CompletedWeek]) -> String {
  if completed_weeks.is_empty() {
    return FIRST_WEEK_CONTEXT.to_string();
  }

  let mut parts: Vec<String> = Vec::new();

  let split = completed_weeks.len().saturating_sub(DETAILED_WEEKS);
  let (older, recent) = completed_weeks.split_at(split);

  parts.push("RECENT WEEKS (detailed):".to_string());
  for week in recent {
    parts.push(render_recent_week(week));
  }

  if !older.is_empty() {
    parts.push(String::new());
    parts.push(render_older_weeks(older));
  }

  parts.join("\n")
}

/// Full-detail line for one of the most recent weeks
fn render_recent_week(week: &CompletedWeek) -> String {
  let summary = &week.summary;

  let key_workouts = summary
    .key_workouts
    .iter()
    .map(|k| {
      let mark = if k.completed { "✓" } else { "✗" };
      match &k.notes {
        Some(notes) => format!("{} {} ({})", k.name, mark, notes),
        None => format!("{} {}", k.name, mark),
      }
    })
    .collect::<Vec<_>>()
    .join(", ");

  let mut line = format!(
    "- Week {} ({}): {:.1}h of {:.1}h ({}% completion). Key sessions: {}. Feeling: {}.",
    week.week_number,
    week.phase,
    summary.completed_hours,
    summary.planned_hours,
    summary.completion_rate,
    key_workouts,
    summary.feedback.overall_feeling,
  );

  if !summary.feedback.physical_issues.is_empty() {
    line.push_str(&format!(
      " Issues: {}.",
      summary.feedback.physical_issues.join(", ")
    ));
  }
  if !summary.feedback.notes.is_empty() {
    line.push_str(&format!(" Notes: \"{}\"", summary.feedback.notes));
  }

  line
}

/// Single aggregate block covering all weeks older than the detailed window
fn render_older_weeks(older: &[CompletedWeek]) -> String {
  let count = older.len();
  let total_hours: f64 = older.iter().map(|w| w.summary.completed_hours).sum();
  let avg_hours = total_hours / count as f64;
  let avg_completion: f64 =
    older.iter().map(|w| w.summary.completion_rate as f64).sum::<f64>() / count as f64;

  // Phase sequence, deduplicated consecutively
  let mut phases: Vec<&str> = Vec::new();
  for week in older {
    if phases.last() != Some(&week.phase.as_str()) {
      phases.push(&week.phase);
    }
  }

  // Issues appearing in at least two of the older weeks
  let mut issue_counts: HashMap<&str, usize> = HashMap::new();
  for week in older {
    for issue in &week.summary.feedback.physical_issues {
      *issue_counts.entry(issue.as_str()).or_insert(0) += 1;
    }
  }
  let mut recurring: Vec<&str> = issue_counts
    .iter()
    .filter(|(_, &n)| n >= RECURRING_ISSUE_MIN)
    .map(|(&issue, _)| issue)
    .collect();
  recurring.sort_unstable();

  let mut lines = vec![
    format!("TRAINING HISTORY (weeks 1-{}):", count),
    format!(
      "- Total: {:.1}h over {} weeks (avg {:.1}h/week)",
      total_hours, count, avg_hours
    ),
    format!("- Average completion: {:.0}%", avg_completion),
    format!("- Phases completed: {}", phases.join(" → ")),
  ];
  if !recurring.is_empty() {
    lines.push(format!(
      "- Recurring issues to monitor: {}",
      recurring.join(", ")
    ));
  }

  lines.join("\n")
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

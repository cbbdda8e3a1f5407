use chrono::{DateTime, Duration, Utc};

use crate::progress::model::{
    MasteryPoint, ProgressState, SkillEstimate, SkillTrend, UpdateEvent, TREND_WINDOW,
};

/// Delta applied when a client reports a lesson without one.
pub const DEFAULT_DELTA: f64 = 3.0;

/// Hours until the next recommended review after any update.
pub const REVIEW_INTERVAL_HOURS: i64 = 8;

fn clamp_score(value: f64) -> f64 {
    value.max(0.0).min(100.0)
}

/// Compute the next progress state for a completed lesson.
///
/// Pure: the only time input is `now`, which dates the new trend point and
/// schedules the next review. `event.timestamp` is informational.
/// A skill created by this update takes the delta's direction as its trend,
/// the same as an existing skill would.
pub fn apply_update(state: &ProgressState, event: &UpdateEvent, now: DateTime<Utc>) -> ProgressState {
    let delta = event.delta;
    let mut next = state.clone();

    next.mastery = clamp_score(state.mastery + delta);
    next.streak = state.streak.saturating_add(1);
    // Only the ceiling is enforced here; large negative deltas can push it below zero.
    next.lesson_completion_rate = (state.lesson_completion_rate + delta / 2.0).min(100.0);
    next.next_review_at = now + Duration::hours(REVIEW_INTERVAL_HOURS);

    match next.skill_mut(&event.lesson_id) {
        Some(skill) => {
            skill.level = clamp_score(skill.level + delta);
            skill.trend = SkillTrend::from_delta(delta);
        }
        None => next.skills.push(SkillEstimate {
            id: event.lesson_id.clone(),
            label: derive_label(&event.lesson_id),
            level: next.mastery,
            trend: SkillTrend::from_delta(delta),
        }),
    }

    next.mastery_trend.push(MasteryPoint::on(now, next.mastery));
    if next.mastery_trend.len() > TREND_WINDOW {
        let excess = next.mastery_trend.len() - TREND_WINDOW;
        next.mastery_trend.drain(..excess);
    }

    next
}

/// Display label for an auto-created skill: dashes become spaces and every
/// alphabetic run is title-cased ("new-topic" -> "New Topic").
pub fn derive_label(lesson_id: &str) -> String {
    let mut label = String::with_capacity(lesson_id.len());
    let mut in_word = false;

    for ch in lesson_id.chars() {
        let ch = if ch == '-' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if in_word {
                label.extend(ch.to_lowercase());
            } else {
                label.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            label.push(ch);
            in_word = false;
        }
    }

    label
}

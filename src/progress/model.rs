use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of points kept in `mastery_trend`.
pub const TREND_WINDOW: usize = 14;

/// Calendar-day format used by `MasteryPoint::date`.
pub const TREND_DATE_FORMAT: &str = "%Y-%m-%d";

/// Direction of the most recent change in a skill's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTrend {
    Up,
    Down,
    Steady,
}

impl SkillTrend {
    pub fn from_delta(delta: f64) -> Self {
        if delta >= 0.0 {
            SkillTrend::Up
        } else {
            SkillTrend::Down
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEstimate {
    pub id: String,
    pub label: String,
    pub level: f64,
    pub trend: SkillTrend,
}

impl SkillEstimate {
    fn seed(id: &str, label: &str, level: f64, trend: SkillTrend) -> Self {
        SkillEstimate {
            id: id.to_string(),
            label: label.to_string(),
            level,
            trend,
        }
    }
}

/// One day's snapshot of overall mastery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryPoint {
    pub date: String,
    pub value: f64,
}

impl MasteryPoint {
    pub fn on(day: DateTime<Utc>, value: f64) -> Self {
        MasteryPoint {
            date: day.format(TREND_DATE_FORMAT).to_string(),
            value,
        }
    }
}

/// The single persisted progress record.
///
/// Serialized camelCase on the wire and on disk. The snake_case aliases keep
/// records written by the previous deployment loadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProgressState {
    pub mastery: f64,
    pub streak: u32,
    #[serde(alias = "next_review_at", deserialize_with = "deserialize_review_time")]
    pub next_review_at: DateTime<Utc>,
    #[serde(alias = "lesson_completion_rate")]
    pub lesson_completion_rate: f64,
    pub skills: Vec<SkillEstimate>,
    #[serde(alias = "mastery_trend")]
    pub mastery_trend: Vec<MasteryPoint>,
}

impl ProgressState {
    /// Default record for a learner with no persisted history.
    ///
    /// The synthetic week of trend points ends on `now`'s calendar day.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mastery_trend = (0..7i64)
            .rev()
            .map(|idx| MasteryPoint::on(now - Duration::days(idx), (52.0 + idx as f64).max(40.0)))
            .collect();

        ProgressState {
            mastery: 62.0,
            streak: 4,
            next_review_at: now + Duration::hours(12),
            lesson_completion_rate: 78.0,
            skills: vec![
                SkillEstimate::seed("loops", "Loops", 68.0, SkillTrend::Up),
                SkillEstimate::seed("recursion", "Recursion", 54.0, SkillTrend::Steady),
                SkillEstimate::seed("structures", "Data Structures", 49.0, SkillTrend::Up),
            ],
            mastery_trend,
        }
    }

    pub fn skill(&self, id: &str) -> Option<&SkillEstimate> {
        self.skills.iter().find(|skill| skill.id == id)
    }

    pub(crate) fn skill_mut(&mut self, id: &str) -> Option<&mut SkillEstimate> {
        self.skills.iter_mut().find(|skill| skill.id == id)
    }
}

/// Accepts RFC 3339 timestamps, and offset-less ISO timestamps read as UTC.
fn deserialize_review_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// A completed-lesson event as seen by the progress service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    pub lesson_id: String,
    pub delta: f64,
    pub timestamp: DateTime<Utc>,
}

impl UpdateEvent {
    pub fn new<S: Into<String>>(lesson_id: S, delta: f64, timestamp: DateTime<Utc>) -> Self {
        UpdateEvent {
            lesson_id: lesson_id.into(),
            delta,
            timestamp,
        }
    }
}

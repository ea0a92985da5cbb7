//! Activity log entries and their daily summary

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{Validate, validate_measurement};

/// Collection holding activity documents
pub const ACTIVITIES: &str = "activities";

pub const DEFAULT_ACTIVITY_LIMIT: usize = 100;
pub const DEFAULT_SUMMARY_DAYS: i64 = 7;
pub const MAX_SUMMARY_DAYS: i64 = 366;

pub const STEPS_GOAL: i64 = 10_000;
pub const WATER_GOAL: i64 = 8;
pub const SLEEP_GOAL: f64 = 8.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Steps,
    HeartRate,
    Water,
    Sleep,
    Exercise,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Steps => "steps",
            ActivityType::HeartRate => "heart_rate",
            ActivityType::Water => "water",
            ActivityType::Sleep => "sleep",
            ActivityType::Exercise => "exercise",
        }
    }
}

/// Activity record as stored in the `activities` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "docstore::timestamp")]
    pub date: DateTime<Utc>,
    #[serde(with = "docstore::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Request body for logging an activity
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "docstore::timestamp::option")]
    pub date: Option<DateTime<Utc>>,
}

impl Validate for NewActivity {
    fn validate(&self) -> Result<(), String> {
        validate_measurement("Value", self.value)
    }
}

impl NewActivity {
    pub fn into_record(self, user_id: &str) -> ActivityRecord {
        let created_at = docstore::timestamp::now();
        ActivityRecord {
            id: super::new_id(),
            user_id: user_id.to_string(),
            kind: self.kind,
            value: self.value,
            unit: self.unit,
            description: self.description,
            date: self.date.unwrap_or(created_at),
            created_at,
        }
    }
}

/// Query string of `GET /activity`
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ActivityType>,
    pub limit: Option<usize>,
}

impl ActivityQuery {
    /// Half-open date window `[from, to)`, defaulting to the current UTC day
    pub fn window(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
        let start_of_day = start_of_day(now);
        let from = match &self.from {
            Some(raw) => parse_bound("from", raw)?,
            None => start_of_day,
        };
        let to = match &self.to {
            Some(raw) => parse_bound("to", raw)?,
            None if self.from.is_some() => from + Duration::days(1),
            None => start_of_day + Duration::days(1),
        };
        if to <= from {
            return Err("'to' must be after 'from'".to_string());
        }
        Ok((from, to))
    }

    pub fn limit(&self) -> Result<usize, String> {
        match self.limit {
            Some(0) => Err("Limit must be a positive integer".to_string()),
            Some(limit) => Ok(limit),
            None => Ok(DEFAULT_ACTIVITY_LIMIT),
        }
    }
}

fn parse_bound(name: &str, raw: &str) -> Result<DateTime<Utc>, String> {
    docstore::timestamp::parse(raw)
        .map_err(|_| format!("Invalid '{}' timestamp, expected RFC 3339", name))
}

/// Midnight UTC of the given instant's day
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Query string of `GET /activity/summary`
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub days: Option<i64>,
}

impl SummaryQuery {
    pub fn days(&self) -> Result<i64, String> {
        match self.days {
            None => Ok(DEFAULT_SUMMARY_DAYS),
            Some(days) if (1..=MAX_SUMMARY_DAYS).contains(&days) => Ok(days),
            Some(_) => Err(format!("Days must be between 1 and {}", MAX_SUMMARY_DAYS)),
        }
    }
}

/// Today's totals against goals, plus trailing-window totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub steps: i64,
    pub steps_goal: i64,
    pub heart_rate: i64,
    pub water: i64,
    pub water_goal: i64,
    pub sleep: f64,
    pub sleep_goal: f64,
    pub total_steps: i64,
    pub active_minutes: i64,
    pub calories_burned: i64,
    pub days: i64,
}

impl ActivitySummary {
    /// Aggregate records from the trailing window; `today` marks the start of
    /// the current day.
    pub fn from_records(records: &[ActivityRecord], today: DateTime<Utc>, days: i64) -> Self {
        let mut steps = 0.0;
        let mut water = 0.0;
        let mut sleep = 0.0;
        let mut heart_rates = Vec::new();
        let mut total_steps = 0.0;
        let mut active_minutes = 0.0;

        for record in records {
            let is_today = record.date >= today;
            match record.kind {
                ActivityType::Steps => {
                    total_steps += record.value;
                    if is_today {
                        steps += record.value;
                    }
                }
                ActivityType::Exercise => active_minutes += record.value,
                ActivityType::Water if is_today => water += record.value,
                ActivityType::Sleep if is_today => sleep += record.value,
                ActivityType::HeartRate if is_today => heart_rates.push(record.value),
                _ => {}
            }
        }

        let heart_rate = if heart_rates.is_empty() {
            0.0
        } else {
            heart_rates.iter().sum::<f64>() / heart_rates.len() as f64
        };

        Self {
            steps: steps.round() as i64,
            steps_goal: STEPS_GOAL,
            heart_rate: heart_rate.round() as i64,
            water: water.round() as i64,
            water_goal: WATER_GOAL,
            sleep,
            sleep_goal: SLEEP_GOAL,
            total_steps: total_steps.round() as i64,
            active_minutes: active_minutes.round() as i64,
            calories_burned: estimate_calories(total_steps, active_minutes),
            days,
        }
    }
}

/// Rough energy estimate: 0.04 kcal per step plus 5 kcal per active minute
fn estimate_calories(steps: f64, active_minutes: f64) -> i64 {
    (steps * 0.04 + active_minutes * 5.0).round() as i64
}

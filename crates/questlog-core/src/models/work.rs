use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A logged block of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: i64,
    pub work_date: NaiveDate,
    pub hours: f64,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
}

/// Body for `POST /work`. Date and start time default server-side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequest {
    pub hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
}

impl WorkRequest {
    pub fn hours(hours: f64) -> Self {
        Self {
            hours,
            date: None,
            start_time: None,
        }
    }
}

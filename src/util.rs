use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// Display pair for a leaderboard timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStamp {
    pub date: String,
    pub time: String,
}

pub fn format_date_time(ts: &NaiveDateTime) -> DateStamp {
    DateStamp {
        date: ts.format("%m/%Y").to_string(),
        time: ts.format("%H:%M").to_string(),
    }
}

/// Stored timestamps are UTC; players see their local wall clock
pub fn format_stored_timestamp(ts: &DateTime<Utc>) -> DateStamp {
    format_date_time(&ts.with_timezone(&Local).naive_local())
}

pub fn points_label(points: i64) -> String {
    if points.abs() == 1 {
        format!("{points} point")
    } else {
        format!("{points} points")
    }
}

use chrono::{Datelike, NaiveDate};

use crate::models::TimeInterval;

// day_of_week: 0 = Monday .. 6 = Sunday
#[derive(Debug, Clone)]
pub struct ScheduleTemplate {
    pub id: i64,
    pub day_of_week: u8,
    pub interval: TimeInterval,
    pub active: bool,
}

pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

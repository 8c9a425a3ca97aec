use chrono::NaiveDate;

use crate::models::TimeInterval;

// interval is None only when all_day is set.
#[derive(Debug, Clone)]
pub struct BlockedInterval {
    pub id: i64,
    pub date: NaiveDate,
    pub interval: Option<TimeInterval>,
    pub all_day: bool,
    pub reason: String,
}

impl BlockedInterval {
    pub fn blocks(&self, candidate: &TimeInterval) -> bool {
        if self.all_day {
            return true;
        }
        match &self.interval {
            Some(iv) => iv.overlaps(candidate),
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtraSlot {
    pub id: i64,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub reason: String,
}

use chrono::NaiveDate;

use crate::models::TimeInterval;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub session_type: String,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub max_participants: i64,
    pub current_participants: i64,
}

impl Session {
    pub fn is_full(&self) -> bool {
        self.current_participants >= self.max_participants
    }

    pub fn spots_left(&self) -> i64 {
        (self.max_participants - self.current_participants).max(0)
    }
}

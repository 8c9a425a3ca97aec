use chrono::NaiveDate;
use serde::Serialize;

use crate::models::TimeInterval;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityReason {
    Blocked,
    Reserved,
    WithinLeadTime,
    Ok,
}

impl AvailabilityReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityReason::Blocked => "BLOCKED",
            AvailabilityReason::Reserved => "RESERVED",
            AvailabilityReason::WithinLeadTime => "WITHIN_LEAD_TIME",
            AvailabilityReason::Ok => "OK",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AvailabilityWindow {
    pub interval: TimeInterval,
    pub available: bool,
    pub reason: AvailabilityReason,
}

impl AvailabilityWindow {
    pub fn new(interval: TimeInterval, reason: AvailabilityReason) -> Self {
        Self {
            interval,
            available: matches!(reason, AvailabilityReason::Ok),
            reason,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub windows: Vec<AvailabilityWindow>,
}

// Two reservation-blocking policies carried over from the day view and the
// slot view respectively. StrictOverlap marks only genuinely overlapping
// candidates RESERVED; AnyRowOnDate marks the whole date once any active
// reservation exists on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolverMode {
    StrictOverlap,
    AnyRowOnDate,
}

impl ResolverMode {
    pub fn parse(s: &str) -> Self {
        match s {
            "any_row_on_date" => ResolverMode::AnyRowOnDate,
            _ => ResolverMode::StrictOverlap,
        }
    }
}

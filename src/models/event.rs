use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DomainEventKind {
    ReservationConfirmed,
    ReservationCancelled,
    ReservationExpired,
}

impl DomainEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainEventKind::ReservationConfirmed => "reservation_confirmed",
            DomainEventKind::ReservationCancelled => "reservation_cancelled",
            DomainEventKind::ReservationExpired => "reservation_expired",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "reservation_cancelled" => DomainEventKind::ReservationCancelled,
            "reservation_expired" => DomainEventKind::ReservationExpired,
            _ => DomainEventKind::ReservationConfirmed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: i64,
    pub kind: DomainEventKind,
    pub reservation_id: String,
    pub date: NaiveDate,
    pub window: String,
    pub created_at: String,
}

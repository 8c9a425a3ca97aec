use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::TimeInterval;

#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: String,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub kind: ReservationKind,
    pub status: ReservationStatus,
    pub student_name: String,
    pub student_contact: Option<String>,
    pub session_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Hold,
    PendingConfirmation,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Hold => "hold",
            ReservationStatus::PendingConfirmation => "pending_confirmation",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    // Unknown strings fall back to Hold, the most conservative state for
    // conflict purposes.
    pub fn parse(s: &str) -> Self {
        match s {
            "pending_confirmation" => ReservationStatus::PendingConfirmation,
            "confirmed" => ReservationStatus::Confirmed,
            "cancelled" => ReservationStatus::Cancelled,
            _ => ReservationStatus::Hold,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationKind {
    OneToOne,
    GroupSession,
}

impl ReservationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationKind::OneToOne => "one_to_one",
            ReservationKind::GroupSession => "group_session",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "group_session" => ReservationKind::GroupSession,
            _ => ReservationKind::OneToOne,
        }
    }
}

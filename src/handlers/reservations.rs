use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppError;
use crate::models::{DomainEventKind, Reservation, ReservationKind, TimeInterval};
use crate::services::admission::{self, AdmissionConfig, AdmissionRequest};
use crate::services::events::record_event;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateReservationRequest {
    pub date: String,
    pub start: String,
    pub end: String,
    pub kind: ReservationKind,
    pub session_id: Option<String>,
    pub student_name: String,
    pub student_contact: Option<String>,
}

// POST /api/reservations
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateReservationRequest>,
) -> Response {
    let date = match NaiveDate::parse_from_str(&body.date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            return AppError::InvalidRange(format!("invalid date: {}", body.date)).into_response()
        }
    };
    let interval = match TimeInterval::parse(&body.start, &body.end) {
        Ok(interval) => interval,
        Err(e) => return e.into_response(),
    };

    let student_name = body.student_name.trim().to_string();
    if student_name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "student_name is required"})),
        )
            .into_response();
    }
    if matches!(body.kind, ReservationKind::GroupSession) && body.session_id.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "session_id is required for group session signups"})),
        )
            .into_response();
    }

    let request = AdmissionRequest {
        date,
        interval,
        kind: body.kind,
        session_id: body.session_id,
        student_name,
        student_contact: body.student_contact,
    };
    let cfg = AdmissionConfig::from_config(&state.config);
    let now = Utc::now().naive_utc();

    let admitted = {
        let mut db = state.db.lock().unwrap();
        admission::admit(&mut db, &request, &cfg, now)
    };

    match admitted {
        Ok(reservation) => {
            (StatusCode::CREATED, Json(reservation_json(&reservation))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

// POST /api/reservations/:id/confirm
pub async fn confirm_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let now = Utc::now().naive_utc();
    let (reservation, changed) = {
        let db = state.db.lock().unwrap();
        admission::confirm(&db, &id, now)?
    };

    if changed {
        record_event(&state, DomainEventKind::ReservationConfirmed, &reservation);
    }
    Ok(Json(reservation_json(&reservation)))
}

// POST /api/reservations/:id/cancel
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let now = Utc::now().naive_utc();
    let (reservation, changed) = {
        let mut db = state.db.lock().unwrap();
        admission::cancel(&mut db, &id, now)?
    };

    if changed {
        record_event(&state, DomainEventKind::ReservationCancelled, &reservation);
    }
    Ok(Json(reservation_json(&reservation)))
}

pub fn reservation_json(reservation: &Reservation) -> serde_json::Value {
    json!({
        "id": reservation.id,
        "date": reservation.date.format("%Y-%m-%d").to_string(),
        "start": reservation.interval.start.format("%H:%M").to_string(),
        "end": reservation.interval.end.format("%H:%M").to_string(),
        "kind": reservation.kind.as_str(),
        "status": reservation.status.as_str(),
        "student_name": reservation.student_name,
        "student_contact": reservation.student_contact,
        "session_id": reservation.session_id,
        "created_at": reservation.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        "expires_at": reservation
            .expires_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string()),
        "cancelled_at": reservation
            .cancelled_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string()),
    })
}

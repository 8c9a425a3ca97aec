use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{merge_intervals, DayAvailability, Session};
use crate::services::resolver::{self, SlotConfig};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration_minutes: Option<i64>,
    pub session_type_id: Option<String>,
}

// GET /api/availability
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let start = parse_date_param(query.start_date.as_deref(), "start_date")?;
    let end = parse_date_param(query.end_date.as_deref(), "end_date")?;
    let duration = query
        .duration_minutes
        .unwrap_or(state.config.slot_granularity_minutes);
    let cfg = SlotConfig::from_config(&state.config);
    let now = Utc::now().naive_utc();

    let days = {
        let db = state.db.lock().unwrap();
        match query.session_type_id.as_deref() {
            Some(filter) => {
                let session_type = if filter.is_empty() { None } else { Some(filter) };
                resolver::resolve_sessions(&db, start, end, session_type, &cfg, now)?
            }
            None => resolver::resolve(&db, start, end, duration, &cfg, now)?,
        }
    };

    Ok(Json(days_json(&days)))
}

#[derive(Deserialize)]
pub struct SessionsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

// GET /api/sessions
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = Utc::now().date_naive();
    let from = match query.from.as_deref() {
        Some(raw) => parse_date_param(Some(raw), "from")?,
        None => today,
    };
    let to = match query.to.as_deref() {
        Some(raw) => parse_date_param(Some(raw), "to")?,
        None => from + Duration::days(90),
    };
    if to < from {
        return Err(AppError::InvalidRange(format!("to {to} precedes from {from}")));
    }

    let sessions = {
        let db = state.db.lock().unwrap();
        queries::sessions_in_range(&db, from, to, None)?
    };

    Ok(Json(json!({
        "sessions": sessions.iter().map(session_json).collect::<Vec<_>>(),
    })))
}

pub fn session_json(session: &Session) -> serde_json::Value {
    json!({
        "id": session.id,
        "title": session.title,
        "session_type": session.session_type,
        "date": session.date.format("%Y-%m-%d").to_string(),
        "start": session.interval.start.format("%H:%M").to_string(),
        "end": session.interval.end.format("%H:%M").to_string(),
        "max_participants": session.max_participants,
        "current_participants": session.current_participants,
        "spots_left": session.spots_left(),
        "full": session.is_full(),
    })
}

fn parse_date_param(value: Option<&str>, name: &str) -> Result<NaiveDate, AppError> {
    let raw = value.ok_or_else(|| AppError::InvalidRange(format!("{name} is required")))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidRange(format!("invalid {name}: {raw}")))
}

fn days_json(days: &[DayAvailability]) -> serde_json::Value {
    let days: Vec<serde_json::Value> = days
        .iter()
        .map(|day| {
            let windows: Vec<serde_json::Value> = day
                .windows
                .iter()
                .map(|w| {
                    json!({
                        "start": w.interval.start.format("%H:%M").to_string(),
                        "end": w.interval.end.format("%H:%M").to_string(),
                        "available": w.available,
                        "reason": w.reason.as_str(),
                    })
                })
                .collect();

            // Contiguous open windows collapsed into display ranges.
            let open: Vec<serde_json::Value> = merge_intervals(
                day.windows
                    .iter()
                    .filter(|w| w.available)
                    .map(|w| w.interval)
                    .collect(),
            )
            .iter()
            .map(|iv| {
                json!({
                    "start": iv.start.format("%H:%M").to_string(),
                    "end": iv.end.format("%H:%M").to_string(),
                })
            })
            .collect();

            json!({
                "date": day.date.format("%Y-%m-%d").to_string(),
                "windows": windows,
                "open": open,
            })
        })
        .collect();

    json!({ "days": days })
}

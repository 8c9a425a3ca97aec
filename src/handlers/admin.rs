use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::availability::session_json;
use crate::handlers::reservations::reservation_json;
use crate::models::{DomainEventKind, Session, TimeInterval};
use crate::services::events::record_event;
use crate::services::reaper;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidRange(format!("invalid date: {raw}")))
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn resolve_range(query: &RangeQuery) -> Result<(NaiveDate, NaiveDate), AppError> {
    let today = Utc::now().date_naive();
    let from = match query.from.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today,
    };
    let to = match query.to.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => from + Duration::days(90),
    };
    if to < from {
        return Err(AppError::InvalidRange(format!("to {to} precedes from {from}")));
    }
    Ok((from, to))
}

// ── Schedule Templates ──

// GET /api/admin/templates
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let templates = {
        let db = state.db.lock().unwrap();
        queries::list_templates(&db)?
    };

    Ok(Json(json!({
        "templates": templates
            .iter()
            .map(|t| json!({
                "id": t.id,
                "day_of_week": t.day_of_week,
                "start": t.interval.start.format("%H:%M").to_string(),
                "end": t.interval.end.format("%H:%M").to_string(),
                "active": t.active,
            }))
            .collect::<Vec<_>>(),
    })))
}

#[derive(Deserialize)]
pub struct TemplateRequest {
    pub day_of_week: u8,
    pub start: String,
    pub end: String,
    pub active: Option<bool>,
}

// POST /api/admin/templates
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<TemplateRequest>,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if body.day_of_week > 6 {
        return Err(AppError::InvalidRange(
            "day_of_week must be between 0 (Monday) and 6 (Sunday)".to_string(),
        ));
    }
    let interval = TimeInterval::parse(&body.start, &body.end)?;

    let id = {
        let db = state.db.lock().unwrap();
        queries::create_template(&db, body.day_of_week, &interval, body.active.unwrap_or(true))?
    };

    Ok((StatusCode::CREATED, Json(json!({"id": id}))).into_response())
}

// PUT /api/admin/templates/:id
pub async fn update_template(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<TemplateRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if body.day_of_week > 6 {
        return Err(AppError::InvalidRange(
            "day_of_week must be between 0 (Monday) and 6 (Sunday)".to_string(),
        ));
    }
    let interval = TimeInterval::parse(&body.start, &body.end)?;

    let updated = {
        let db = state.db.lock().unwrap();
        queries::update_template(&db, id, body.day_of_week, &interval, body.active.unwrap_or(true))?
    };
    if !updated {
        return Err(AppError::NotFound(format!("template {id}")));
    }

    Ok(Json(json!({"ok": true})))
}

// DELETE /api/admin/templates/:id
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_template(&db, id)?
    };
    if !deleted {
        return Err(AppError::NotFound(format!("template {id}")));
    }

    Ok(Json(json!({"ok": true})))
}

// ── Blocked Intervals ──

// GET /api/admin/blocked
pub async fn list_blocked(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let (from, to) = resolve_range(&query)?;

    let blocked = {
        let db = state.db.lock().unwrap();
        queries::blocked_in_range(&db, from, to)?
    };

    Ok(Json(json!({
        "blocked": blocked
            .iter()
            .map(|b| json!({
                "id": b.id,
                "date": b.date.format("%Y-%m-%d").to_string(),
                "start": b.interval.map(|iv| iv.start.format("%H:%M").to_string()),
                "end": b.interval.map(|iv| iv.end.format("%H:%M").to_string()),
                "all_day": b.all_day,
                "reason": b.reason,
            }))
            .collect::<Vec<_>>(),
    })))
}

#[derive(Deserialize)]
pub struct BlockedRequest {
    pub date: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub all_day: Option<bool>,
    pub reason: Option<String>,
}

// POST /api/admin/blocked
pub async fn create_blocked(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<BlockedRequest>,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let date = parse_date(&body.date)?;
    let all_day = body.all_day.unwrap_or(false);
    let interval = if all_day {
        None
    } else {
        match (body.start.as_deref(), body.end.as_deref()) {
            (Some(start), Some(end)) => Some(TimeInterval::parse(start, end)?),
            _ => {
                return Err(AppError::InvalidInterval(
                    "start and end are required unless all_day is set".to_string(),
                ))
            }
        }
    };
    let reason = body.reason.unwrap_or_default();

    let id = {
        let db = state.db.lock().unwrap();
        queries::create_blocked(&db, date, interval.as_ref(), all_day, &reason)?
    };

    Ok((StatusCode::CREATED, Json(json!({"id": id}))).into_response())
}

// DELETE /api/admin/blocked/:id
pub async fn delete_blocked(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_blocked(&db, id)?
    };
    if !deleted {
        return Err(AppError::NotFound(format!("blocked interval {id}")));
    }

    Ok(Json(json!({"ok": true})))
}

// ── Extra Slots ──

// GET /api/admin/extra
pub async fn list_extra(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let (from, to) = resolve_range(&query)?;

    let extras = {
        let db = state.db.lock().unwrap();
        queries::extra_in_range(&db, from, to)?
    };

    Ok(Json(json!({
        "extra": extras
            .iter()
            .map(|e| json!({
                "id": e.id,
                "date": e.date.format("%Y-%m-%d").to_string(),
                "start": e.interval.start.format("%H:%M").to_string(),
                "end": e.interval.end.format("%H:%M").to_string(),
                "reason": e.reason,
            }))
            .collect::<Vec<_>>(),
    })))
}

#[derive(Deserialize)]
pub struct ExtraSlotRequest {
    pub date: String,
    pub start: String,
    pub end: String,
    pub reason: Option<String>,
}

// POST /api/admin/extra
pub async fn create_extra(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ExtraSlotRequest>,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let date = parse_date(&body.date)?;
    let interval = TimeInterval::parse(&body.start, &body.end)?;
    let reason = body.reason.unwrap_or_default();

    let id = {
        let db = state.db.lock().unwrap();
        queries::create_extra(&db, date, &interval, &reason)?
    };

    Ok((StatusCode::CREATED, Json(json!({"id": id}))).into_response())
}

// DELETE /api/admin/extra/:id
pub async fn delete_extra(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_extra(&db, id)?
    };
    if !deleted {
        return Err(AppError::NotFound(format!("extra slot {id}")));
    }

    Ok(Json(json!({"ok": true})))
}

// ── Group Sessions ──

// GET /api/admin/sessions
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let (from, to) = resolve_range(&query)?;

    let sessions = {
        let db = state.db.lock().unwrap();
        queries::sessions_in_range(&db, from, to, None)?
    };

    Ok(Json(json!({
        "sessions": sessions.iter().map(session_json).collect::<Vec<_>>(),
    })))
}

#[derive(Deserialize)]
pub struct SessionRequest {
    pub title: String,
    pub session_type: Option<String>,
    pub date: String,
    pub start: String,
    pub end: String,
    pub max_participants: i64,
}

// POST /api/admin/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SessionRequest>,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let date = parse_date(&body.date)?;
    let interval = TimeInterval::parse(&body.start, &body.end)?;
    let title = body.title.trim().to_string();
    if title.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "title is required"})),
        )
            .into_response());
    }
    if body.max_participants < 1 {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "max_participants must be at least 1"})),
        )
            .into_response());
    }

    let session = Session {
        id: Uuid::new_v4().to_string(),
        title,
        session_type: body.session_type.unwrap_or_else(|| "theory".to_string()),
        date,
        interval,
        max_participants: body.max_participants,
        current_participants: 0,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_session(&db, &session)?;
    }

    Ok((StatusCode::CREATED, Json(session_json(&session))).into_response())
}

// DELETE /api/admin/sessions/:id
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let now = Utc::now().naive_utc();

    let db = state.db.lock().unwrap();
    let active = queries::active_count_for_session(&db, &id, now)?;
    if active > 0 {
        return Ok((
            StatusCode::CONFLICT,
            Json(json!({
                "error": "session still has active signups",
                "active_signups": active,
            })),
        )
            .into_response());
    }
    if !queries::delete_session(&db, &id)? {
        return Err(AppError::NotFound(format!("session {id}")));
    }

    Ok(Json(json!({"ok": true})).into_response())
}

// ── Reservation Ledger ──

#[derive(Deserialize)]
pub struct ReservationsQuery {
    pub date: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

// GET /api/admin/reservations
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ReservationsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let date = match query.date.as_deref() {
        Some(raw) => Some(parse_date(raw)?),
        None => None,
    };
    let limit = query.limit.unwrap_or(100).clamp(1, 500);

    let reservations = {
        let db = state.db.lock().unwrap();
        queries::list_reservations(&db, date, query.status.as_deref(), limit)?
    };

    Ok(Json(json!({
        "reservations": reservations.iter().map(reservation_json).collect::<Vec<_>>(),
    })))
}

// ── Reaper ──

// POST /api/admin/reap
pub async fn trigger_reap(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let now = Utc::now().naive_utc();

    let (report, released) = {
        let mut db = state.db.lock().unwrap();
        reaper::reap(&mut db, now, state.config.cancelled_retention_minutes)?
    };

    for reservation in &released {
        record_event(&state, DomainEventKind::ReservationExpired, reservation);
    }

    Ok(Json(serde_json::to_value(report).unwrap_or_default()))
}

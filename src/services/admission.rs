use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{day_of_week, Reservation, ReservationKind, ReservationStatus, TimeInterval};

#[derive(Debug, Clone)]
pub struct AdmissionRequest {
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub kind: ReservationKind,
    pub session_id: Option<String>,
    pub student_name: String,
    pub student_contact: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct AdmissionConfig {
    pub hold_ttl_minutes: i64,
    pub pending_ttl_hours: i64,
    pub lead_time_minutes: i64,
}

impl AdmissionConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            hold_ttl_minutes: config.hold_ttl_minutes,
            pending_ttl_hours: config.pending_ttl_hours,
            lead_time_minutes: config.lead_time_minutes,
        }
    }
}

// The whole admission runs in one transaction on the serialized connection,
// so two requests for the same window cannot both pass the overlap re-check.
// Early returns drop the transaction and roll back.
pub fn admit(
    conn: &mut Connection,
    req: &AdmissionRequest,
    cfg: &AdmissionConfig,
    now: NaiveDateTime,
) -> Result<Reservation, AppError> {
    if req.date.and_time(req.interval.start) <= now {
        return Err(AppError::InvalidRange(
            "requested window has already started".to_string(),
        ));
    }

    let tx = conn.transaction()?;

    for blocked in queries::blocked_for(&tx, req.date)? {
        if blocked.blocks(&req.interval) {
            let window = match blocked.interval {
                Some(iv) => iv.to_string(),
                None => "all day".to_string(),
            };
            return Err(AppError::Conflict { window });
        }
    }

    let session = match req.kind {
        ReservationKind::OneToOne => {
            let covered = queries::templates_for_day(&tx, day_of_week(req.date))?
                .iter()
                .any(|t| t.interval.covers(&req.interval))
                || queries::extra_for(&tx, req.date)?
                    .iter()
                    .any(|e| e.interval.covers(&req.interval));
            if !covered {
                return Err(AppError::Conflict {
                    window: req.interval.to_string(),
                });
            }
            None
        }
        ReservationKind::GroupSession => {
            let session_id = req
                .session_id
                .clone()
                .ok_or_else(|| AppError::NotFound("session".to_string()))?;

            // Expired holds pinned in the counter would otherwise eat spots.
            queries::purge_expired_session_holds(&tx, &session_id, now)?;

            let session = queries::get_session(&tx, &session_id)?
                .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))?;
            if session.date != req.date || session.interval != req.interval {
                return Err(AppError::InvalidInterval(
                    "window does not match the session window".to_string(),
                ));
            }
            Some(session)
        }
    };

    // Re-check under the transaction. Rows of the same session are siblings,
    // not conflicts; capacity decides those.
    let sibling_session = session.as_ref().map(|s| s.id.clone());
    for existing in queries::active_reservations_for(&tx, req.date, now)? {
        if sibling_session.is_some() && existing.session_id == sibling_session {
            continue;
        }
        if existing.interval.overlaps(&req.interval) {
            return Err(AppError::Conflict {
                window: existing.interval.to_string(),
            });
        }
    }

    if let Some(session) = &session {
        if session.is_full() {
            return Err(AppError::CapacityExceeded);
        }
        queries::increment_participants(&tx, &session.id)?;
    }

    let lead_horizon = now + Duration::minutes(cfg.lead_time_minutes);
    let (status, expires_at) = if req.date.and_time(req.interval.start) <= lead_horizon {
        // Too close to automate: staff confirm these, so they get a long
        // fuse instead of the short hold TTL.
        (
            ReservationStatus::PendingConfirmation,
            now + Duration::hours(cfg.pending_ttl_hours),
        )
    } else {
        (
            ReservationStatus::Hold,
            now + Duration::minutes(cfg.hold_ttl_minutes),
        )
    };

    let reservation = Reservation {
        id: Uuid::new_v4().to_string(),
        date: req.date,
        interval: req.interval,
        kind: req.kind,
        status,
        student_name: req.student_name.clone(),
        student_contact: req.student_contact.clone(),
        session_id: session.map(|s| s.id),
        created_at: now,
        expires_at: Some(expires_at),
        cancelled_at: None,
    };
    queries::insert_reservation(&tx, &reservation)?;
    tx.commit()?;

    Ok(reservation)
}

// The bool is true only when a state transition actually happened;
// idempotent repeats return false.
pub fn confirm(
    conn: &Connection,
    id: &str,
    now: NaiveDateTime,
) -> Result<(Reservation, bool), AppError> {
    let reservation = queries::get_reservation(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("reservation {id}")))?;

    match reservation.status {
        ReservationStatus::Confirmed => return Ok((reservation, false)),
        ReservationStatus::Cancelled => {
            return Err(AppError::Conflict {
                window: reservation.interval.to_string(),
            })
        }
        ReservationStatus::Hold => {
            // An expired hold may already have been re-admitted to someone
            // else, so it cannot be revived.
            if reservation.expires_at.map_or(false, |e| e <= now) {
                return Err(AppError::Conflict {
                    window: reservation.interval.to_string(),
                });
            }
        }
        ReservationStatus::PendingConfirmation => {}
    }

    queries::mark_confirmed(conn, id)?;
    Ok((
        Reservation {
            status: ReservationStatus::Confirmed,
            expires_at: None,
            ..reservation
        },
        true,
    ))
}

pub fn cancel(
    conn: &mut Connection,
    id: &str,
    now: NaiveDateTime,
) -> Result<(Reservation, bool), AppError> {
    let tx = conn.transaction()?;

    let reservation = queries::get_reservation(&tx, id)?
        .ok_or_else(|| AppError::NotFound(format!("reservation {id}")))?;

    if matches!(reservation.status, ReservationStatus::Cancelled) {
        return Ok((reservation, false));
    }

    queries::mark_cancelled(&tx, id, now)?;
    if matches!(reservation.kind, ReservationKind::GroupSession) {
        if let Some(session_id) = &reservation.session_id {
            queries::decrement_participants(&tx, session_id)?;
        }
    }
    tx.commit()?;

    Ok((
        Reservation {
            status: ReservationStatus::Cancelled,
            cancelled_at: Some(now),
            ..reservation
        },
        true,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use chrono::NaiveTime;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn iv(start: &str, end: &str) -> TimeInterval {
        TimeInterval::new(t(start), t(end)).unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn cfg() -> AdmissionConfig {
        AdmissionConfig {
            hold_ttl_minutes: 15,
            pending_ttl_hours: 48,
            lead_time_minutes: 180,
        }
    }

    fn conn() -> Connection {
        crate::db::init_db(":memory:").unwrap()
    }

    fn request(date: &str, start: &str, end: &str) -> AdmissionRequest {
        AdmissionRequest {
            date: d(date),
            interval: iv(start, end),
            kind: ReservationKind::OneToOne,
            session_id: None,
            student_name: "Ada".to_string(),
            student_contact: None,
        }
    }

    fn group_request(date: &str, start: &str, end: &str, session_id: &str) -> AdmissionRequest {
        AdmissionRequest {
            kind: ReservationKind::GroupSession,
            session_id: Some(session_id.to_string()),
            ..request(date, start, end)
        }
    }

    fn session(id: &str, date: &str, start: &str, end: &str, max: i64, current: i64) -> Session {
        Session {
            id: id.to_string(),
            title: "Traffic theory".to_string(),
            session_type: "theory".to_string(),
            date: d(date),
            interval: iv(start, end),
            max_participants: max,
            current_participants: current,
        }
    }

    // 2025-07-02 is a Wednesday.
    const WED: &str = "2025-07-02";
    const NOW: &str = "2025-06-01 12:00:00";

    fn wednesday_template(conn: &Connection) {
        queries::create_template(conn, 2, &iv("08:00", "20:00"), true).unwrap();
    }

    #[test]
    fn hold_gets_ttl_and_blocks_overlap_but_not_touching() {
        let mut conn = conn();
        wednesday_template(&conn);
        let now = dt(NOW);

        let first = admit(&mut conn, &request(WED, "09:00", "09:45"), &cfg(), now).unwrap();
        assert_eq!(first.status, ReservationStatus::Hold);
        assert_eq!(first.expires_at, Some(dt("2025-06-01 12:15:00")));

        let err = admit(&mut conn, &request(WED, "09:30", "10:15"), &cfg(), now).unwrap_err();
        match err {
            AppError::Conflict { window } => assert_eq!(window, "09:00-09:45"),
            other => panic!("expected conflict, got {other:?}"),
        }

        // Half-open windows: 09:45 start touches but does not overlap.
        let touching = admit(&mut conn, &request(WED, "09:45", "10:30"), &cfg(), now).unwrap();
        assert_eq!(touching.status, ReservationStatus::Hold);
    }

    #[test]
    fn expired_hold_does_not_block_readmission_of_the_same_window() {
        let mut conn = conn();
        wednesday_template(&conn);

        let stale = Reservation {
            id: "stale".to_string(),
            date: d(WED),
            interval: iv("09:00", "09:45"),
            kind: ReservationKind::OneToOne,
            status: ReservationStatus::Hold,
            student_name: "Bea".to_string(),
            student_contact: None,
            session_id: None,
            created_at: dt("2025-06-01 10:00:00"),
            expires_at: Some(dt("2025-06-01 11:00:00")),
            cancelled_at: None,
        };
        queries::insert_reservation(&conn, &stale).unwrap();

        let fresh = admit(&mut conn, &request(WED, "09:00", "09:45"), &cfg(), dt(NOW)).unwrap();
        assert_eq!(fresh.interval, iv("09:00", "09:45"));
        // Both rows exist until the reaper runs.
        assert!(queries::get_reservation(&conn, "stale").unwrap().is_some());
    }

    #[test]
    fn group_session_fills_to_capacity_and_frees_on_cancel() {
        let mut conn = conn();
        queries::create_session(&conn, &session("s1", WED, "18:00", "19:30", 2, 0)).unwrap();
        let now = dt(NOW);

        let a = admit(&mut conn, &group_request(WED, "18:00", "19:30", "s1"), &cfg(), now).unwrap();
        let b = admit(&mut conn, &group_request(WED, "18:00", "19:30", "s1"), &cfg(), now).unwrap();
        assert_eq!(a.kind, ReservationKind::GroupSession);
        assert_eq!(b.session_id.as_deref(), Some("s1"));
        assert_eq!(
            queries::get_session(&conn, "s1").unwrap().unwrap().current_participants,
            2
        );

        let err = admit(&mut conn, &group_request(WED, "18:00", "19:30", "s1"), &cfg(), now)
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded));

        cancel(&mut conn, &b.id, now).unwrap();
        assert_eq!(
            queries::get_session(&conn, "s1").unwrap().unwrap().current_participants,
            1
        );
        admit(&mut conn, &group_request(WED, "18:00", "19:30", "s1"), &cfg(), now).unwrap();
    }

    #[test]
    fn group_signup_blocks_overlapping_one_to_one() {
        let mut conn = conn();
        wednesday_template(&conn);
        queries::create_session(&conn, &session("s1", WED, "18:00", "19:30", 12, 0)).unwrap();
        let now = dt(NOW);

        admit(&mut conn, &group_request(WED, "18:00", "19:30", "s1"), &cfg(), now).unwrap();

        let err = admit(&mut conn, &request(WED, "18:30", "19:00"), &cfg(), now).unwrap_err();
        match err {
            AppError::Conflict { window } => assert_eq!(window, "18:00-19:30"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn one_to_one_blocks_overlapping_group_signup() {
        let mut conn = conn();
        wednesday_template(&conn);
        queries::create_session(&conn, &session("s1", WED, "18:00", "19:30", 12, 0)).unwrap();
        let now = dt(NOW);

        admit(&mut conn, &request(WED, "18:30", "19:00"), &cfg(), now).unwrap();

        let err = admit(&mut conn, &group_request(WED, "18:00", "19:30", "s1"), &cfg(), now)
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[test]
    fn expired_group_hold_is_purged_before_the_capacity_check() {
        let mut conn = conn();
        queries::create_session(&conn, &session("s1", WED, "18:00", "19:30", 1, 1)).unwrap();

        let stale = Reservation {
            id: "stale".to_string(),
            date: d(WED),
            interval: iv("18:00", "19:30"),
            kind: ReservationKind::GroupSession,
            status: ReservationStatus::Hold,
            student_name: "Bea".to_string(),
            student_contact: None,
            session_id: Some("s1".to_string()),
            created_at: dt("2025-06-01 10:00:00"),
            expires_at: Some(dt("2025-06-01 11:00:00")),
            cancelled_at: None,
        };
        queries::insert_reservation(&conn, &stale).unwrap();

        admit(&mut conn, &group_request(WED, "18:00", "19:30", "s1"), &cfg(), dt(NOW)).unwrap();
        let after = queries::get_session(&conn, "s1").unwrap().unwrap();
        assert_eq!(after.current_participants, 1);
        assert!(queries::get_reservation(&conn, "stale").unwrap().is_none());
    }

    #[test]
    fn window_inside_lead_time_becomes_pending_confirmation() {
        let mut conn = conn();
        wednesday_template(&conn);

        let now = dt("2025-07-02 07:00:00");
        let r = admit(&mut conn, &request(WED, "09:00", "09:45"), &cfg(), now).unwrap();
        assert_eq!(r.status, ReservationStatus::PendingConfirmation);
        assert_eq!(r.expires_at, Some(dt("2025-07-04 07:00:00")));
    }

    #[test]
    fn window_already_started_is_rejected() {
        let mut conn = conn();
        wednesday_template(&conn);

        let err = admit(
            &mut conn,
            &request(WED, "09:00", "09:45"),
            &cfg(),
            dt("2025-07-02 10:00:00"),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidRange(_)));
    }

    #[test]
    fn window_outside_any_scheduled_window_is_rejected() {
        let mut conn = conn();
        wednesday_template(&conn);
        let now = dt(NOW);

        // Sunday has no template.
        let err = admit(&mut conn, &request("2025-07-06", "09:00", "09:45"), &cfg(), now)
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));

        // Before opening on a templated day.
        let err = admit(&mut conn, &request(WED, "07:00", "07:30"), &cfg(), now).unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[test]
    fn extra_slot_provides_coverage_outside_the_template() {
        let mut conn = conn();
        queries::create_extra(&conn, d("2025-07-06"), &iv("10:00", "12:00"), "exam day").unwrap();

        let r = admit(&mut conn, &request("2025-07-06", "10:00", "10:45"), &cfg(), dt(NOW)).unwrap();
        assert_eq!(r.status, ReservationStatus::Hold);
    }

    #[test]
    fn blocked_interval_rejects_admission() {
        let mut conn = conn();
        wednesday_template(&conn);
        queries::create_blocked(&conn, d(WED), Some(&iv("09:00", "10:00")), false, "exam").unwrap();
        let now = dt(NOW);

        let err = admit(&mut conn, &request(WED, "09:30", "10:15"), &cfg(), now).unwrap_err();
        match err {
            AppError::Conflict { window } => assert_eq!(window, "09:00-10:00"),
            other => panic!("expected conflict, got {other:?}"),
        }

        // Touching the block is fine.
        admit(&mut conn, &request(WED, "10:00", "10:45"), &cfg(), now).unwrap();
    }

    #[test]
    fn all_day_block_rejects_everything() {
        let mut conn = conn();
        wednesday_template(&conn);
        queries::create_blocked(&conn, d(WED), None, true, "holiday").unwrap();

        let err = admit(&mut conn, &request(WED, "09:00", "09:45"), &cfg(), dt(NOW)).unwrap_err();
        match err {
            AppError::Conflict { window } => assert_eq!(window, "all day"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn confirm_upgrades_hold_and_is_idempotent() {
        let mut conn = conn();
        wednesday_template(&conn);
        let now = dt(NOW);

        let r = admit(&mut conn, &request(WED, "09:00", "09:45"), &cfg(), now).unwrap();
        let (confirmed, changed) = confirm(&conn, &r.id, now).unwrap();
        assert_eq!(confirmed.status, ReservationStatus::Confirmed);
        assert_eq!(confirmed.expires_at, None);
        assert!(changed);

        let (again, changed) = confirm(&conn, &r.id, now).unwrap();
        assert_eq!(again.status, ReservationStatus::Confirmed);
        assert!(!changed);

        let stored = queries::get_reservation(&conn, &r.id).unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Confirmed);
        assert_eq!(stored.expires_at, None);
    }

    #[test]
    fn confirm_rejects_expired_and_cancelled_reservations() {
        let mut conn = conn();
        wednesday_template(&conn);
        let now = dt(NOW);

        let r = admit(&mut conn, &request(WED, "09:00", "09:45"), &cfg(), now).unwrap();
        let err = confirm(&conn, &r.id, dt("2025-06-01 12:30:00")).unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));

        let r2 = admit(&mut conn, &request(WED, "11:00", "11:45"), &cfg(), now).unwrap();
        cancel(&mut conn, &r2.id, now).unwrap();
        let err = confirm(&conn, &r2.id, now).unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));

        let err = confirm(&conn, "missing", now).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn cancel_is_idempotent_and_frees_the_window() {
        let mut conn = conn();
        wednesday_template(&conn);
        let now = dt(NOW);

        let r = admit(&mut conn, &request(WED, "09:00", "09:45"), &cfg(), now).unwrap();
        let (cancelled, changed) = cancel(&mut conn, &r.id, now).unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert_eq!(cancelled.cancelled_at, Some(now));
        assert!(changed);

        let (again, changed) = cancel(&mut conn, &r.id, now).unwrap();
        assert_eq!(again.status, ReservationStatus::Cancelled);
        assert!(!changed);

        // The window opens up immediately.
        admit(&mut conn, &request(WED, "09:00", "09:45"), &cfg(), now).unwrap();

        let err = cancel(&mut conn, "missing", now).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn group_admission_validates_session_and_window() {
        let mut conn = conn();
        queries::create_session(&conn, &session("s1", WED, "18:00", "19:30", 12, 0)).unwrap();
        let now = dt(NOW);

        let err = admit(&mut conn, &group_request(WED, "18:00", "19:00", "s1"), &cfg(), now)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInterval(_)));

        let err = admit(&mut conn, &group_request(WED, "18:00", "19:30", "nope"), &cfg(), now)
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

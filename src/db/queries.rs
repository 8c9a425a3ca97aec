use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    BlockedInterval, DomainEvent, DomainEventKind, ExtraSlot, Reservation, ReservationKind,
    ReservationStatus, ScheduleTemplate, Session, TimeInterval,
};

// ── Schedule Templates ──

pub fn create_template(
    conn: &Connection,
    day_of_week: u8,
    interval: &TimeInterval,
    active: bool,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO schedule_templates (day_of_week, start_time, end_time, active)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            day_of_week as i64,
            fmt_time(interval.start),
            fmt_time(interval.end),
            active as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_templates(conn: &Connection) -> anyhow::Result<Vec<ScheduleTemplate>> {
    let mut stmt = conn.prepare(
        "SELECT id, day_of_week, start_time, end_time, active
         FROM schedule_templates ORDER BY day_of_week ASC, start_time ASC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_template_row(row)))?;

    let mut templates = vec![];
    for row in rows {
        templates.push(row??);
    }
    Ok(templates)
}

pub fn active_templates(conn: &Connection) -> anyhow::Result<Vec<ScheduleTemplate>> {
    let mut stmt = conn.prepare(
        "SELECT id, day_of_week, start_time, end_time, active
         FROM schedule_templates WHERE active = 1 ORDER BY day_of_week ASC, start_time ASC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_template_row(row)))?;

    let mut templates = vec![];
    for row in rows {
        templates.push(row??);
    }
    Ok(templates)
}

pub fn templates_for_day(conn: &Connection, day_of_week: u8) -> anyhow::Result<Vec<ScheduleTemplate>> {
    let mut stmt = conn.prepare(
        "SELECT id, day_of_week, start_time, end_time, active
         FROM schedule_templates WHERE day_of_week = ?1 AND active = 1 ORDER BY start_time ASC",
    )?;
    let rows = stmt.query_map(params![day_of_week as i64], |row| Ok(parse_template_row(row)))?;

    let mut templates = vec![];
    for row in rows {
        templates.push(row??);
    }
    Ok(templates)
}

pub fn update_template(
    conn: &Connection,
    id: i64,
    day_of_week: u8,
    interval: &TimeInterval,
    active: bool,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE schedule_templates SET day_of_week = ?1, start_time = ?2, end_time = ?3, active = ?4
         WHERE id = ?5",
        params![
            day_of_week as i64,
            fmt_time(interval.start),
            fmt_time(interval.end),
            active as i64,
            id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_template(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM schedule_templates WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_template_row(row: &rusqlite::Row) -> anyhow::Result<ScheduleTemplate> {
    let id: i64 = row.get(0)?;
    let day_of_week: i64 = row.get(1)?;
    let start_str: String = row.get(2)?;
    let end_str: String = row.get(3)?;
    let active: bool = row.get::<_, i64>(4)? != 0;

    Ok(ScheduleTemplate {
        id,
        day_of_week: day_of_week as u8,
        interval: parse_interval(&start_str, &end_str)?,
        active,
    })
}

// ── Blocked Intervals ──

pub fn create_blocked(
    conn: &Connection,
    date: NaiveDate,
    interval: Option<&TimeInterval>,
    all_day: bool,
    reason: &str,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO blocked_intervals (date, start_time, end_time, all_day, reason)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            fmt_date(date),
            interval.map(|iv| fmt_time(iv.start)),
            interval.map(|iv| fmt_time(iv.end)),
            all_day as i64,
            reason,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn blocked_for(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<BlockedInterval>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, start_time, end_time, all_day, reason
         FROM blocked_intervals WHERE date = ?1 ORDER BY start_time ASC",
    )?;
    let rows = stmt.query_map(params![fmt_date(date)], |row| Ok(parse_blocked_row(row)))?;

    let mut blocked = vec![];
    for row in rows {
        blocked.push(row??);
    }
    Ok(blocked)
}

pub fn blocked_in_range(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<BlockedInterval>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, start_time, end_time, all_day, reason
         FROM blocked_intervals WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, start_time ASC",
    )?;
    let rows = stmt.query_map(params![fmt_date(start), fmt_date(end)], |row| {
        Ok(parse_blocked_row(row))
    })?;

    let mut blocked = vec![];
    for row in rows {
        blocked.push(row??);
    }
    Ok(blocked)
}

pub fn delete_blocked(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM blocked_intervals WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_blocked_row(row: &rusqlite::Row) -> anyhow::Result<BlockedInterval> {
    let id: i64 = row.get(0)?;
    let date_str: String = row.get(1)?;
    let start_str: Option<String> = row.get(2)?;
    let end_str: Option<String> = row.get(3)?;
    let all_day: bool = row.get::<_, i64>(4)? != 0;
    let reason: String = row.get(5)?;

    let interval = if all_day {
        None
    } else {
        match (start_str, end_str) {
            (Some(s), Some(e)) => Some(parse_interval(&s, &e)?),
            _ => anyhow::bail!("blocked interval {id} has no times and is not all-day"),
        }
    };

    Ok(BlockedInterval {
        id,
        date: parse_date(&date_str),
        interval,
        all_day,
        reason,
    })
}

// ── Extra Slots ──

pub fn create_extra(
    conn: &Connection,
    date: NaiveDate,
    interval: &TimeInterval,
    reason: &str,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO extra_slots (date, start_time, end_time, reason) VALUES (?1, ?2, ?3, ?4)",
        params![
            fmt_date(date),
            fmt_time(interval.start),
            fmt_time(interval.end),
            reason,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn extra_for(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<ExtraSlot>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, start_time, end_time, reason
         FROM extra_slots WHERE date = ?1 ORDER BY start_time ASC",
    )?;
    let rows = stmt.query_map(params![fmt_date(date)], |row| Ok(parse_extra_row(row)))?;

    let mut extras = vec![];
    for row in rows {
        extras.push(row??);
    }
    Ok(extras)
}

pub fn extra_in_range(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<ExtraSlot>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, start_time, end_time, reason
         FROM extra_slots WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, start_time ASC",
    )?;
    let rows = stmt.query_map(params![fmt_date(start), fmt_date(end)], |row| {
        Ok(parse_extra_row(row))
    })?;

    let mut extras = vec![];
    for row in rows {
        extras.push(row??);
    }
    Ok(extras)
}

pub fn delete_extra(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM extra_slots WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_extra_row(row: &rusqlite::Row) -> anyhow::Result<ExtraSlot> {
    let id: i64 = row.get(0)?;
    let date_str: String = row.get(1)?;
    let start_str: String = row.get(2)?;
    let end_str: String = row.get(3)?;
    let reason: String = row.get(4)?;

    Ok(ExtraSlot {
        id,
        date: parse_date(&date_str),
        interval: parse_interval(&start_str, &end_str)?,
        reason,
    })
}

// ── Sessions ──

pub fn create_session(conn: &Connection, session: &Session) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO sessions (id, title, session_type, date, start_time, end_time, max_participants, current_participants)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            session.id,
            session.title,
            session.session_type,
            fmt_date(session.date),
            fmt_time(session.interval.start),
            fmt_time(session.interval.end),
            session.max_participants,
            session.current_participants,
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, id: &str) -> anyhow::Result<Option<Session>> {
    let result = conn.query_row(
        "SELECT id, title, session_type, date, start_time, end_time, max_participants, current_participants
         FROM sessions WHERE id = ?1",
        params![id],
        |row| Ok(parse_session_row(row)),
    );

    match result {
        Ok(session) => Ok(Some(session?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn sessions_in_range(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
    session_type: Option<&str>,
) -> anyhow::Result<Vec<Session>> {
    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match session_type {
        Some(t) => (
            "SELECT id, title, session_type, date, start_time, end_time, max_participants, current_participants
             FROM sessions WHERE date >= ?1 AND date <= ?2 AND session_type = ?3
             ORDER BY date ASC, start_time ASC"
                .to_string(),
            vec![
                Box::new(fmt_date(start)) as Box<dyn rusqlite::types::ToSql>,
                Box::new(fmt_date(end)),
                Box::new(t.to_string()),
            ],
        ),
        None => (
            "SELECT id, title, session_type, date, start_time, end_time, max_participants, current_participants
             FROM sessions WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, start_time ASC"
                .to_string(),
            vec![
                Box::new(fmt_date(start)) as Box<dyn rusqlite::types::ToSql>,
                Box::new(fmt_date(end)),
            ],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_session_row(row)))?;

    let mut sessions = vec![];
    for row in rows {
        sessions.push(row??);
    }
    Ok(sessions)
}

pub fn delete_session(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn increment_participants(conn: &Connection, id: &str) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE sessions SET current_participants = current_participants + 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(())
}

// Floored at zero, the counter must never go negative.
pub fn decrement_participants(conn: &Connection, id: &str) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE sessions SET current_participants = MAX(current_participants - 1, 0) WHERE id = ?1",
        params![id],
    )?;
    Ok(())
}

pub fn active_count_for_session(
    conn: &Connection,
    id: &str,
    now: NaiveDateTime,
) -> anyhow::Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reservations
         WHERE session_id = ?1 AND status != 'cancelled'
           AND NOT (status = 'hold' AND expires_at IS NOT NULL AND expires_at <= ?2)",
        params![id, fmt_datetime(now)],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn reconcile_session_counters(
    conn: &Connection,
    now: NaiveDateTime,
) -> anyhow::Result<Vec<(String, i64, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.current_participants,
                (SELECT COUNT(*) FROM reservations r
                  WHERE r.session_id = s.id AND r.status != 'cancelled'
                    AND NOT (r.status = 'hold' AND r.expires_at IS NOT NULL AND r.expires_at <= ?1))
         FROM sessions s",
    )?;
    let rows = stmt.query_map(params![fmt_datetime(now)], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut drift = vec![];
    for row in rows {
        let (id, stored, actual) = row?;
        if stored != actual {
            drift.push((id, stored, actual));
        }
    }

    for (id, _, actual) in &drift {
        conn.execute(
            "UPDATE sessions SET current_participants = ?2 WHERE id = ?1",
            params![id, actual],
        )?;
    }
    Ok(drift)
}

fn parse_session_row(row: &rusqlite::Row) -> anyhow::Result<Session> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let session_type: String = row.get(2)?;
    let date_str: String = row.get(3)?;
    let start_str: String = row.get(4)?;
    let end_str: String = row.get(5)?;
    let max_participants: i64 = row.get(6)?;
    let current_participants: i64 = row.get(7)?;

    Ok(Session {
        id,
        title,
        session_type,
        date: parse_date(&date_str),
        interval: parse_interval(&start_str, &end_str)?,
        max_participants,
        current_participants,
    })
}

// ── Reservations ──

const RESERVATION_COLS: &str = "id, date, start_time, end_time, kind, status, student_name, student_contact, session_id, created_at, expires_at, cancelled_at";

pub fn insert_reservation(conn: &Connection, r: &Reservation) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO reservations (id, date, start_time, end_time, kind, status, student_name, student_contact, session_id, created_at, expires_at, cancelled_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            r.id,
            fmt_date(r.date),
            fmt_time(r.interval.start),
            fmt_time(r.interval.end),
            r.kind.as_str(),
            r.status.as_str(),
            r.student_name,
            r.student_contact,
            r.session_id,
            fmt_datetime(r.created_at),
            r.expires_at.map(fmt_datetime),
            r.cancelled_at.map(fmt_datetime),
        ],
    )?;
    Ok(())
}

pub fn get_reservation(conn: &Connection, id: &str) -> anyhow::Result<Option<Reservation>> {
    let result = conn.query_row(
        &format!("SELECT {RESERVATION_COLS} FROM reservations WHERE id = ?1"),
        params![id],
        |row| Ok(parse_reservation_row(row)),
    );

    match result {
        Ok(r) => Ok(Some(r?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// Lazily drops expired holds: a hold past its expiry must stop blocking even
// before the reaper physically removes it.
pub fn active_reservations_for(
    conn: &Connection,
    date: NaiveDate,
    now: NaiveDateTime,
) -> anyhow::Result<Vec<Reservation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESERVATION_COLS} FROM reservations
         WHERE date = ?1 AND status != 'cancelled'
           AND NOT (status = 'hold' AND expires_at IS NOT NULL AND expires_at <= ?2)
         ORDER BY start_time ASC"
    ))?;
    let rows = stmt.query_map(params![fmt_date(date), fmt_datetime(now)], |row| {
        Ok(parse_reservation_row(row))
    })?;

    let mut reservations = vec![];
    for row in rows {
        reservations.push(row??);
    }
    Ok(reservations)
}

pub fn active_in_range(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
    now: NaiveDateTime,
) -> anyhow::Result<Vec<Reservation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESERVATION_COLS} FROM reservations
         WHERE date >= ?1 AND date <= ?2 AND status != 'cancelled'
           AND NOT (status = 'hold' AND expires_at IS NOT NULL AND expires_at <= ?3)
         ORDER BY date ASC, start_time ASC"
    ))?;
    let rows = stmt.query_map(
        params![fmt_date(start), fmt_date(end), fmt_datetime(now)],
        |row| Ok(parse_reservation_row(row)),
    )?;

    let mut reservations = vec![];
    for row in rows {
        reservations.push(row??);
    }
    Ok(reservations)
}

pub fn list_reservations(
    conn: &Connection,
    date: Option<NaiveDate>,
    status: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Reservation>> {
    let mut sql = format!("SELECT {RESERVATION_COLS} FROM reservations");
    let mut clauses: Vec<&str> = vec![];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(d) = date {
        clauses.push("date = ?");
        params_vec.push(Box::new(fmt_date(d)));
    }
    if let Some(s) = status {
        clauses.push("status = ?");
        params_vec.push(Box::new(s.to_string()));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY date DESC, start_time DESC LIMIT ?");
    params_vec.push(Box::new(limit));

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_reservation_row(row)))?;

    let mut reservations = vec![];
    for row in rows {
        reservations.push(row??);
    }
    Ok(reservations)
}

pub fn mark_confirmed(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE reservations SET status = 'confirmed', expires_at = NULL WHERE id = ?1",
        params![id],
    )?;
    Ok(count > 0)
}

pub fn mark_cancelled(conn: &Connection, id: &str, now: NaiveDateTime) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE reservations SET status = 'cancelled', cancelled_at = ?2 WHERE id = ?1",
        params![id, fmt_datetime(now)],
    )?;
    Ok(count > 0)
}

pub fn expired_holds(conn: &Connection, now: NaiveDateTime) -> anyhow::Result<Vec<Reservation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESERVATION_COLS} FROM reservations
         WHERE status = 'hold' AND expires_at IS NOT NULL AND expires_at <= ?1
         ORDER BY expires_at ASC"
    ))?;
    let rows = stmt.query_map(params![fmt_datetime(now)], |row| {
        Ok(parse_reservation_row(row))
    })?;

    let mut reservations = vec![];
    for row in rows {
        reservations.push(row??);
    }
    Ok(reservations)
}

pub fn stale_cancelled(
    conn: &Connection,
    cutoff: NaiveDateTime,
) -> anyhow::Result<Vec<Reservation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESERVATION_COLS} FROM reservations
         WHERE status = 'cancelled' AND cancelled_at IS NOT NULL AND cancelled_at <= ?1
         ORDER BY cancelled_at ASC"
    ))?;
    let rows = stmt.query_map(params![fmt_datetime(cutoff)], |row| {
        Ok(parse_reservation_row(row))
    })?;

    let mut reservations = vec![];
    for row in rows {
        reservations.push(row??);
    }
    Ok(reservations)
}

pub fn delete_reservation(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM reservations WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

// Expired group holds still pinned in the counter are released in bulk so a
// fresh admission never counts them against capacity.
pub fn purge_expired_session_holds(
    conn: &Connection,
    session_id: &str,
    now: NaiveDateTime,
) -> anyhow::Result<i64> {
    let released = conn.execute(
        "DELETE FROM reservations
         WHERE session_id = ?1 AND status = 'hold' AND expires_at IS NOT NULL AND expires_at <= ?2",
        params![session_id, fmt_datetime(now)],
    )? as i64;

    if released > 0 {
        conn.execute(
            "UPDATE sessions SET current_participants = MAX(current_participants - ?2, 0) WHERE id = ?1",
            params![session_id, released],
        )?;
    }
    Ok(released)
}

fn parse_reservation_row(row: &rusqlite::Row) -> anyhow::Result<Reservation> {
    let id: String = row.get(0)?;
    let date_str: String = row.get(1)?;
    let start_str: String = row.get(2)?;
    let end_str: String = row.get(3)?;
    let kind_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let student_name: String = row.get(6)?;
    let student_contact: Option<String> = row.get(7)?;
    let session_id: Option<String> = row.get(8)?;
    let created_at_str: String = row.get(9)?;
    let expires_at_str: Option<String> = row.get(10)?;
    let cancelled_at_str: Option<String> = row.get(11)?;

    Ok(Reservation {
        id,
        date: parse_date(&date_str),
        interval: parse_interval(&start_str, &end_str)?,
        kind: ReservationKind::parse(&kind_str),
        status: ReservationStatus::parse(&status_str),
        student_name,
        student_contact,
        session_id,
        created_at: parse_datetime(&created_at_str),
        expires_at: expires_at_str.as_deref().map(parse_datetime),
        cancelled_at: cancelled_at_str.as_deref().map(parse_datetime),
    })
}

// ── Domain Events ──

pub fn insert_event(
    conn: &Connection,
    kind: &str,
    reservation_id: &str,
    date: NaiveDate,
    window: &str,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO events (kind, reservation_id, date, window) VALUES (?1, ?2, ?3, ?4)",
        params![kind, reservation_id, fmt_date(date), window],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn events_since(conn: &Connection, since_id: i64) -> anyhow::Result<Vec<DomainEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, reservation_id, date, window, created_at
         FROM events WHERE id > ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![since_id], |row| {
        let kind_str: String = row.get(1)?;
        let date_str: String = row.get(3)?;
        Ok(DomainEvent {
            id: row.get(0)?,
            kind: DomainEventKind::parse(&kind_str),
            reservation_id: row.get(2)?,
            date: parse_date(&date_str),
            window: row.get(4)?,
            created_at: row.get(5)?,
        })
    })?;

    let mut events = vec![];
    for row in rows {
        events.push(row?);
    }
    Ok(events)
}

// ── Parse / format helpers ──

fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn fmt_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

fn fmt_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap_or_else(|_| Utc::now().naive_utc())
}

fn parse_interval(start: &str, end: &str) -> anyhow::Result<TimeInterval> {
    let start = NaiveTime::parse_from_str(start, "%H:%M")
        .map_err(|_| anyhow::anyhow!("invalid stored time: {start}"))?;
    let end = NaiveTime::parse_from_str(end, "%H:%M")
        .map_err(|_| anyhow::anyhow!("invalid stored time: {end}"))?;
    Ok(TimeInterval::new(start, end)?)
}

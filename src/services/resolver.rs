use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    day_of_week, AvailabilityReason, AvailabilityWindow, BlockedInterval, DayAvailability,
    Reservation, ResolverMode, Session, TimeInterval,
};

#[derive(Debug, Clone, Copy)]
pub struct SlotConfig {
    pub granularity_minutes: i64,
    pub lead_time_minutes: i64,
    pub mode: ResolverMode,
}

impl SlotConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            granularity_minutes: config.slot_granularity_minutes,
            lead_time_minutes: config.lead_time_minutes,
            mode: ResolverMode::parse(&config.resolver_mode),
        }
    }
}

// Candidate windows for every date in the range, classified in precedence
// order: blocked beats reserved beats lead time. Duplicate candidates from
// overlapping sources are kept, each classified on its own.
pub fn resolve(
    conn: &Connection,
    start_date: NaiveDate,
    end_date: NaiveDate,
    duration_minutes: i64,
    cfg: &SlotConfig,
    now: NaiveDateTime,
) -> Result<Vec<DayAvailability>, AppError> {
    if end_date < start_date {
        return Err(AppError::InvalidRange(format!(
            "end date {end_date} precedes start date {start_date}"
        )));
    }
    if duration_minutes <= 0 {
        return Err(AppError::InvalidInterval(
            "duration must be a positive number of minutes".to_string(),
        ));
    }

    let mut templates_by_day: HashMap<u8, Vec<TimeInterval>> = HashMap::new();
    for template in queries::active_templates(conn)? {
        templates_by_day
            .entry(template.day_of_week)
            .or_default()
            .push(template.interval);
    }

    let mut blocked_by_date: HashMap<NaiveDate, Vec<BlockedInterval>> = HashMap::new();
    for blocked in queries::blocked_in_range(conn, start_date, end_date)? {
        blocked_by_date.entry(blocked.date).or_default().push(blocked);
    }

    let mut extras_by_date: HashMap<NaiveDate, Vec<TimeInterval>> = HashMap::new();
    for extra in queries::extra_in_range(conn, start_date, end_date)? {
        extras_by_date.entry(extra.date).or_default().push(extra.interval);
    }

    let mut reserved_by_date: HashMap<NaiveDate, Vec<Reservation>> = HashMap::new();
    for reservation in queries::active_in_range(conn, start_date, end_date, now)? {
        reserved_by_date
            .entry(reservation.date)
            .or_default()
            .push(reservation);
    }

    let lead_horizon = now + Duration::minutes(cfg.lead_time_minutes);
    let step = cfg.granularity_minutes.max(1);

    let mut days = vec![];
    for date in start_date.iter_days() {
        if date > end_date {
            break;
        }

        let mut source_windows: Vec<TimeInterval> = templates_by_day
            .get(&day_of_week(date))
            .cloned()
            .unwrap_or_default();
        if let Some(extras) = extras_by_date.get(&date) {
            source_windows.extend(extras.iter().copied());
        }

        let mut candidates: Vec<TimeInterval> = vec![];
        for window in &source_windows {
            candidates.extend(slice_window(*window, duration_minutes, step));
        }
        // Stable sort keeps duplicate candidates next to each other.
        candidates.sort_by_key(|c| c.start);

        let blocked = blocked_by_date.get(&date);
        let reserved = reserved_by_date.get(&date);

        let mut windows = vec![];
        for candidate in candidates {
            let reason = if blocked.map_or(false, |bs| bs.iter().any(|b| b.blocks(&candidate))) {
                AvailabilityReason::Blocked
            } else if reserved.map_or(false, |rs| match cfg.mode {
                ResolverMode::StrictOverlap => rs.iter().any(|r| r.interval.overlaps(&candidate)),
                ResolverMode::AnyRowOnDate => !rs.is_empty(),
            }) {
                AvailabilityReason::Reserved
            } else if date.and_time(candidate.start) <= lead_horizon {
                AvailabilityReason::WithinLeadTime
            } else {
                AvailabilityReason::Ok
            };
            windows.push(AvailabilityWindow::new(candidate, reason));
        }

        days.push(DayAvailability { date, windows });
    }
    Ok(days)
}

// Group sessions are fixed windows, one candidate per session. Capacity takes
// the place of the overlap check.
pub fn resolve_sessions(
    conn: &Connection,
    start_date: NaiveDate,
    end_date: NaiveDate,
    session_type: Option<&str>,
    cfg: &SlotConfig,
    now: NaiveDateTime,
) -> Result<Vec<DayAvailability>, AppError> {
    if end_date < start_date {
        return Err(AppError::InvalidRange(format!(
            "end date {end_date} precedes start date {start_date}"
        )));
    }

    let mut sessions_by_date: HashMap<NaiveDate, Vec<Session>> = HashMap::new();
    for session in queries::sessions_in_range(conn, start_date, end_date, session_type)? {
        sessions_by_date.entry(session.date).or_default().push(session);
    }

    let mut blocked_by_date: HashMap<NaiveDate, Vec<BlockedInterval>> = HashMap::new();
    for blocked in queries::blocked_in_range(conn, start_date, end_date)? {
        blocked_by_date.entry(blocked.date).or_default().push(blocked);
    }

    let lead_horizon = now + Duration::minutes(cfg.lead_time_minutes);

    let mut days = vec![];
    for date in start_date.iter_days() {
        if date > end_date {
            break;
        }

        let mut windows = vec![];
        if let Some(sessions) = sessions_by_date.get(&date) {
            for session in sessions {
                let blocked = blocked_by_date
                    .get(&date)
                    .map_or(false, |bs| bs.iter().any(|b| b.blocks(&session.interval)));
                let reason = if blocked {
                    AvailabilityReason::Blocked
                } else if session.is_full() {
                    AvailabilityReason::Reserved
                } else if date.and_time(session.interval.start) <= lead_horizon {
                    AvailabilityReason::WithinLeadTime
                } else {
                    AvailabilityReason::Ok
                };
                windows.push(AvailabilityWindow::new(session.interval, reason));
            }
        }
        days.push(DayAvailability { date, windows });
    }
    Ok(days)
}

pub fn slice_window(
    window: TimeInterval,
    duration_minutes: i64,
    step_minutes: i64,
) -> Vec<TimeInterval> {
    let duration = Duration::minutes(duration_minutes);
    let step = Duration::minutes(step_minutes);

    let mut slots = vec![];
    let mut start = window.start;
    loop {
        let (end, wrapped) = start.overflowing_add_signed(duration);
        if wrapped != 0 || end <= start || end > window.end {
            break;
        }
        slots.push(TimeInterval { start, end });

        let (next, wrapped) = start.overflowing_add_signed(step);
        if wrapped != 0 || next <= start {
            break;
        }
        start = next;
    }
    slots
}

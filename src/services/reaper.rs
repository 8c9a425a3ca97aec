use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{DomainEventKind, Reservation, ReservationKind};
use crate::services::events;
use crate::state::AppState;

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ReapReport {
    pub released_one_to_one: i64,
    pub released_group_slots: i64,
    pub purged_cancelled: i64,
}

impl ReapReport {
    pub fn total_released(&self) -> i64 {
        self.released_one_to_one + self.released_group_slots
    }
}

// Physically removes what the lazy filters already treat as gone, so the
// pass is idempotent: a second run over the same state removes nothing.
// Cancelled rows are kept for a short retention window before purging.
pub fn reap(
    conn: &mut Connection,
    now: NaiveDateTime,
    retention_minutes: i64,
) -> Result<(ReapReport, Vec<Reservation>), AppError> {
    let tx = conn.transaction()?;

    let mut report = ReapReport::default();
    let released = queries::expired_holds(&tx, now)?;
    for reservation in &released {
        queries::delete_reservation(&tx, &reservation.id)?;
        match reservation.kind {
            ReservationKind::OneToOne => report.released_one_to_one += 1,
            ReservationKind::GroupSession => {
                report.released_group_slots += 1;
                if let Some(session_id) = &reservation.session_id {
                    queries::decrement_participants(&tx, session_id)?;
                }
            }
        }
    }

    // Cancel already released any group slot, so purging is a plain delete.
    let cutoff = now - Duration::minutes(retention_minutes);
    for stale in queries::stale_cancelled(&tx, cutoff)? {
        queries::delete_reservation(&tx, &stale.id)?;
        report.purged_cancelled += 1;
    }

    tx.commit()?;
    Ok((report, released))
}

pub async fn run(state: Arc<AppState>) {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
        state.config.reaper_interval_secs.max(1),
    ));
    loop {
        ticker.tick().await;
        tick(&state);
    }
}

fn tick(state: &Arc<AppState>) {
    let now = Utc::now().naive_utc();

    let outcome = {
        let mut db = state.db.lock().unwrap();
        reap(&mut db, now, state.config.cancelled_retention_minutes)
    };

    match outcome {
        Ok((report, released)) => {
            tracing::debug!(?report, "reaper pass finished");
            if report.total_released() > 0 || report.purged_cancelled > 0 {
                tracing::info!(
                    released_one_to_one = report.released_one_to_one,
                    released_group_slots = report.released_group_slots,
                    purged_cancelled = report.purged_cancelled,
                    "reaped expired reservations"
                );
            }
            for reservation in &released {
                events::record_event(state, DomainEventKind::ReservationExpired, reservation);
            }
        }
        Err(e) => tracing::error!(error = %e, "reaper pass failed"),
    }

    let drift = {
        let db = state.db.lock().unwrap();
        queries::reconcile_session_counters(&db, now)
    };
    match drift {
        Ok(corrections) => {
            for (session_id, stored, actual) in corrections {
                tracing::warn!(
                    session = %session_id,
                    stored,
                    actual,
                    "corrected participant counter drift"
                );
            }
        }
        Err(e) => tracing::error!(error = %e, "session counter reconciliation failed"),
    }
}

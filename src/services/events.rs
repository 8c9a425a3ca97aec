use std::sync::Arc;

use chrono::Utc;

use crate::db::queries;
use crate::models::{DomainEvent, DomainEventKind, Reservation};
use crate::state::AppState;

// Persists the event, then fans it out to live subscribers. Nobody listening
// is not an error.
pub fn record_event(state: &Arc<AppState>, kind: DomainEventKind, reservation: &Reservation) {
    let window = reservation.interval.to_string();
    let inserted = {
        let db = state.db.lock().unwrap();
        queries::insert_event(&db, kind.as_str(), &reservation.id, reservation.date, &window)
    };

    match inserted {
        Ok(id) => {
            let event = DomainEvent {
                id,
                kind,
                reservation_id: reservation.id.clone(),
                date: reservation.date,
                window,
                created_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            };
            let _ = state.events_tx.send(event);
        }
        Err(e) => tracing::error!(error = %e, "failed to record domain event"),
    }
}

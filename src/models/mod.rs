pub mod availability;
pub mod event;
pub mod exception;
pub mod interval;
pub mod reservation;
pub mod schedule;
pub mod session;

pub use availability::{AvailabilityReason, AvailabilityWindow, DayAvailability, ResolverMode};
pub use event::{DomainEvent, DomainEventKind};
pub use exception::{BlockedInterval, ExtraSlot};
pub use interval::{merge_intervals, TimeInterval};
pub use reservation::{Reservation, ReservationKind, ReservationStatus};
pub use schedule::{day_of_week, ScheduleTemplate};
pub use session::Session;

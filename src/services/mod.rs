pub mod admission;
pub mod events;
pub mod reaper;
pub mod resolver;

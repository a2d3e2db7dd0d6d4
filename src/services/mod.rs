pub mod google_calendar;
pub mod sync;
pub mod youtube;

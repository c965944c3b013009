pub mod slots;
pub mod timezone;

pub use slots::{fallback_slots, SlotConfig, TimeSlot, TimeSlotAnalysis, TimeSlotAnalyzer};
pub use timezone::{TimezoneAdjuster, ZonedTime};

//! Database model definitions

mod blocked_entry;
mod booking;
mod customer;
mod event;
mod peak_hour_rule;
mod turf;

pub use blocked_entry::*;
pub use booking::*;
pub use customer::*;
pub use event::*;
pub use peak_hour_rule::*;
pub use turf::*;

//! Request and response shapes for the HTTP surface

pub mod availability;
pub mod blocking;
pub mod booking;
pub mod event;
pub mod peak_hour_rule;
pub mod turf;

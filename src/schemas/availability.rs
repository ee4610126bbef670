use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::slots::Slot;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
	pub date: NaiveDate,
	/// The caller's wall clock; only consulted when `date` is today
	pub now:  Option<NaiveTime>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
	pub start:      NaiveTime,
	pub is_booked:  bool,
	pub is_blocked: bool,
	pub price:      i32,
}

impl From<Slot> for SlotResponse {
	fn from(value: Slot) -> Self {
		Self {
			start:      value.start,
			is_booked:  value.is_booked,
			is_blocked: value.is_blocked,
			price:      value.price,
		}
	}
}

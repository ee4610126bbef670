//! Availability computation
//!
//! Walks a turf's operating window in slot-sized increments and flags
//! each candidate against bookings, blocked entries, and events. Pure
//! over already-loaded rows: the controllers read without locks, accept
//! transient staleness, and rely on the admission protocol to
//! re-validate anything that matters.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::interval::{minutes_of, overlaps, time_of};
use crate::models::{BlockedEntry, Booking, Event, PeakHourRule, Turf};
use crate::pricing;

/// One increment-sized candidate interval of the operating window
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
	pub start:      NaiveTime,
	pub is_booked:  bool,
	pub is_blocked: bool,
	pub price:      i32,
}

/// Compute the slot list for a turf on a date
///
/// `now_if_today` carries the caller's clock when the date is the
/// current one; slots at or before it are suppressed entirely (a slot
/// that has started is never offered, even mid-play). Booked and
/// blocked candidates stay in the list with their flags set so the
/// caller can render them disabled.
#[must_use]
pub fn compute_slots(
	turf: &Turf,
	date: NaiveDate,
	now_if_today: Option<NaiveTime>,
	bookings: &[Booking],
	entries: &[BlockedEntry],
	events: &[Event],
	rules: &[PeakHourRule],
	now: NaiveDateTime,
) -> Vec<Slot> {
	let opening = minutes_of(turf.opening_time);
	let closing = minutes_of(turf.closing_time);

	let mut slots = Vec::new();

	let mut start_minutes = opening;
	while start_minutes + turf.slot_minutes <= closing {
		let start = time_of(start_minutes);
		let end = time_of(start_minutes + turf.slot_minutes);
		start_minutes += turf.slot_minutes;

		if let Some(clock) = now_if_today
			&& start <= clock
		{
			continue;
		}

		let is_booked = bookings.iter().any(|booking| {
			booking.occupies(now)
				&& overlaps(start, end, booking.start_time, booking.end_time)
		});

		let is_blocked = entries
			.iter()
			.any(|entry| entry.blocks(start, end, turf.slot_minutes))
			|| events.iter().any(|event| event.occupies(date, start, end));

		let price = pricing::slot_price(turf, rules, date, start);

		slots.push(Slot { start, is_booked, is_blocked, price });
	}

	slots
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::{
		BookingStatus,
		PaymentMethod,
		TimeRange,
		TimeRangeList,
	};

	fn t(h: u32, m: u32) -> NaiveTime {
		NaiveTime::from_hms_opt(h, m, 0).unwrap()
	}

	fn date() -> NaiveDate {
		NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
	}

	fn turf() -> Turf {
		Turf {
			id: 1,
			name: "center pitch".to_string(),
			description: None,
			opening_time: t(6, 0),
			closing_time: t(22, 0),
			slot_minutes: 60,
			min_slots: 1,
			max_slots: 4,
			base_price: 1000,
			weekday_pricing: false,
			weekday_morning_start: None,
			weekday_morning_price: None,
			weekday_evening_start: None,
			weekday_evening_price: None,
			weekend_pricing: false,
			weekend_morning_start: None,
			weekend_morning_price: None,
			weekend_evening_start: None,
			weekend_evening_price: None,
			is_active: true,
			disabled_reason: None,
			created_at: NaiveDateTime::default(),
			updated_at: NaiveDateTime::default(),
		}
	}

	fn held_booking(
		start: NaiveTime,
		end: NaiveTime,
		expires: NaiveDateTime,
	) -> Booking {
		Booking {
			id: 1,
			turf_id: 1,
			customer_id: 1,
			date: date(),
			start_time: start,
			end_time: end,
			duration_slots: 1,
			total_price: 1000,
			status: BookingStatus::Held,
			payment_method: PaymentMethod::Online,
			hold_expires_at: Some(expires),
			created_at: NaiveDateTime::default(),
			updated_at: NaiveDateTime::default(),
		}
	}

	fn blocked_range(start: NaiveTime, end: NaiveTime) -> BlockedEntry {
		BlockedEntry {
			id: 1,
			turf_id: 1,
			start_date: date(),
			end_date: None,
			blocked_times: None,
			blocked_ranges: Some(TimeRangeList(vec![TimeRange { start, end }])),
			reason: None,
			created_by: 1,
			created_at: NaiveDateTime::default(),
			updated_at: NaiveDateTime::default(),
		}
	}

	fn at(h: u32, m: u32) -> NaiveDateTime {
		date().and_time(t(h, m))
	}

	#[test]
	fn walks_the_whole_operating_window() {
		let slots =
			compute_slots(&turf(), date(), None, &[], &[], &[], &[], at(0, 0));

		// 06:00 through 21:00 inclusive
		assert_eq!(slots.len(), 16);
		assert_eq!(slots.first().unwrap().start, t(6, 0));
		assert_eq!(slots.last().unwrap().start, t(21, 0));
		assert!(slots.iter().all(|s| !s.is_booked && !s.is_blocked));
		assert!(slots.iter().all(|s| s.price == 1000));
	}

	#[test]
	fn blocked_range_flags_exactly_its_slots() {
		// The example scenario: block 18:00-20:00, everything else open
		let entries = vec![blocked_range(t(18, 0), t(20, 0))];

		let slots = compute_slots(
			&turf(),
			date(),
			None,
			&[],
			&entries,
			&[],
			&[],
			at(0, 0),
		);

		for slot in &slots {
			let expected = slot.start == t(18, 0) || slot.start == t(19, 0);

			assert_eq!(slot.is_blocked, expected, "slot {}", slot.start);
		}
	}

	#[test]
	fn whole_day_block_beats_everything() {
		let whole_day = BlockedEntry {
			blocked_ranges: None,
			..blocked_range(t(0, 0), t(1, 0))
		};

		let slots = compute_slots(
			&turf(),
			date(),
			None,
			&[],
			&[whole_day],
			&[],
			&[],
			at(0, 0),
		);

		assert!(slots.iter().all(|s| s.is_blocked));
	}

	#[test]
	fn past_slots_are_suppressed_today() {
		let slots = compute_slots(
			&turf(),
			date(),
			Some(t(10, 0)),
			&[],
			&[],
			&[],
			&[],
			at(10, 0),
		);

		// 10:00 itself is suppressed: it has already started
		assert_eq!(slots.first().unwrap().start, t(11, 0));
		assert!(slots.iter().all(|s| s.start > t(10, 0)));
	}

	#[test]
	fn unexpired_hold_books_its_slot() {
		let bookings = vec![held_booking(t(10, 0), t(11, 0), at(10, 5))];

		let slots = compute_slots(
			&turf(),
			date(),
			None,
			&bookings,
			&[],
			&[],
			&[],
			at(10, 0),
		);

		let booked: Vec<_> =
			slots.iter().filter(|s| s.is_booked).map(|s| s.start).collect();

		assert_eq!(booked, vec![t(10, 0)]);
	}

	#[test]
	fn expired_hold_releases_its_slot() {
		let bookings = vec![held_booking(t(10, 0), t(11, 0), at(9, 55))];

		let slots = compute_slots(
			&turf(),
			date(),
			None,
			&bookings,
			&[],
			&[],
			&[],
			at(10, 0),
		);

		assert!(slots.iter().all(|s| !s.is_booked));
	}

	#[test]
	fn booked_and_blocked_slots_stay_in_the_list() {
		let bookings = vec![held_booking(t(10, 0), t(11, 0), at(23, 59))];
		let entries = vec![blocked_range(t(18, 0), t(20, 0))];

		let slots = compute_slots(
			&turf(),
			date(),
			None,
			&bookings,
			&entries,
			&[],
			&[],
			at(0, 0),
		);

		// Flagged, never removed
		assert_eq!(slots.len(), 16);
	}
}

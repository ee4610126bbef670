//! Clock-time arithmetic shared by the slot, blocking, and pricing code
//!
//! All times are wall-clock times of a single operating day; the system
//! runs in one timezone and never converts.

use chrono::{NaiveTime, Timelike};

/// Minute-of-day offset of a clock time, ignoring seconds.
#[must_use]
pub fn minutes_of(time: NaiveTime) -> i32 {
	(time.hour() * 60 + time.minute()) as i32
}

/// Clock time at a minute-of-day offset.
///
/// # Panics
/// Panics if `minutes` falls outside a single day. Callers only ever
/// derive offsets from validated clock times, so an out-of-range offset
/// is a contract violation rather than a recoverable error.
#[must_use]
pub fn time_of(minutes: i32) -> NaiveTime {
	assert!(
		(0..24 * 60).contains(&minutes),
		"minute offset {minutes} outside a single day"
	);

	NaiveTime::from_hms_opt(minutes as u32 / 60, minutes as u32 % 60, 0)
		.unwrap()
}

/// Shift a clock time by a number of minutes within the same day.
///
/// # Panics
/// Panics if the result leaves the day, see [`time_of`].
#[must_use]
pub fn add_minutes(time: NaiveTime, minutes: i32) -> NaiveTime {
	time_of(minutes_of(time) + minutes)
}

/// Half-open interval overlap: `[a_start, a_end)` meets `[b_start, b_end)`.
///
/// Every overlap decision in the crate funnels through this predicate so
/// the boundary semantics cannot drift between components.
#[must_use]
pub fn overlaps(
	a_start: NaiveTime,
	a_end: NaiveTime,
	b_start: NaiveTime,
	b_end: NaiveTime,
) -> bool {
	a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
	use super::*;

	fn t(h: u32, m: u32) -> NaiveTime {
		NaiveTime::from_hms_opt(h, m, 0).unwrap()
	}

	#[test]
	fn minute_offsets_round_trip() {
		assert_eq!(minutes_of(t(6, 0)), 360);
		assert_eq!(minutes_of(t(21, 30)), 1290);
		assert_eq!(time_of(360), t(6, 0));
		assert_eq!(time_of(1290), t(21, 30));
	}

	#[test]
	fn seconds_are_ignored() {
		let with_seconds = NaiveTime::from_hms_opt(9, 15, 42).unwrap();

		assert_eq!(minutes_of(with_seconds), 9 * 60 + 15);
	}

	#[test]
	fn add_minutes_steps_forward() {
		assert_eq!(add_minutes(t(6, 0), 60), t(7, 0));
		assert_eq!(add_minutes(t(21, 0), 30), t(21, 30));
	}

	#[test]
	#[should_panic(expected = "outside a single day")]
	fn add_minutes_past_midnight_is_a_contract_violation() {
		add_minutes(t(23, 30), 60);
	}

	#[test]
	fn half_open_overlap() {
		// Touching endpoints do not overlap
		assert!(!overlaps(t(10, 0), t(11, 0), t(11, 0), t(12, 0)));
		assert!(!overlaps(t(11, 0), t(12, 0), t(10, 0), t(11, 0)));

		// Partial and full containment do
		assert!(overlaps(t(10, 0), t(12, 0), t(11, 0), t(13, 0)));
		assert!(overlaps(t(10, 0), t(13, 0), t(11, 0), t(12, 0)));
		assert!(overlaps(t(11, 0), t(12, 0), t(10, 0), t(13, 0)));
	}
}

//! Slot price resolution
//!
//! Resolution order, most specific first: a rule pinned to the exact
//! date, then a rule recurring on the date's weekday, then the standing
//! weekend/weekday morning-evening bands, then the turf base price.
//! Ad-hoc rules always beat standing bands; bands always beat the flat
//! rate.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::interval::add_minutes;
use crate::models::{PeakHourRule, PeakRuleKind, PriceBands, Turf};

fn is_weekend(date: NaiveDate) -> bool {
	matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn band_price(bands: &PriceBands, slot_start: NaiveTime, base: i32) -> i32 {
	if let (Some(start), Some(price)) =
		(bands.evening_start, bands.evening_price)
		&& slot_start >= start
	{
		return price;
	}

	if let (Some(start), Some(price)) =
		(bands.morning_start, bands.morning_price)
		&& slot_start >= start
	{
		return price;
	}

	base
}

fn rule_price(
	rules: &[PeakHourRule],
	kind: PeakRuleKind,
	date: NaiveDate,
	slot_start: NaiveTime,
) -> Option<i32> {
	rules
		.iter()
		.find(|rule| {
			rule.kind == kind
				&& rule.applies_on(date)
				&& rule.contains(slot_start)
		})
		.map(|rule| rule.price)
}

/// Resolve the price of the single slot starting at `slot_start`
#[must_use]
pub fn slot_price(
	turf: &Turf,
	rules: &[PeakHourRule],
	date: NaiveDate,
	slot_start: NaiveTime,
) -> i32 {
	if let Some(price) =
		rule_price(rules, PeakRuleKind::DateSpecific, date, slot_start)
	{
		return price;
	}

	if let Some(price) =
		rule_price(rules, PeakRuleKind::Weekly, date, slot_start)
	{
		return price;
	}

	if is_weekend(date) {
		if let Some(bands) = turf.weekend_bands() {
			return band_price(&bands, slot_start, turf.base_price);
		}
	} else if let Some(bands) = turf.weekday_bands() {
		return band_price(&bands, slot_start, turf.base_price);
	}

	turf.base_price
}

/// Total price of a multi-slot booking
///
/// Each constituent slot resolves independently and the results are
/// summed, because a booking may straddle a peak-hour boundary.
#[must_use]
pub fn total_price(
	turf: &Turf,
	rules: &[PeakHourRule],
	date: NaiveDate,
	start: NaiveTime,
	slots: i32,
) -> i32 {
	(0..slots)
		.map(|i| {
			let slot_start = add_minutes(start, i * turf.slot_minutes);

			slot_price(turf, rules, date, slot_start)
		})
		.sum()
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDateTime;

	use super::*;

	fn t(h: u32, m: u32) -> NaiveTime {
		NaiveTime::from_hms_opt(h, m, 0).unwrap()
	}

	fn base_turf() -> Turf {
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

	fn weekend_banded_turf() -> Turf {
		Turf {
			weekend_pricing: true,
			weekend_morning_start: Some(t(6, 0)),
			weekend_morning_price: Some(1200),
			weekend_evening_start: Some(t(17, 0)),
			weekend_evening_price: Some(1800),
			..base_turf()
		}
	}

	fn date_rule(date: NaiveDate, price: i32) -> PeakHourRule {
		PeakHourRule {
			id:         1,
			turf_id:    1,
			kind:       PeakRuleKind::DateSpecific,
			weekdays:   None,
			date:       Some(date),
			start_time: t(17, 0),
			end_time:   t(22, 0),
			price,
			created_at: NaiveDateTime::default(),
		}
	}

	fn weekly_rule(days: &[&str], price: i32) -> PeakHourRule {
		PeakHourRule {
			id:         2,
			turf_id:    1,
			kind:       PeakRuleKind::Weekly,
			weekdays:   Some(days.iter().map(ToString::to_string).collect()),
			date:       None,
			start_time: t(17, 0),
			end_time:   t(22, 0),
			price,
			created_at: NaiveDateTime::default(),
		}
	}

	#[test]
	fn base_price_when_nothing_else_applies() {
		// A Monday, no bands, no rules
		let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

		assert_eq!(slot_price(&base_turf(), &[], monday, t(10, 0)), 1000);
	}

	#[test]
	fn date_rule_beats_weekly_rule_and_weekend_band() {
		// 2024-06-01 is a Saturday covered by all three layers at 18:00
		let saturday = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let turf = weekend_banded_turf();
		let rules =
			vec![date_rule(saturday, 2500), weekly_rule(&["saturday"], 2000)];

		assert_eq!(slot_price(&turf, &rules, saturday, t(18, 0)), 2500);
	}

	#[test]
	fn weekly_rule_beats_bands() {
		let saturday = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let turf = weekend_banded_turf();
		let rules = vec![weekly_rule(&["saturday"], 2000)];

		assert_eq!(slot_price(&turf, &rules, saturday, t(18, 0)), 2000);
	}

	#[test]
	fn weekend_bands_pick_evening_then_morning() {
		let saturday = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let turf = weekend_banded_turf();

		assert_eq!(slot_price(&turf, &[], saturday, t(18, 0)), 1800);
		assert_eq!(slot_price(&turf, &[], saturday, t(10, 0)), 1200);
	}

	#[test]
	fn weekend_bands_do_not_apply_on_weekdays() {
		let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
		let turf = weekend_banded_turf();

		assert_eq!(slot_price(&turf, &[], monday, t(18, 0)), 1000);
	}

	#[test]
	fn multi_slot_total_straddles_a_peak_boundary() {
		// 16:00 costs base, 17:00 falls inside the weekly peak window
		let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
		let turf = base_turf();
		let rules = vec![weekly_rule(&["monday"], 2000)];

		let total = total_price(&turf, &rules, monday, t(16, 0), 2);

		assert_eq!(total, 1000 + 2000);
	}
}

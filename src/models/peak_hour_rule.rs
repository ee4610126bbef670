use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

use crate::interval::overlaps;
use crate::schema::peak_hour_rule;
use crate::{DbConn, Error};

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::PeakRuleKind"]
#[serde(rename_all = "camelCase")]
pub enum PeakRuleKind {
	/// Recurs on a set of weekdays
	#[default]
	Weekly,
	/// Pinned to one calendar date
	DateSpecific,
}

/// A price override for a turf, keyed by weekday-set or specific date
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = peak_hour_rule)]
#[serde(rename_all = "camelCase")]
pub struct PeakHourRule {
	pub id:         i32,
	pub turf_id:    i32,
	pub kind:       PeakRuleKind,
	pub weekdays:   Option<Vec<String>>,
	pub date:       Option<NaiveDate>,
	pub start_time: NaiveTime,
	pub end_time:   NaiveTime,
	pub price:      i32,
	pub created_at: NaiveDateTime,
}

impl PeakHourRule {
	/// Whether this rule applies on the given calendar date
	#[must_use]
	pub fn applies_on(&self, date: NaiveDate) -> bool {
		match self.kind {
			PeakRuleKind::DateSpecific => self.date == Some(date),
			PeakRuleKind::Weekly => {
				self.weekdays.as_ref().is_some_and(|days| {
					days.iter().any(|name| {
						name.parse::<Weekday>()
							.is_ok_and(|day| day == date.weekday())
					})
				})
			},
		}
	}

	/// Whether `[start_time, end_time)` contains the slot start
	#[must_use]
	pub fn contains(&self, slot_start: NaiveTime) -> bool {
		self.start_time <= slot_start && slot_start < self.end_time
	}

	/// Whether two rules of the same turf and kind collide
	///
	/// The admin write path rejects collisions so the resolver can treat
	/// stored rules as unambiguous.
	#[must_use]
	pub fn conflicts_with(&self, other: &Self) -> bool {
		if self.kind != other.kind {
			return false;
		}

		let same_days = match self.kind {
			PeakRuleKind::DateSpecific => self.date == other.date,
			PeakRuleKind::Weekly => {
				match (&self.weekdays, &other.weekdays) {
					(Some(a), Some(b)) => a.iter().any(|day| b.contains(day)),
					_ => false,
				}
			},
		};

		same_days
			&& overlaps(
				self.start_time,
				self.end_time,
				other.start_time,
				other.end_time,
			)
	}

	/// Get all [`PeakHourRule`]s for a turf
	#[instrument(skip(conn))]
	pub async fn for_turf(t_id: i32, conn: &DbConn) -> Result<Vec<Self>, Error> {
		let rules = conn
			.interact(move |conn| Self::for_turf_sync(t_id, conn))
			.await??;

		Ok(rules)
	}

	/// Transaction-scoped variant of [`PeakHourRule::for_turf`]
	pub(crate) fn for_turf_sync(
		t_id: i32,
		conn: &mut PgConnection,
	) -> Result<Vec<Self>, Error> {
		use crate::schema::peak_hour_rule::dsl::*;

		let rules = peak_hour_rule
			.filter(turf_id.eq(t_id))
			.select(Self::as_select())
			.load(conn)?;

		Ok(rules)
	}

	/// Delete a [`PeakHourRule`] by its id
	#[instrument(skip(conn))]
	pub async fn delete_by_id(r_id: i32, conn: &DbConn) -> Result<(), Error> {
		conn.interact(move |conn| {
			use crate::schema::peak_hour_rule::dsl::*;

			diesel::delete(peak_hour_rule.find(r_id)).execute(conn)
		})
		.await??;

		info!("deleted peak hour rule {r_id}");

		Ok(())
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = peak_hour_rule)]
pub struct NewPeakHourRule {
	pub turf_id:    i32,
	pub kind:       PeakRuleKind,
	pub weekdays:   Option<Vec<String>>,
	pub date:       Option<NaiveDate>,
	pub start_time: NaiveTime,
	pub end_time:   NaiveTime,
	pub price:      i32,
}

impl NewPeakHourRule {
	fn as_rule(&self) -> PeakHourRule {
		PeakHourRule {
			id:         0,
			turf_id:    self.turf_id,
			kind:       self.kind,
			weekdays:   self.weekdays.clone(),
			date:       self.date,
			start_time: self.start_time,
			end_time:   self.end_time,
			price:      self.price,
			created_at: NaiveDateTime::default(),
		}
	}

	/// Insert this [`NewPeakHourRule`], rejecting colliding rules
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<PeakHourRule, Error> {
		let rule = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let candidate = self.as_rule();
					let existing =
						PeakHourRule::for_turf_sync(self.turf_id, conn)?;

					if let Some(clash) = existing
						.iter()
						.find(|rule| rule.conflicts_with(&candidate))
					{
						return Err(Error::Duplicate(format!(
							"overlaps peak hour rule {}",
							clash.id
						)));
					}

					use crate::schema::peak_hour_rule::dsl::*;

					let inserted = diesel::insert_into(peak_hour_rule)
						.values(self)
						.returning(PeakHourRule::as_returning())
						.get_result(conn)?;

					Ok(inserted)
				})
			})
			.await??;

		info!("created peak hour rule {} for turf {}", rule.id, rule.turf_id);

		Ok(rule)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn t(h: u32, m: u32) -> NaiveTime {
		NaiveTime::from_hms_opt(h, m, 0).unwrap()
	}

	fn weekly(days: &[&str], start: NaiveTime, end: NaiveTime) -> PeakHourRule {
		PeakHourRule {
			id:         1,
			turf_id:    1,
			kind:       PeakRuleKind::Weekly,
			weekdays:   Some(days.iter().map(ToString::to_string).collect()),
			date:       None,
			start_time: start,
			end_time:   end,
			price:      1500,
			created_at: NaiveDateTime::default(),
		}
	}

	#[test]
	fn weekly_rule_matches_its_weekdays() {
		let rule = weekly(&["saturday", "sunday"], t(17, 0), t(22, 0));

		// 2024-06-01 is a Saturday, 2024-06-03 a Monday
		let saturday = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

		assert!(rule.applies_on(saturday));
		assert!(!rule.applies_on(monday));
	}

	#[test]
	fn rule_window_contains_start_but_not_end() {
		let rule = weekly(&["monday"], t(17, 0), t(22, 0));

		assert!(rule.contains(t(17, 0)));
		assert!(rule.contains(t(21, 0)));
		assert!(!rule.contains(t(22, 0)));
		assert!(!rule.contains(t(16, 0)));
	}

	#[test]
	fn colliding_weekday_sets_and_windows_conflict() {
		let first = weekly(&["friday", "saturday"], t(17, 0), t(22, 0));
		let second = weekly(&["saturday"], t(20, 0), t(23, 0));
		let third = weekly(&["sunday"], t(17, 0), t(22, 0));
		let fourth = weekly(&["friday"], t(6, 0), t(10, 0));

		assert!(first.conflicts_with(&second));
		// Disjoint weekday-sets never conflict
		assert!(!first.conflicts_with(&third));
		// Disjoint time windows never conflict
		assert!(!first.conflicts_with(&fourth));
	}

	#[test]
	fn date_rules_only_conflict_on_the_same_date() {
		let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let other_date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

		let make = |d: NaiveDate| {
			PeakHourRule {
				id:         1,
				turf_id:    1,
				kind:       PeakRuleKind::DateSpecific,
				weekdays:   None,
				date:       Some(d),
				start_time: t(17, 0),
				end_time:   t(22, 0),
				price:      2000,
				created_at: NaiveDateTime::default(),
			}
		};

		assert!(make(date).conflicts_with(&make(date)));
		assert!(!make(date).conflicts_with(&make(other_date)));
	}
}

use std::io::Write;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Jsonb;
use serde::{Deserialize, Serialize};

use crate::interval::{minutes_of, overlaps, time_of};
use crate::schema::blocked_entry;
use crate::{DbConn, Error};

/// A single blocked clock-time range, half-open
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct TimeRange {
	pub start: NaiveTime,
	pub end:   NaiveTime,
}

/// The canonical jsonb column shape for blocked ranges
#[derive(
	AsExpression, Clone, Debug, Default, Deserialize, FromSqlRow, Serialize,
)]
#[diesel(sql_type = Jsonb)]
pub struct TimeRangeList(pub Vec<TimeRange>);

impl FromSql<Jsonb, Pg> for TimeRangeList {
	fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
		let value = <serde_json::Value as FromSql<Jsonb, Pg>>::from_sql(bytes)?;

		Ok(Self(serde_json::from_value(value)?))
	}
}

impl ToSql<Jsonb, Pg> for TimeRangeList {
	fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
		out.write_all(&[1])?;
		serde_json::to_writer(out, &self.0)?;

		Ok(IsNull::No)
	}
}

/// An operator-defined unavailability record for a turf and date
///
/// The legacy discrete `blocked_times` and the canonical `blocked_ranges`
/// are two wire shapes of the same thing; [`BlockedEntry::normalized_ranges`]
/// funnels both through one representation so the overlap logic exists
/// exactly once.
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = blocked_entry)]
#[serde(rename_all = "camelCase")]
pub struct BlockedEntry {
	pub id:             i32,
	pub turf_id:        i32,
	pub start_date:     NaiveDate,
	pub end_date:       Option<NaiveDate>,
	pub blocked_times:  Option<Vec<NaiveTime>>,
	pub blocked_ranges: Option<TimeRangeList>,
	pub reason:         Option<String>,
	pub created_by:     i32,
	pub created_at:     NaiveDateTime,
	pub updated_at:     NaiveDateTime,
}

impl BlockedEntry {
	/// An entry with neither discrete times nor ranges blocks the whole day
	#[must_use]
	pub fn is_whole_day(&self) -> bool {
		self.blocked_times.as_ref().is_none_or(Vec::is_empty)
			&& self.blocked_ranges.as_ref().is_none_or(|r| r.0.is_empty())
	}

	/// Normalize both blocked shapes into half-open ranges
	///
	/// Discrete times synthesize a `[time, time + slot_minutes)` range so
	/// all representations share the same overlap test.
	#[must_use]
	pub fn normalized_ranges(&self, slot_minutes: i32) -> Vec<TimeRange> {
		let mut ranges = Vec::new();

		if let Some(times) = &self.blocked_times {
			for &time in times {
				// Clamped at end of day; operating windows never reach it
				let end_minutes =
					(minutes_of(time) + slot_minutes).min(24 * 60 - 1);

				ranges.push(TimeRange {
					start: time,
					end:   time_of(end_minutes),
				});
			}
		}

		if let Some(TimeRangeList(explicit)) = &self.blocked_ranges {
			ranges.extend_from_slice(explicit);
		}

		ranges
	}

	/// Whether this entry blocks the candidate interval `[start, end)`
	#[must_use]
	pub fn blocks(
		&self,
		start: NaiveTime,
		end: NaiveTime,
		slot_minutes: i32,
	) -> bool {
		if self.is_whole_day() {
			return true;
		}

		self.normalized_ranges(slot_minutes)
			.iter()
			.any(|range| overlaps(start, end, range.start, range.end))
	}

	/// Get every [`BlockedEntry`] covering a date for a turf
	///
	/// Single-date entries match exactly; range entries match every date
	/// between their start and end dates.
	#[instrument(skip(conn))]
	pub async fn covering_date(
		t_id: i32,
		on_date: NaiveDate,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let entries = conn
			.interact(move |conn| Self::covering_date_sync(t_id, on_date, conn))
			.await??;

		Ok(entries)
	}

	/// Transaction-scoped variant of [`BlockedEntry::covering_date`]
	pub(crate) fn covering_date_sync(
		t_id: i32,
		on_date: NaiveDate,
		conn: &mut PgConnection,
	) -> Result<Vec<Self>, Error> {
		use crate::schema::blocked_entry::dsl::*;

		let entries = blocked_entry
			.filter(turf_id.eq(t_id))
			.filter(start_date.le(on_date))
			.filter(
				end_date
					.ge(on_date)
					.or(end_date.is_null().and(start_date.eq(on_date))),
			)
			.select(Self::as_select())
			.load(conn)?;

		Ok(entries)
	}

	/// Get all [`BlockedEntry`]s for a turf
	#[instrument(skip(conn))]
	pub async fn for_turf(t_id: i32, conn: &DbConn) -> Result<Vec<Self>, Error> {
		let entries = conn
			.interact(move |conn| {
				use crate::schema::blocked_entry::dsl::*;

				blocked_entry
					.filter(turf_id.eq(t_id))
					.order(start_date.asc())
					.select(Self::as_select())
					.load(conn)
			})
			.await??;

		Ok(entries)
	}
}

/// A blocking mutation: merged into the existing entry for the date
#[derive(Clone, Debug)]
pub struct BlockMutation {
	pub turf_id:    i32,
	pub start_date: NaiveDate,
	pub end_date:   Option<NaiveDate>,
	pub times:      Vec<NaiveTime>,
	pub ranges:     Vec<TimeRange>,
	pub reason:     Option<String>,
	pub created_by: i32,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = blocked_entry)]
struct InsertableBlockedEntry {
	turf_id:        i32,
	start_date:     NaiveDate,
	end_date:       Option<NaiveDate>,
	blocked_times:  Option<Vec<NaiveTime>>,
	blocked_ranges: Option<TimeRangeList>,
	reason:         Option<String>,
	created_by:     i32,
}

impl BlockMutation {
	/// Merge this mutation into the single entry for (turf, start date)
	///
	/// Times and ranges are deduplicated; a mutation with neither times
	/// nor ranges creates (or reduces to) a whole-day block.
	#[instrument(skip(conn))]
	pub async fn apply(self, conn: &DbConn) -> Result<BlockedEntry, Error> {
		let entry = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| self.apply_sync(conn))
			})
			.await??;

		info!(
			"blocked turf {} on {} ({} times, {} ranges)",
			entry.turf_id,
			entry.start_date,
			entry.blocked_times.as_ref().map_or(0, Vec::len),
			entry.blocked_ranges.as_ref().map_or(0, |r| r.0.len()),
		);

		Ok(entry)
	}

	fn apply_sync(self, conn: &mut PgConnection) -> Result<BlockedEntry, Error> {
		use crate::schema::blocked_entry::dsl::*;

		let existing: Option<BlockedEntry> = blocked_entry
			.filter(turf_id.eq(self.turf_id))
			.filter(start_date.eq(self.start_date))
			.select(BlockedEntry::as_select())
			.first(conn)
			.optional()?;

		let Some(entry) = existing else {
			let new_entry = InsertableBlockedEntry {
				turf_id:        self.turf_id,
				start_date:     self.start_date,
				end_date:       self.end_date,
				blocked_times:  (!self.times.is_empty())
					.then(|| dedup_times(self.times)),
				blocked_ranges: (!self.ranges.is_empty())
					.then(|| TimeRangeList(dedup_ranges(self.ranges))),
				reason:         self.reason,
				created_by:     self.created_by,
			};

			let inserted = diesel::insert_into(blocked_entry)
				.values(new_entry)
				.returning(BlockedEntry::as_returning())
				.get_result(conn)?;

			return Ok(inserted);
		};

		let mut times = entry.blocked_times.unwrap_or_default();
		times.extend(self.times);
		let times = dedup_times(times);

		let mut ranges = entry.blocked_ranges.unwrap_or_default().0;
		ranges.extend(self.ranges);
		let ranges = dedup_ranges(ranges);

		let updated = diesel::update(blocked_entry.find(entry.id))
			.set((
				blocked_times.eq((!times.is_empty()).then_some(times)),
				blocked_ranges
					.eq((!ranges.is_empty()).then_some(TimeRangeList(ranges))),
				end_date.eq(self.end_date.or(entry.end_date)),
				reason.eq(self.reason.or(entry.reason)),
				updated_at.eq(diesel::dsl::now),
			))
			.returning(BlockedEntry::as_returning())
			.get_result(conn)?;

		Ok(updated)
	}
}

/// Remove one blocked time or range from the entry for (turf, date)
///
/// Deleting the last time/range deletes the entry, reverting the date to
/// fully open.
#[derive(Clone, Debug)]
pub struct UnblockMutation {
	pub turf_id:    i32,
	pub start_date: NaiveDate,
	pub time:       Option<NaiveTime>,
	pub range:      Option<TimeRange>,
}

impl UnblockMutation {
	/// Apply this removal; returns the remaining entry, if any
	#[instrument(skip(conn))]
	pub async fn apply(self, conn: &DbConn) -> Result<Option<BlockedEntry>, Error> {
		let remaining = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| self.apply_sync(conn))
			})
			.await??;

		Ok(remaining)
	}

	fn apply_sync(
		self,
		conn: &mut PgConnection,
	) -> Result<Option<BlockedEntry>, Error> {
		use crate::schema::blocked_entry::dsl::*;

		let entry: BlockedEntry = blocked_entry
			.filter(turf_id.eq(self.turf_id))
			.filter(start_date.eq(self.start_date))
			.select(BlockedEntry::as_select())
			.first(conn)
			.optional()?
			.ok_or_else(|| {
				Error::NotFound("no blocked entry for this date".to_string())
			})?;

		let mut times = entry.blocked_times.clone().unwrap_or_default();
		if let Some(target) = self.time {
			let before = times.len();
			times.retain(|&t| t != target);

			if times.len() == before {
				return Err(Error::NotFound(
					"this time is not blocked".to_string(),
				));
			}
		}

		let mut ranges = entry.blocked_ranges.clone().unwrap_or_default().0;
		if let Some(target) = self.range {
			let before = ranges.len();
			ranges.retain(|&r| r != target);

			if ranges.len() == before {
				return Err(Error::NotFound(
					"this range is not blocked".to_string(),
				));
			}
		}

		if times.is_empty() && ranges.is_empty() {
			diesel::delete(blocked_entry.find(entry.id)).execute(conn)?;

			info!(
				"unblocked turf {} on {} entirely",
				entry.turf_id, entry.start_date
			);

			return Ok(None);
		}

		let updated = diesel::update(blocked_entry.find(entry.id))
			.set((
				blocked_times.eq((!times.is_empty()).then_some(times)),
				blocked_ranges
					.eq((!ranges.is_empty()).then_some(TimeRangeList(ranges))),
				updated_at.eq(diesel::dsl::now),
			))
			.returning(BlockedEntry::as_returning())
			.get_result(conn)?;

		Ok(Some(updated))
	}
}

fn dedup_times(mut times: Vec<NaiveTime>) -> Vec<NaiveTime> {
	times.sort_unstable();
	times.dedup();
	times
}

fn dedup_ranges(mut ranges: Vec<TimeRange>) -> Vec<TimeRange> {
	ranges.sort_unstable_by_key(|r| (r.start, r.end));
	ranges.dedup();
	ranges
}

#[cfg(test)]
mod tests {
	use super::*;

	fn t(h: u32, m: u32) -> NaiveTime {
		NaiveTime::from_hms_opt(h, m, 0).unwrap()
	}

	fn entry(
		times: Option<Vec<NaiveTime>>,
		ranges: Option<Vec<TimeRange>>,
	) -> BlockedEntry {
		BlockedEntry {
			id: 1,
			turf_id: 1,
			start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
			end_date: None,
			blocked_times: times,
			blocked_ranges: ranges.map(TimeRangeList),
			reason: None,
			created_by: 1,
			created_at: NaiveDateTime::default(),
			updated_at: NaiveDateTime::default(),
		}
	}

	#[test]
	fn empty_entry_blocks_the_whole_day() {
		let whole_day = entry(None, None);

		assert!(whole_day.is_whole_day());
		assert!(whole_day.blocks(t(6, 0), t(7, 0), 60));
		assert!(whole_day.blocks(t(21, 0), t(22, 0), 60));
	}

	#[test]
	fn discrete_times_synthesize_slot_sized_ranges() {
		let blocked = entry(Some(vec![t(10, 0)]), None);

		assert!(blocked.blocks(t(10, 0), t(11, 0), 60));
		// A multi-slot candidate straddling the blocked slot
		assert!(blocked.blocks(t(9, 0), t(11, 0), 60));
		// Adjacent slots stay open
		assert!(!blocked.blocks(t(9, 0), t(10, 0), 60));
		assert!(!blocked.blocks(t(11, 0), t(12, 0), 60));
	}

	#[test]
	fn explicit_ranges_use_half_open_overlap() {
		let blocked =
			entry(None, Some(vec![TimeRange { start: t(18, 0), end: t(20, 0) }]));

		assert!(blocked.blocks(t(18, 0), t(19, 0), 60));
		assert!(blocked.blocks(t(19, 0), t(20, 0), 60));
		// Partially-blocked candidates are still blocked
		assert!(blocked.blocks(t(17, 0), t(19, 0), 60));
		assert!(!blocked.blocks(t(17, 0), t(18, 0), 60));
		assert!(!blocked.blocks(t(20, 0), t(21, 0), 60));
	}

	#[test]
	fn merging_the_same_time_twice_deduplicates() {
		let times = dedup_times(vec![t(10, 0), t(9, 0), t(10, 0)]);

		assert_eq!(times, vec![t(9, 0), t(10, 0)]);

		let range = TimeRange { start: t(18, 0), end: t(20, 0) };
		let ranges = dedup_ranges(vec![range, range]);

		assert_eq!(ranges, vec![range]);
	}

	#[test]
	fn both_shapes_funnel_through_one_normalization() {
		let blocked = entry(
			Some(vec![t(8, 0)]),
			Some(vec![TimeRange { start: t(18, 0), end: t(20, 0) }]),
		);

		let ranges = blocked.normalized_ranges(30);

		assert_eq!(ranges.len(), 2);
		assert_eq!(ranges[0], TimeRange { start: t(8, 0), end: t(8, 30) });
		assert_eq!(ranges[1], TimeRange { start: t(18, 0), end: t(20, 0) });
	}
}

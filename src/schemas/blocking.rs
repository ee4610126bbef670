use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::Error;
use crate::models::{BlockMutation, BlockedEntry, TimeRange, UnblockMutation};

/// Block times on a date, merging into any existing entry
///
/// Leaving both `times` and `ranges` empty blocks the whole day (or the
/// whole date range when `endDate` is given).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTimesRequest {
	pub date:     NaiveDate,
	pub end_date: Option<NaiveDate>,
	#[serde(default)]
	pub times:    Vec<NaiveTime>,
	#[serde(default)]
	pub ranges:   Vec<TimeRangeRequest>,
	pub reason:   Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeRequest {
	pub start: NaiveTime,
	pub end:   NaiveTime,
}

impl From<TimeRangeRequest> for TimeRange {
	fn from(value: TimeRangeRequest) -> Self {
		Self { start: value.start, end: value.end }
	}
}

impl BlockTimesRequest {
	pub fn to_mutation(
		self,
		turf_id: i32,
		operator_id: i32,
	) -> Result<BlockMutation, Error> {
		if let Some(end_date) = self.end_date
			&& end_date < self.date
		{
			return Err(Error::ValidationError(
				"end date must not precede start date".to_string(),
			));
		}

		if self.ranges.iter().any(|range| range.end <= range.start) {
			return Err(Error::ValidationError(
				"blocked ranges must end after they start".to_string(),
			));
		}

		Ok(BlockMutation {
			turf_id,
			start_date: self.date,
			end_date: self.end_date,
			times: self.times,
			ranges: self.ranges.into_iter().map(Into::into).collect(),
			reason: self.reason,
			created_by: operator_id,
		})
	}
}

/// Unblock one time or one range on a date
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnblockTimeRequest {
	pub date:  NaiveDate,
	pub time:  Option<NaiveTime>,
	pub range: Option<TimeRangeRequest>,
}

impl UnblockTimeRequest {
	pub fn to_mutation(self, turf_id: i32) -> Result<UnblockMutation, Error> {
		if self.time.is_none() && self.range.is_none() {
			return Err(Error::ValidationError(
				"provide the time or range to unblock".to_string(),
			));
		}

		Ok(UnblockMutation {
			turf_id,
			start_date: self.date,
			time: self.time,
			range: self.range.map(Into::into),
		})
	}
}

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedEntryResponse {
	pub id:         i32,
	pub turf_id:    i32,
	pub start_date: NaiveDate,
	pub end_date:   Option<NaiveDate>,
	pub times:      Vec<NaiveTime>,
	pub ranges:     Vec<TimeRangeRequest>,
	pub whole_day:  bool,
	pub reason:     Option<String>,
	pub created_at: NaiveDateTime,
}

impl From<BlockedEntry> for BlockedEntryResponse {
	fn from(value: BlockedEntry) -> Self {
		let whole_day = value.is_whole_day();

		Self {
			id: value.id,
			turf_id: value.turf_id,
			start_date: value.start_date,
			end_date: value.end_date,
			times: value.blocked_times.unwrap_or_default(),
			ranges: value
				.blocked_ranges
				.map(|list| {
					list.0
						.into_iter()
						.map(|range| {
							TimeRangeRequest {
								start: range.start,
								end:   range.end,
							}
						})
						.collect()
				})
				.unwrap_or_default(),
			whole_day,
			reason: value.reason,
			created_at: value.created_at,
		}
	}
}

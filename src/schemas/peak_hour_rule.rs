use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::Error;
use crate::models::{NewPeakHourRule, PeakHourRule, PeakRuleKind};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePeakHourRuleRequest {
	pub kind:       PeakRuleKind,
	pub weekdays:   Option<Vec<String>>,
	pub date:       Option<NaiveDate>,
	pub start_time: NaiveTime,
	pub end_time:   NaiveTime,
	pub price:      i32,
}

impl CreatePeakHourRuleRequest {
	pub fn to_insertable(self, turf_id: i32) -> Result<NewPeakHourRule, Error> {
		if self.end_time <= self.start_time {
			return Err(Error::ValidationError(
				"rule window must end after it starts".to_string(),
			));
		}

		if self.price < 0 {
			return Err(Error::ValidationError(
				"price must not be negative".to_string(),
			));
		}

		match self.kind {
			PeakRuleKind::Weekly => {
				let Some(weekdays) = &self.weekdays else {
					return Err(Error::ValidationError(
						"weekly rules need a set of weekdays".to_string(),
					));
				};

				if weekdays.is_empty() {
					return Err(Error::ValidationError(
						"weekly rules need a set of weekdays".to_string(),
					));
				}

				for name in weekdays {
					if name.parse::<Weekday>().is_err() {
						return Err(Error::ValidationError(format!(
							"unknown weekday '{name}'"
						)));
					}
				}
			},
			PeakRuleKind::DateSpecific => {
				if self.date.is_none() {
					return Err(Error::ValidationError(
						"date-specific rules need a date".to_string(),
					));
				}
			},
		}

		Ok(NewPeakHourRule {
			turf_id,
			kind: self.kind,
			weekdays: self.weekdays,
			date: self.date,
			start_time: self.start_time,
			end_time: self.end_time,
			price: self.price,
		})
	}
}

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakHourRuleResponse {
	pub id:         i32,
	pub turf_id:    i32,
	pub kind:       PeakRuleKind,
	pub weekdays:   Option<Vec<String>>,
	pub date:       Option<NaiveDate>,
	pub start_time: NaiveTime,
	pub end_time:   NaiveTime,
	pub price:      i32,
}

impl From<PeakHourRule> for PeakHourRuleResponse {
	fn from(value: PeakHourRule) -> Self {
		Self {
			id:         value.id,
			turf_id:    value.turf_id,
			kind:       value.kind,
			weekdays:   value.weekdays,
			date:       value.date,
			start_time: value.start_time,
			end_time:   value.end_time,
			price:      value.price,
		}
	}
}

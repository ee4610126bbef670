use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;
use validator_derive::Validate;

use crate::Error;
use crate::models::{NewTurf, Turf};

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTurfRequest {
	#[validate(length(
		min = 2,
		max = 100,
		message = "name must be between 2 and 100 characters long",
		code = "turf-name-length"
	))]
	pub name:                  String,
	pub description:           Option<String>,
	pub opening_time:          NaiveTime,
	pub closing_time:          NaiveTime,
	#[validate(range(
		min = 15,
		max = 240,
		message = "slot length must be between 15 and 240 minutes",
		code = "slot-minutes"
	))]
	pub slot_minutes:          i32,
	#[validate(range(min = 1, code = "min-slots"))]
	pub min_slots:             i32,
	#[validate(range(min = 1, code = "max-slots"))]
	pub max_slots:             i32,
	#[validate(range(min = 0, code = "base-price"))]
	pub base_price:            i32,
	#[serde(default)]
	pub weekday_pricing:       bool,
	pub weekday_morning_start: Option<NaiveTime>,
	pub weekday_morning_price: Option<i32>,
	pub weekday_evening_start: Option<NaiveTime>,
	pub weekday_evening_price: Option<i32>,
	#[serde(default)]
	pub weekend_pricing:       bool,
	pub weekend_morning_start: Option<NaiveTime>,
	pub weekend_morning_price: Option<i32>,
	pub weekend_evening_start: Option<NaiveTime>,
	pub weekend_evening_price: Option<i32>,
}

impl CreateTurfRequest {
	pub fn to_insertable(self) -> Result<NewTurf, Error> {
		self.validate()?;

		if self.closing_time <= self.opening_time {
			return Err(Error::ValidationError(
				"closing time must be after opening time".to_string(),
			));
		}

		if self.max_slots < self.min_slots {
			return Err(Error::ValidationError(
				"max slots must not be below min slots".to_string(),
			));
		}

		Ok(NewTurf {
			name:                  self.name,
			description:           self.description,
			opening_time:          self.opening_time,
			closing_time:          self.closing_time,
			slot_minutes:          self.slot_minutes,
			min_slots:             self.min_slots,
			max_slots:             self.max_slots,
			base_price:            self.base_price,
			weekday_pricing:       self.weekday_pricing,
			weekday_morning_start: self.weekday_morning_start,
			weekday_morning_price: self.weekday_morning_price,
			weekday_evening_start: self.weekday_evening_start,
			weekday_evening_price: self.weekday_evening_price,
			weekend_pricing:       self.weekend_pricing,
			weekend_morning_start: self.weekend_morning_start,
			weekend_morning_price: self.weekend_morning_price,
			weekend_evening_start: self.weekend_evening_start,
			weekend_evening_price: self.weekend_evening_price,
		})
	}
}

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurfResponse {
	pub id:              i32,
	pub name:            String,
	pub description:     Option<String>,
	pub opening_time:    NaiveTime,
	pub closing_time:    NaiveTime,
	pub slot_minutes:    i32,
	pub min_slots:       i32,
	pub max_slots:       i32,
	pub base_price:      i32,
	pub is_active:       bool,
	pub disabled_reason: Option<String>,
	pub created_at:      NaiveDateTime,
}

impl From<Turf> for TurfResponse {
	fn from(value: Turf) -> Self {
		Self {
			id:              value.id,
			name:            value.name,
			description:     value.description,
			opening_time:    value.opening_time,
			closing_time:    value.closing_time,
			slot_minutes:    value.slot_minutes,
			min_slots:       value.min_slots,
			max_slots:       value.max_slots,
			base_price:      value.base_price,
			is_active:       value.is_active,
			disabled_reason: value.disabled_reason,
			created_at:      value.created_at,
		}
	}
}

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;
use validator_derive::Validate;

use crate::Error;
use crate::models::{Event, EventStatus, NewEvent};

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
	#[validate(length(
		min = 2,
		max = 200,
		message = "title must be between 2 and 200 characters long",
		code = "event-title-length"
	))]
	pub title:      String,
	pub start_date: NaiveDate,
	pub end_date:   NaiveDate,
	pub start_time: NaiveTime,
	pub end_time:   NaiveTime,
}

impl CreateEventRequest {
	pub fn to_insertable(self, turf_id: i32) -> Result<NewEvent, Error> {
		self.validate()?;

		if self.end_date < self.start_date {
			return Err(Error::ValidationError(
				"end date must not precede start date".to_string(),
			));
		}

		if self.end_time <= self.start_time {
			return Err(Error::ValidationError(
				"event window must end after it starts".to_string(),
			));
		}

		Ok(NewEvent {
			turf_id,
			title: self.title,
			start_date: self.start_date,
			end_date: self.end_date,
			start_time: self.start_time,
			end_time: self.end_time,
		})
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
	pub id:         i32,
	pub turf_id:    i32,
	pub title:      String,
	pub start_date: NaiveDate,
	pub end_date:   NaiveDate,
	pub start_time: NaiveTime,
	pub end_time:   NaiveTime,
	pub status:     EventStatus,
	pub created_at: NaiveDateTime,
}

impl From<Event> for EventResponse {
	fn from(value: Event) -> Self {
		Self {
			id:         value.id,
			turf_id:    value.turf_id,
			title:      value.title,
			start_date: value.start_date,
			end_date:   value.end_date,
			start_time: value.start_time,
			end_time:   value.end_time,
			status:     value.status,
			created_at: value.created_at,
		}
	}
}

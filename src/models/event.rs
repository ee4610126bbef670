use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

use crate::interval::overlaps;
use crate::schema::event;
use crate::{DbConn, Error};

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::EventStatus"]
#[serde(rename_all = "camelCase")]
pub enum EventStatus {
	#[default]
	Active,
	Cancelled,
}

/// A scheduled event occupying a turf's clock window on a range of dates
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = event)]
#[serde(rename_all = "camelCase")]
pub struct Event {
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

impl Event {
	/// Whether this event occupies `[start, end)` on the given date
	///
	/// An active event renders its clock window unavailable on every date
	/// of its range, regardless of booking or blocking state.
	#[must_use]
	pub fn occupies(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
		self.status == EventStatus::Active
			&& (self.start_date..=self.end_date).contains(&date)
			&& overlaps(start, end, self.start_time, self.end_time)
	}

	/// Get all active [`Event`]s covering a date for a turf
	#[instrument(skip(conn))]
	pub async fn active_for_date(
		t_id: i32,
		on_date: NaiveDate,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let events = conn
			.interact(move |conn| Self::active_for_date_sync(t_id, on_date, conn))
			.await??;

		Ok(events)
	}

	/// Transaction-scoped variant of [`Event::active_for_date`]
	pub(crate) fn active_for_date_sync(
		t_id: i32,
		on_date: NaiveDate,
		conn: &mut PgConnection,
	) -> Result<Vec<Self>, Error> {
		use crate::schema::event::dsl::*;

		let events = event
			.filter(turf_id.eq(t_id))
			.filter(status.eq(EventStatus::Active))
			.filter(start_date.le(on_date))
			.filter(end_date.ge(on_date))
			.select(Self::as_select())
			.load(conn)?;

		Ok(events)
	}

	/// Get all [`Event`]s for a turf
	#[instrument(skip(conn))]
	pub async fn for_turf(t_id: i32, conn: &DbConn) -> Result<Vec<Self>, Error> {
		let events = conn
			.interact(move |conn| {
				use crate::schema::event::dsl::*;

				event
					.filter(turf_id.eq(t_id))
					.order(start_date.asc())
					.select(Self::as_select())
					.load(conn)
			})
			.await??;

		Ok(events)
	}

	/// Cancel an [`Event`], freeing its slots for booking again
	#[instrument(skip(conn))]
	pub async fn cancel(e_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let cancelled = conn
			.interact(move |conn| {
				use crate::schema::event::dsl::*;

				diesel::update(event.find(e_id))
					.set(status.eq(EventStatus::Cancelled))
					.returning(Self::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("cancelled event {} ({})", cancelled.id, cancelled.title);

		Ok(cancelled)
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = event)]
pub struct NewEvent {
	pub turf_id:    i32,
	pub title:      String,
	pub start_date: NaiveDate,
	pub end_date:   NaiveDate,
	pub start_time: NaiveTime,
	pub end_time:   NaiveTime,
}

impl NewEvent {
	/// Insert this [`NewEvent`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Event, Error> {
		let created = conn
			.interact(|conn| {
				use self::event::dsl::*;

				diesel::insert_into(event)
					.values(self)
					.returning(Event::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created event {} ({})", created.id, created.title);

		Ok(created)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn t(h: u32, m: u32) -> NaiveTime {
		NaiveTime::from_hms_opt(h, m, 0).unwrap()
	}

	fn event_on(start: NaiveDate, end: NaiveDate, status: EventStatus) -> Event {
		Event {
			id: 1,
			turf_id: 1,
			title: "summer tournament".to_string(),
			start_date: start,
			end_date: end,
			start_time: t(9, 0),
			end_time: t(12, 0),
			status,
			created_at: chrono::NaiveDateTime::default(),
		}
	}

	#[test]
	fn active_event_occupies_its_window_on_every_date() {
		let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let end = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
		let event = event_on(start, end, EventStatus::Active);

		let mid = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

		assert!(event.occupies(mid, t(9, 0), t(10, 0)));
		assert!(event.occupies(end, t(11, 0), t(12, 0)));

		// Outside the clock window or the date range: free
		assert!(!event.occupies(mid, t(12, 0), t(13, 0)));
		let after = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
		assert!(!event.occupies(after, t(9, 0), t(10, 0)));
	}

	#[test]
	fn cancelled_event_occupies_nothing() {
		let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let event = event_on(day, day, EventStatus::Cancelled);

		assert!(!event.occupies(day, t(9, 0), t(10, 0)));
	}
}

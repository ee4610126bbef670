use chrono::{NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::turf;
use crate::{DbConn, Error};

/// A bookable turf with its operating window and pricing
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = turf)]
#[serde(rename_all = "camelCase")]
pub struct Turf {
	pub id:                    i32,
	pub name:                  String,
	pub description:           Option<String>,
	pub opening_time:          NaiveTime,
	pub closing_time:          NaiveTime,
	pub slot_minutes:          i32,
	pub min_slots:             i32,
	pub max_slots:             i32,
	pub base_price:            i32,
	pub weekday_pricing:       bool,
	pub weekday_morning_start: Option<NaiveTime>,
	pub weekday_morning_price: Option<i32>,
	pub weekday_evening_start: Option<NaiveTime>,
	pub weekday_evening_price: Option<i32>,
	pub weekend_pricing:       bool,
	pub weekend_morning_start: Option<NaiveTime>,
	pub weekend_morning_price: Option<i32>,
	pub weekend_evening_start: Option<NaiveTime>,
	pub weekend_evening_price: Option<i32>,
	pub is_active:             bool,
	pub disabled_reason:       Option<String>,
	pub created_at:            NaiveDateTime,
	pub updated_at:            NaiveDateTime,
}

/// A morning/evening price band pair for one half of the week
#[derive(Clone, Copy, Debug)]
pub struct PriceBands {
	pub morning_start: Option<NaiveTime>,
	pub morning_price: Option<i32>,
	pub evening_start: Option<NaiveTime>,
	pub evening_price: Option<i32>,
}

impl Turf {
	/// The weekday price bands, if weekday pricing is enabled
	#[must_use]
	pub fn weekday_bands(&self) -> Option<PriceBands> {
		self.weekday_pricing.then_some(PriceBands {
			morning_start: self.weekday_morning_start,
			morning_price: self.weekday_morning_price,
			evening_start: self.weekday_evening_start,
			evening_price: self.weekday_evening_price,
		})
	}

	/// The weekend price bands, if weekend pricing is enabled
	#[must_use]
	pub fn weekend_bands(&self) -> Option<PriceBands> {
		self.weekend_pricing.then_some(PriceBands {
			morning_start: self.weekend_morning_start,
			morning_price: self.weekend_morning_price,
			evening_start: self.weekend_evening_start,
			evening_price: self.weekend_evening_price,
		})
	}

	/// Get a [`Turf`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(t_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let turf = conn
			.interact(move |conn| {
				use crate::schema::turf::dsl::*;

				turf.find(t_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(turf)
	}

	/// Get all [`Turf`]s
	#[instrument(skip(conn))]
	pub async fn get_all(conn: &DbConn) -> Result<Vec<Self>, Error> {
		let turfs = conn
			.interact(|conn| {
				use crate::schema::turf::dsl::*;

				turf.select(Self::as_select()).order(name.asc()).load(conn)
			})
			.await??;

		Ok(turfs)
	}

	/// Load a [`Turf`] inside an already-running transaction
	pub(crate) fn get_sync(
		t_id: i32,
		conn: &mut PgConnection,
	) -> Result<Self, Error> {
		let turf = turf::table
			.find(t_id)
			.select(Self::as_select())
			.get_result(conn)?;

		Ok(turf)
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = turf)]
pub struct NewTurf {
	pub name:                  String,
	pub description:           Option<String>,
	pub opening_time:          NaiveTime,
	pub closing_time:          NaiveTime,
	pub slot_minutes:          i32,
	pub min_slots:             i32,
	pub max_slots:             i32,
	pub base_price:            i32,
	pub weekday_pricing:       bool,
	pub weekday_morning_start: Option<NaiveTime>,
	pub weekday_morning_price: Option<i32>,
	pub weekday_evening_start: Option<NaiveTime>,
	pub weekday_evening_price: Option<i32>,
	pub weekend_pricing:       bool,
	pub weekend_morning_start: Option<NaiveTime>,
	pub weekend_morning_price: Option<i32>,
	pub weekend_evening_start: Option<NaiveTime>,
	pub weekend_evening_price: Option<i32>,
}

impl NewTurf {
	/// Insert this [`NewTurf`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Turf, Error> {
		let turf = conn
			.interact(|conn| {
				use self::turf::dsl::*;

				diesel::insert_into(turf)
					.values(self)
					.returning(Turf::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created turf {} ({})", turf.id, turf.name);

		Ok(turf)
	}
}

#[derive(Clone, Debug, Default, AsChangeset, Deserialize)]
#[diesel(table_name = turf)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTurf {
	pub name:            Option<String>,
	pub description:     Option<String>,
	pub opening_time:    Option<NaiveTime>,
	pub closing_time:    Option<NaiveTime>,
	pub min_slots:       Option<i32>,
	pub max_slots:       Option<i32>,
	pub base_price:      Option<i32>,
	pub is_active:       Option<bool>,
	pub disabled_reason: Option<String>,
}

impl UpdateTurf {
	/// Update the [`Turf`] with the given id
	#[instrument(skip(conn))]
	pub async fn apply_to(self, t_id: i32, conn: &DbConn) -> Result<Turf, Error> {
		let turf = conn
			.interact(move |conn| {
				use self::turf::dsl::*;

				diesel::update(turf.find(t_id))
					.set((self, updated_at.eq(diesel::dsl::now)))
					.returning(Turf::as_returning())
					.get_result(conn)
			})
			.await??;

		Ok(turf)
	}
}

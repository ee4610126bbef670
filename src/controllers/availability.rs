use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;

use crate::models::{BlockedEntry, Booking, Event, PeakHourRule, Turf};
use crate::schemas::availability::{AvailabilityQuery, SlotResponse};
use crate::slots::compute_slots;
use crate::{Config, DbPool, Error};

/// Compute the slot list for a turf on a date
///
/// Lock-free read path: the result may already be stale when it reaches
/// the client, which is fine because the admission protocol re-validates
/// under its lock before committing anything.
#[instrument(skip(pool))]
pub async fn get_availability(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	Path(turf_id): Path<i32>,
	Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	// Sweep abandoned holds first so they do not show up as booked
	Booking::reap_stale_holds(turf_id, config.reap_window, &conn).await?;

	let turf = Turf::get_by_id(turf_id, &conn).await?;

	let now = Utc::now().naive_utc();
	let now_if_today = (query.date == now.date())
		.then(|| query.now.unwrap_or_else(|| now.time()));

	let bookings = Booking::occupying_for_date(turf_id, query.date, &conn).await?;
	let entries = BlockedEntry::covering_date(turf_id, query.date, &conn).await?;
	let events = Event::active_for_date(turf_id, query.date, &conn).await?;
	let rules = PeakHourRule::for_turf(turf_id, &conn).await?;

	let slots = compute_slots(
		&turf,
		query.date,
		now_if_today,
		&bookings,
		&entries,
		&events,
		&rules,
		now,
	);

	let response: Vec<SlotResponse> =
		slots.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

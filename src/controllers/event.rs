use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::models::Event;
use crate::operator::Operator;
use crate::schemas::event::{CreateEventRequest, EventResponse};
use crate::{DbPool, Error};

/// List a turf's events
#[instrument(skip(pool))]
pub async fn get_events(
	State(pool): State<DbPool>,
	Path(turf_id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let events = Event::for_turf(turf_id, &conn).await?;
	let response: Vec<EventResponse> =
		events.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Schedule an event, taking its clock window off the booking grid
#[instrument(skip(pool, request))]
pub async fn create_event(
	State(pool): State<DbPool>,
	_operator: Operator,
	Path(turf_id): Path<i32>,
	Json(request): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, Error> {
	let new_event = request.to_insertable(turf_id)?;

	let conn = pool.get().await?;

	let event = new_event.insert(&conn).await?;
	let response = EventResponse::from(event);

	Ok((StatusCode::CREATED, Json(response)))
}

/// Cancel an event, freeing its slots again
#[instrument(skip(pool))]
pub async fn cancel_event(
	State(pool): State<DbPool>,
	_operator: Operator,
	Path(event_id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let event = Event::cancel(event_id, &conn).await?;
	let response = EventResponse::from(event);

	Ok((StatusCode::OK, Json(response)))
}

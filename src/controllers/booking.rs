use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::Booking;
use crate::operator::Operator;
use crate::schemas::booking::{
	BookingResponse,
	CancelBookingRequest,
	CreateBookingRequest,
	PaymentSignalRequest,
};
use crate::{Config, DbPool, Error};

/// Run the admission protocol for a booking attempt
///
/// Everything after validation happens inside one locked transaction,
/// so two browsers racing for the same slot get a total order: one 201
/// and one structured rejection.
#[instrument(skip(pool, request))]
pub async fn create_booking(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	Path(turf_id): Path<i32>,
	Json(request): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, Error> {
	let admission = request.to_admission(turf_id)?;

	let conn = pool.get().await?;

	let booking = admission
		.admit(config.hold_grace, config.reap_window, &conn)
		.await?;
	let response = BookingResponse::from(booking);

	Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct BookingListFilter {
	pub date: NaiveDate,
}

/// List a turf's bookings for a date, with customer details
#[instrument(skip(pool))]
pub async fn get_bookings_for_date(
	State(pool): State<DbPool>,
	_operator: Operator,
	Path(turf_id): Path<i32>,
	Query(filter): Query<BookingListFilter>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let bookings =
		Booking::for_date_with_customers(turf_id, filter.date, &conn).await?;
	let response: Vec<BookingResponse> =
		bookings.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Get a single booking
#[instrument(skip(pool))]
pub async fn get_booking(
	State(pool): State<DbPool>,
	Path(booking_id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let booking = Booking::get_by_id(booking_id, &conn).await?;
	let response = BookingResponse::from(booking);

	Ok((StatusCode::OK, Json(response)))
}

/// The payment gateway's confirmation signal
///
/// The only legitimate way a held booking leaves the held state other
/// than expiry.
#[instrument(skip(pool))]
pub async fn apply_payment_signal(
	State(pool): State<DbPool>,
	Path(booking_id): Path<i32>,
	Json(request): Json<PaymentSignalRequest>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let booking =
		Booking::apply_payment_signal(booking_id, request.outcome, &conn)
			.await?;
	let response = BookingResponse::from(booking);

	Ok((StatusCode::OK, Json(response)))
}

/// Cancel a held or confirmed booking
#[instrument(skip(pool))]
pub async fn cancel_booking(
	State(pool): State<DbPool>,
	Path(booking_id): Path<i32>,
	request: Option<Json<CancelBookingRequest>>,
) -> Result<impl IntoResponse, Error> {
	let refund = request.map(|Json(r)| r.refund).unwrap_or_default();

	let conn = pool.get().await?;

	let booking = Booking::cancel(booking_id, refund, &conn).await?;
	let response = BookingResponse::from(booking);

	Ok((StatusCode::OK, Json(response)))
}

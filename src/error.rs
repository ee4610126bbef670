//! Library-wide error types and [`From`] impls

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Top level application error, can be converted into a [`Response`]
#[derive(Debug, Error)]
pub enum Error {
	/// Any rejection produced by the booking admission protocol
	#[error(transparent)]
	BookingError(#[from] BookingError),
	/// Duplicate resource created
	#[error("{0}")]
	Duplicate(String),
	/// Request/operation forbidden
	#[error("forbidden")]
	Forbidden,
	/// Opaque internal server error
	#[error("internal server error")]
	InternalServerError,
	/// Resource not found
	#[error("not found - {0}")]
	NotFound(String),
	/// Resource could not be validated
	#[error("{0}")]
	ValidationError(String),
}

impl Error {
	/// Return a unique identifying code for this error
	///
	/// When modifying this function the error code should only ever
	/// increase, an error code should never be reused once its assigned to
	/// avoid unexpectedly breaking the frontend
	fn code(&self) -> i32 {
		match self {
			Self::Duplicate(_) => 1,
			Self::Forbidden => 2,
			Self::InternalServerError => 3,
			Self::NotFound(_) => 4,
			Self::ValidationError(_) => 5,
			Self::BookingError(e) => {
				match e {
					BookingError::TurfDisabled(_) => 6,
					BookingError::OutsideOperatingHours { .. } => 7,
					BookingError::TooShort(_) => 8,
					BookingError::TooLong(_) => 9,
					BookingError::PastSlot => 10,
					BookingError::IntervalBlocked => 11,
					BookingError::EventConflict(_) => 12,
					BookingError::SlotTaken => 13,
					BookingError::HoldExpired(_) => 14,
					BookingError::InvalidTransition { .. } => 15,
				}
			},
		}
	}

	/// Return additional information about the error
	fn info(&self) -> Option<String> {
		match self {
			Self::Duplicate(m) | Self::NotFound(m) | Self::ValidationError(m) => {
				Some(m.to_owned())
			},
			Self::BookingError(e) => {
				match e {
					BookingError::TurfDisabled(reason) => reason.to_owned(),
					BookingError::OutsideOperatingHours { opening, closing } => {
						Some(
							serde_json::json!({
								"opening": opening,
								"closing": closing,
							})
							.to_string(),
						)
					},
					BookingError::TooShort(min) => {
						Some(serde_json::json!({ "minSlots": min }).to_string())
					},
					BookingError::TooLong(max) => {
						Some(serde_json::json!({ "maxSlots": max }).to_string())
					},
					BookingError::EventConflict(title) => Some(title.to_owned()),
					BookingError::HoldExpired(at) => {
						Some(serde_json::json!({ "expiredAt": at }).to_string())
					},
					BookingError::InvalidTransition { from, to } => {
						Some(
							serde_json::json!({ "from": from, "to": to })
								.to_string(),
						)
					},
					_ => None,
				}
			},
			_ => None,
		}
	}
}

/// Convert an error into a [`Response`]
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		error!("{self:?}");

		let message = self.to_string();

		let data = serde_json::json!({
			"message": message,
			"code": self.code(),
			"info": self.info(),
		});

		let status = match &self {
			Self::Duplicate(_) => StatusCode::CONFLICT,
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
			Self::BookingError(e) => {
				match e {
					// The stale-read races the admission protocol closes
					BookingError::SlotTaken
					| BookingError::IntervalBlocked
					| BookingError::EventConflict(_)
					| BookingError::HoldExpired(_)
					| BookingError::InvalidTransition { .. } => {
						StatusCode::CONFLICT
					},
					_ => StatusCode::BAD_REQUEST,
				}
			},
		};

		(status, axum::Json(data)).into_response()
	}
}

/// Rejection reasons of the booking admission protocol
///
/// Every variant is distinguishable by the caller so the UI can explain
/// why a slot that looked available failed on submission.
#[derive(Debug, Error)]
pub enum BookingError {
	/// The turf has been disabled by an operator
	#[error("this turf is currently not taking bookings")]
	TurfDisabled(Option<String>),
	/// The requested interval leaves the operating window
	#[error("the requested time falls outside the operating hours")]
	OutsideOperatingHours { opening: NaiveTime, closing: NaiveTime },
	/// Fewer slots than the turf minimum
	#[error("the requested duration is too short")]
	TooShort(i32),
	/// More slots than the turf maximum
	#[error("the requested duration is too long")]
	TooLong(i32),
	/// The requested start has already passed
	#[error("this slot has already started")]
	PastSlot,
	/// The requested interval overlaps a blocked time
	#[error("this time has been blocked by the operator")]
	IntervalBlocked,
	/// The requested interval overlaps a scheduled event
	#[error("an event occupies this time")]
	EventConflict(String),
	/// The requested interval overlaps a confirmed or held booking
	#[error("this slot just became unavailable")]
	SlotTaken,
	/// The hold lapsed before the payment signal arrived
	#[error("the hold on this booking has expired")]
	HoldExpired(NaiveDateTime),
	/// The booking is in a terminal state and cannot transition
	#[error("this booking can no longer change state")]
	InvalidTransition { from: String, to: String },
}

/// A list of possible internal errors
///
/// API end users should never see these details
#[derive(Debug, Error)]
pub enum InternalServerError {
	/// Unknown database constraint violation
	#[error("constraint error -- {0:?}")]
	ConstraintError(String),
	/// Error executing some database operation
	#[error("database error -- {0:?}")]
	DatabaseError(diesel::result::Error),
	/// Error interacting with a database connection
	#[error("database interaction error -- {0:?}")]
	DatabaseInteractionError(deadpool_diesel::InteractError),
	/// Error acquiring database pool connection
	#[error("database pool error -- {0:?}")]
	PoolError(deadpool_diesel::PoolError),
	/// Error related to `serde_json`
	#[error("serde_json error -- {0:?}")]
	SerdeJsonError(serde_json::Error),
}

// Map internal server errors to application errors
impl From<InternalServerError> for Error {
	fn from(value: InternalServerError) -> Self {
		error!("internal server error -- {value}");

		Self::InternalServerError
	}
}

/// Map validation errors to application errors
impl From<validator::ValidationErrors> for Error {
	fn from(err: validator::ValidationErrors) -> Self {
		let errs = err.field_errors();
		let repr = errs
			.values()
			.map(|v| {
				v.iter()
					.map(ToString::to_string)
					.collect::<Vec<String>>()
					.join("\n")
			})
			.collect::<Vec<String>>()
			.join("\n");

		Self::ValidationError(repr)
	}
}

/// Map database interaction errors to application errors
impl From<deadpool_diesel::InteractError> for Error {
	fn from(value: deadpool_diesel::InteractError) -> Self {
		InternalServerError::DatabaseInteractionError(value).into()
	}
}

/// Map database result errors to application errors.
impl From<diesel::result::Error> for Error {
	fn from(err: diesel::result::Error) -> Self {
		match &err {
			// No rows returned by query that expected at least one
			diesel::result::Error::NotFound => {
				Self::NotFound("no context provided".to_string())
			},
			// Unique constraint violation
			diesel::result::Error::DatabaseError(
				diesel::result::DatabaseErrorKind::UniqueViolation,
				info,
			) => {
				let constraint_name =
					info.constraint_name().unwrap_or("unknown");

				match constraint_name {
					"customer_phone_key" => {
						Self::Duplicate("phone is already in use".to_string())
					},
					"blocked_entry_turf_id_start_date_key" => {
						Self::Duplicate(
							"a blocked entry already exists for this date"
								.to_string(),
						)
					},
					_ => {
						InternalServerError::ConstraintError(
							constraint_name.to_string(),
						)
						.into()
					},
				}
			},
			// Foreign key constraint violation
			diesel::result::Error::DatabaseError(
				diesel::result::DatabaseErrorKind::ForeignKeyViolation,
				info,
			) => Error::ValidationError(info.message().to_string()),
			_ => InternalServerError::DatabaseError(err).into(),
		}
	}
}

impl From<deadpool_diesel::PoolError> for Error {
	fn from(value: deadpool_diesel::PoolError) -> Self {
		InternalServerError::PoolError(value).into()
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		InternalServerError::SerdeJsonError(err).into()
	}
}

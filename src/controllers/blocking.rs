use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::models::BlockedEntry;
use crate::operator::Operator;
use crate::schemas::blocking::{
	BlockTimesRequest,
	BlockedEntryResponse,
	UnblockTimeRequest,
};
use crate::{DbPool, Error};

/// List a turf's blocked entries
#[instrument(skip(pool))]
pub async fn get_blocked_entries(
	State(pool): State<DbPool>,
	_operator: Operator,
	Path(turf_id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let entries = BlockedEntry::for_turf(turf_id, &conn).await?;
	let response: Vec<BlockedEntryResponse> =
		entries.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Block times on a date, merging into the existing entry if present
#[instrument(skip(pool))]
pub async fn block_times(
	State(pool): State<DbPool>,
	operator: Operator,
	Path(turf_id): Path<i32>,
	Json(request): Json<BlockTimesRequest>,
) -> Result<impl IntoResponse, Error> {
	let mutation = request.to_mutation(turf_id, operator.0)?;

	let conn = pool.get().await?;

	let entry = mutation.apply(&conn).await?;
	let response = BlockedEntryResponse::from(entry);

	Ok((StatusCode::OK, Json(response)))
}

/// Remove one blocked time or range; an emptied entry is deleted
#[instrument(skip(pool))]
pub async fn unblock_time(
	State(pool): State<DbPool>,
	_operator: Operator,
	Path(turf_id): Path<i32>,
	Json(request): Json<UnblockTimeRequest>,
) -> Result<impl IntoResponse, Error> {
	let mutation = request.to_mutation(turf_id)?;

	let conn = pool.get().await?;

	let remaining = mutation.apply(&conn).await?;

	match remaining {
		Some(entry) => {
			let response = BlockedEntryResponse::from(entry);

			Ok((StatusCode::OK, Json(response)).into_response())
		},
		None => Ok(StatusCode::NO_CONTENT.into_response()),
	}
}

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::models::{Turf, UpdateTurf};
use crate::operator::Operator;
use crate::schemas::turf::{CreateTurfRequest, TurfResponse};
use crate::{DbPool, Error};

/// List all turfs
#[instrument(skip(pool))]
pub async fn get_turfs(
	State(pool): State<DbPool>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let turfs = Turf::get_all(&conn).await?;
	let response: Vec<TurfResponse> =
		turfs.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Get a single turf
#[instrument(skip(pool))]
pub async fn get_turf(
	State(pool): State<DbPool>,
	Path(turf_id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let turf = Turf::get_by_id(turf_id, &conn).await?;
	let response = TurfResponse::from(turf);

	Ok((StatusCode::OK, Json(response)))
}

/// Create a turf
#[instrument(skip(pool, request))]
pub async fn create_turf(
	State(pool): State<DbPool>,
	_operator: Operator,
	Json(request): Json<CreateTurfRequest>,
) -> Result<impl IntoResponse, Error> {
	let new_turf = request.to_insertable()?;

	let conn = pool.get().await?;

	let turf = new_turf.insert(&conn).await?;
	let response = TurfResponse::from(turf);

	Ok((StatusCode::CREATED, Json(response)))
}

/// Update a turf, including disabling it with a reason
#[instrument(skip(pool))]
pub async fn update_turf(
	State(pool): State<DbPool>,
	_operator: Operator,
	Path(turf_id): Path<i32>,
	Json(request): Json<UpdateTurf>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let turf = request.apply_to(turf_id, &conn).await?;
	let response = TurfResponse::from(turf);

	Ok((StatusCode::OK, Json(response)))
}

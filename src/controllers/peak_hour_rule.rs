use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::models::PeakHourRule;
use crate::operator::Operator;
use crate::schemas::peak_hour_rule::{
	CreatePeakHourRuleRequest,
	PeakHourRuleResponse,
};
use crate::{DbPool, Error};

/// List a turf's peak hour rules
#[instrument(skip(pool))]
pub async fn get_peak_hour_rules(
	State(pool): State<DbPool>,
	Path(turf_id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let rules = PeakHourRule::for_turf(turf_id, &conn).await?;
	let response: Vec<PeakHourRuleResponse> =
		rules.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Create a peak hour rule
///
/// Collisions with an existing rule of the same kind are rejected here
/// so the pricing resolver can trust stored rules to be unambiguous.
#[instrument(skip(pool, request))]
pub async fn create_peak_hour_rule(
	State(pool): State<DbPool>,
	_operator: Operator,
	Path(turf_id): Path<i32>,
	Json(request): Json<CreatePeakHourRuleRequest>,
) -> Result<impl IntoResponse, Error> {
	let new_rule = request.to_insertable(turf_id)?;

	let conn = pool.get().await?;

	let rule = new_rule.insert(&conn).await?;
	let response = PeakHourRuleResponse::from(rule);

	Ok((StatusCode::CREATED, Json(response)))
}

/// Delete a peak hour rule
#[instrument(skip(pool))]
pub async fn delete_peak_hour_rule(
	State(pool): State<DbPool>,
	_operator: Operator,
	Path((_turf_id, rule_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	PeakHourRule::delete_by_id(rule_id, &conn).await?;

	Ok(StatusCode::NO_CONTENT)
}

//! Authenticated operator identity
//!
//! Authentication itself lives in the upstream proxy; by the time a
//! request reaches this service the proxy has already verified the
//! operator and installed their id in the `x-operator-id` header. The
//! extractor only makes that identity available as a typed parameter.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::Error;

pub const OPERATOR_ID_HEADER: &str = "x-operator-id";

/// The operator behind an administrative request
///
/// ```rs
/// pub async fn foo_route(operator: Operator) -> impl IntoResponse {
///     println!("{:?}", operator.0);
///
///     ()
/// }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Operator(pub i32);

impl<S> FromRequestParts<S> for Operator
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		parts
			.headers
			.get(OPERATOR_ID_HEADER)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.parse::<i32>().ok())
			.map(Self)
			.ok_or(Error::Forbidden)
	}
}

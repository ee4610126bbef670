use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, post};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::controllers::availability::get_availability;
use crate::controllers::blocking::{
	block_times,
	get_blocked_entries,
	unblock_time,
};
use crate::controllers::booking::{
	apply_payment_signal,
	cancel_booking,
	create_booking,
	get_booking,
	get_bookings_for_date,
};
use crate::controllers::event::{cancel_event, create_event, get_events};
use crate::controllers::healthcheck;
use crate::controllers::peak_hour_rule::{
	create_peak_hour_rule,
	delete_peak_hour_rule,
	get_peak_hour_rules,
};
use crate::controllers::turf::{create_turf, get_turf, get_turfs, update_turf};

/// Get the app router
pub fn get_app_router(state: AppState) -> Router {
	let timeout = Duration::from_secs(state.config.request_timeout_seconds);

	let api_routes = Router::new()
		.route("/healthcheck", get(healthcheck))
		.nest("/turfs", turf_routes())
		.nest("/bookings", booking_routes())
		.nest("/events", event_routes());

	Router::new()
		.merge(api_routes)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::new(timeout))
				.layer(CompressionLayer::new())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

/// Turf routes: metadata, availability, admission, operator mutations
fn turf_routes() -> Router<AppState> {
	Router::new()
		.route("/", get(get_turfs).post(create_turf))
		.route("/{id}", get(get_turf).patch(update_turf))
		.route("/{id}/availability", get(get_availability))
		.route(
			"/{id}/bookings",
			get(get_bookings_for_date).post(create_booking),
		)
		.route(
			"/{id}/blocks",
			get(get_blocked_entries).post(block_times).delete(unblock_time),
		)
		.route(
			"/{id}/peak-hour-rules",
			get(get_peak_hour_rules).post(create_peak_hour_rule),
		)
		.route("/{id}/peak-hour-rules/{rule_id}", delete(delete_peak_hour_rule))
		.route("/{id}/events", get(get_events).post(create_event))
}

/// Booking lifecycle routes
fn booking_routes() -> Router<AppState> {
	Router::new()
		.route("/{id}", get(get_booking))
		.route("/{id}/payment", post(apply_payment_signal))
		.route("/{id}/cancel", post(cancel_booking))
}

/// Event lifecycle routes
fn event_routes() -> Router<AppState> {
	Router::new().route("/{id}/cancel", post(cancel_event))
}

use chrono::TimeDelta;
use deadpool_diesel::postgres::{Manager, Pool};

#[derive(Clone, Debug)]
pub struct Config {
	pub database_url: String,

	/// How long a held booking keeps its slot while the customer pays
	pub hold_grace:  TimeDelta,
	/// Minimum age before the reaper deletes an abandoned hold
	pub reap_window: TimeDelta,

	pub request_timeout_seconds: u64,
}

impl Config {
	fn get_env_var(var: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| panic!("{var} must be set"))
	}

	fn get_env_var_or(var: &str, default: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| default.to_string())
	}

	/// Create a new [`Config`] from environment variables
	///
	/// # Panics
	/// Panics if an environment variable is missing or malformed
	#[must_use]
	pub fn from_env() -> Self {
		let database_url = Self::get_env_var("DATABASE_URL");

		let hold_grace = TimeDelta::minutes(
			Self::get_env_var_or("HOLD_GRACE_MINUTES", "5")
				.parse::<i64>()
				.unwrap(),
		);

		// Defaults to the grace window so housekeeping only ever removes
		// holds that are already expired for the overlap checks
		let reap_window = TimeDelta::minutes(
			Self::get_env_var_or("REAP_WINDOW_MINUTES", "5")
				.parse::<i64>()
				.unwrap(),
		);

		let request_timeout_seconds =
			Self::get_env_var_or("REQUEST_TIMEOUT_SECONDS", "10")
				.parse::<u64>()
				.unwrap();

		Self { database_url, hold_grace, reap_window, request_timeout_seconds }
	}

	/// Create a database pool for the given config
	///
	/// # Panics
	/// Panics if creating the pool fails
	#[must_use]
	pub fn create_database_pool(&self) -> Pool {
		let manager = Manager::new(
			self.database_url.to_string(),
			deadpool_diesel::Runtime::Tokio1,
		);

		Pool::builder(manager).build().unwrap()
	}
}

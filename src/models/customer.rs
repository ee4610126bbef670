use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::upsert::excluded;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::schema::customer;

/// A booking customer, identified by their phone number
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = customer)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
	pub id:         i32,
	pub name:       String,
	pub phone:      String,
	pub email:      Option<String>,
	pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = customer)]
pub struct NewCustomer {
	pub name:  String,
	pub phone: String,
	pub email: Option<String>,
}

impl NewCustomer {
	/// Resolve or create the customer for this contact identity
	///
	/// Walk-in and guest flows re-submit the same phone number, so the
	/// upsert must be idempotent; name and email follow the latest booking.
	pub(crate) fn upsert_sync(
		self,
		conn: &mut PgConnection,
	) -> Result<Customer, Error> {
		use self::customer::dsl::*;

		let result = diesel::insert_into(customer)
			.values(&self)
			.on_conflict(phone)
			.do_update()
			.set((name.eq(excluded(name)), email.eq(excluded(email))))
			.returning(Customer::as_returning())
			.get_result(conn)?;

		Ok(result)
	}
}

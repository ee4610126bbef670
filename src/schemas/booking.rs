use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;
use validator_derive::Validate;

use crate::Error;
use crate::models::{
	Booking,
	BookingAdmission,
	BookingStatus,
	Customer,
	NewCustomer,
	PaymentMethod,
	PaymentOutcome,
};

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
	pub date:           NaiveDate,
	pub start_time:     NaiveTime,
	#[validate(range(
		min = 1,
		message = "a booking must cover at least one slot",
		code = "duration-slots"
	))]
	pub duration_slots: i32,
	pub payment_method: PaymentMethod,
	#[validate(length(
		min = 2,
		max = 100,
		message = "name must be between 2 and 100 characters long",
		code = "customer-name-length"
	))]
	pub customer_name:  String,
	#[validate(length(
		min = 7,
		max = 20,
		message = "phone must be between 7 and 20 characters long",
		code = "customer-phone-length"
	))]
	pub customer_phone: String,
	#[validate(email(message = "invalid email", code = "customer-email"))]
	pub customer_email: Option<String>,
}

impl CreateBookingRequest {
	pub fn to_admission(self, turf_id: i32) -> Result<BookingAdmission, Error> {
		self.validate()?;

		Ok(BookingAdmission {
			turf_id,
			date: self.date,
			start_time: self.start_time,
			duration_slots: self.duration_slots,
			payment_method: self.payment_method,
			customer: NewCustomer {
				name:  self.customer_name,
				phone: self.customer_phone,
				email: self.customer_email,
			},
		})
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSignalRequest {
	pub outcome: PaymentOutcome,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingRequest {
	#[serde(default)]
	pub refund: bool,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
	pub id:              i32,
	pub turf_id:         i32,
	pub date:            NaiveDate,
	pub start_time:      NaiveTime,
	pub end_time:        NaiveTime,
	pub duration_slots:  i32,
	pub total_price:     i32,
	pub status:          BookingStatus,
	pub payment_method:  PaymentMethod,
	pub hold_expires_at: Option<NaiveDateTime>,
	pub created_at:      NaiveDateTime,
	pub customer:        Option<CustomerResponse>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
	pub id:    i32,
	pub name:  String,
	pub phone: String,
	pub email: Option<String>,
}

impl From<Customer> for CustomerResponse {
	fn from(value: Customer) -> Self {
		Self {
			id:    value.id,
			name:  value.name,
			phone: value.phone,
			email: value.email,
		}
	}
}

impl From<Booking> for BookingResponse {
	fn from(value: Booking) -> Self {
		Self {
			id:              value.id,
			turf_id:         value.turf_id,
			date:            value.date,
			start_time:      value.start_time,
			end_time:        value.end_time,
			duration_slots:  value.duration_slots,
			total_price:     value.total_price,
			status:          value.status,
			payment_method:  value.payment_method,
			hold_expires_at: value.hold_expires_at,
			created_at:      value.created_at,
			customer:        None,
		}
	}
}

impl From<(Booking, Customer)> for BookingResponse {
	fn from(value: (Booking, Customer)) -> Self {
		let mut response = Self::from(value.0);
		response.customer = Some(value.1.into());

		response
	}
}

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::BigInt;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

use crate::interval::{minutes_of, overlaps, time_of};
use crate::models::{
	BlockedEntry,
	Customer,
	Event,
	NewCustomer,
	PeakHourRule,
	Turf,
};
use crate::schema::{booking, customer};
use crate::{BookingError, DbConn, Error, pricing};

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::BookingStatus"]
#[serde(rename_all = "camelCase")]
pub enum BookingStatus {
	#[default]
	Held,
	Confirmed,
	Cancelled,
	Expired,
	Rejected,
	Refunded,
}

impl BookingStatus {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Held => "held",
			Self::Confirmed => "confirmed",
			Self::Cancelled => "cancelled",
			Self::Expired => "expired",
			Self::Rejected => "rejected",
			Self::Refunded => "refunded",
		}
	}
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::PaymentMethod"]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
	#[default]
	Cash,
	Online,
}

/// The payment gateway's verdict on a held booking
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentOutcome {
	Success,
	Failure,
	Cancelled,
}

/// A reservation of one turf interval on one date
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = booking)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
	pub id:              i32,
	pub turf_id:         i32,
	pub customer_id:     i32,
	pub date:            NaiveDate,
	pub start_time:      NaiveTime,
	pub end_time:        NaiveTime,
	pub duration_slots:  i32,
	pub total_price:     i32,
	pub status:          BookingStatus,
	pub payment_method:  PaymentMethod,
	pub hold_expires_at: Option<NaiveDateTime>,
	pub created_at:      NaiveDateTime,
	pub updated_at:      NaiveDateTime,
}

impl Booking {
	/// Whether this booking occupies its interval at instant `now`
	///
	/// Confirmed bookings always occupy. Held bookings occupy until their
	/// hold expiry passes; after that they are invisible to every overlap
	/// check even if the reaper has not deleted the row yet.
	#[must_use]
	pub fn occupies(&self, now: NaiveDateTime) -> bool {
		match self.status {
			BookingStatus::Confirmed => true,
			BookingStatus::Held => {
				self.hold_expires_at.is_some_and(|expiry| expiry > now)
			},
			_ => false,
		}
	}

	/// Get a [`Booking`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let found = conn
			.interact(move |conn| {
				use crate::schema::booking::dsl::*;

				booking.find(b_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(found)
	}

	/// Get all bookings for a turf and date that could occupy a slot
	#[instrument(skip(conn))]
	pub async fn occupying_for_date(
		t_id: i32,
		on_date: NaiveDate,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let bookings = conn
			.interact(move |conn| Self::occupying_for_date_sync(t_id, on_date, conn))
			.await??;

		Ok(bookings)
	}

	/// Transaction-scoped variant of [`Booking::occupying_for_date`]
	///
	/// Loads every confirmed or held row; expiry is judged in Rust against
	/// a single `now` so the decision cannot straddle a clock read.
	pub(crate) fn occupying_for_date_sync(
		t_id: i32,
		on_date: NaiveDate,
		conn: &mut PgConnection,
	) -> Result<Vec<Self>, Error> {
		use crate::schema::booking::dsl::*;

		let bookings = booking
			.filter(turf_id.eq(t_id))
			.filter(date.eq(on_date))
			.filter(
				status
					.eq(BookingStatus::Confirmed)
					.or(status.eq(BookingStatus::Held)),
			)
			.select(Self::as_select())
			.load(conn)?;

		Ok(bookings)
	}

	/// Get all bookings for a turf and date, joined with their customers
	#[instrument(skip(conn))]
	pub async fn for_date_with_customers(
		t_id: i32,
		on_date: NaiveDate,
		conn: &DbConn,
	) -> Result<Vec<(Self, Customer)>, Error> {
		let bookings = conn
			.interact(move |conn| {
				booking::table
					.inner_join(customer::table)
					.filter(booking::turf_id.eq(t_id))
					.filter(booking::date.eq(on_date))
					.order(booking::start_time.asc())
					.select((Self::as_select(), Customer::as_select()))
					.load(conn)
			})
			.await??;

		Ok(bookings)
	}

	/// Delete abandoned holds for a turf
	///
	/// Housekeeping only: correctness always comes from the hold-expiry
	/// comparison in [`Booking::occupies`], this merely keeps the table
	/// from accumulating dead rows.
	#[instrument(skip(conn))]
	pub async fn reap_stale_holds(
		t_id: i32,
		reap_window: TimeDelta,
		conn: &DbConn,
	) -> Result<usize, Error> {
		let reaped = conn
			.interact(move |conn| {
				Self::reap_stale_holds_sync(t_id, reap_window, conn)
			})
			.await??;

		Ok(reaped)
	}

	pub(crate) fn reap_stale_holds_sync(
		t_id: i32,
		reap_window: TimeDelta,
		conn: &mut PgConnection,
	) -> Result<usize, Error> {
		use crate::schema::booking::dsl::*;

		let cutoff = Utc::now().naive_utc() - reap_window;

		let reaped = diesel::delete(
			booking
				.filter(turf_id.eq(t_id))
				.filter(status.eq(BookingStatus::Held))
				.filter(created_at.lt(cutoff)),
		)
		.execute(conn)?;

		if reaped > 0 {
			info!("reaped {reaped} stale holds for turf {t_id}");
		}

		Ok(reaped)
	}

	/// Apply the external payment signal to a held booking
	///
	/// This is the only way a held booking leaves the held state other
	/// than expiry. A signal for a hold that has already lapsed marks it
	/// expired instead of resurrecting it.
	#[instrument(skip(conn))]
	pub async fn apply_payment_signal(
		b_id: i32,
		outcome: PaymentOutcome,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let updated = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let current: Self = {
						use crate::schema::booking::dsl::*;

						booking
							.find(b_id)
							.select(Self::as_select())
							.get_result(conn)?
					};

					if current.status != BookingStatus::Held {
						return Err(BookingError::InvalidTransition {
							from: current.status.as_str().to_string(),
							to:   outcome_status(outcome).as_str().to_string(),
						}
						.into());
					}

					let now = Utc::now().naive_utc();

					if outcome == PaymentOutcome::Success
						&& let Some(expiry) = current.hold_expires_at
						&& expiry <= now
					{
						Self::transition_sync(
							b_id,
							BookingStatus::Expired,
							conn,
						)?;

						return Err(BookingError::HoldExpired(expiry).into());
					}

					Self::transition_sync(b_id, outcome_status(outcome), conn)
				})
			})
			.await??;

		info!(
			"booking {} left held state: {}",
			updated.id,
			updated.status.as_str()
		);

		Ok(updated)
	}

	/// Cancel a held or confirmed booking
	///
	/// A confirmed booking that has already been paid out moves to
	/// refunded when `refund` is set.
	#[instrument(skip(conn))]
	pub async fn cancel(
		b_id: i32,
		refund: bool,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let cancelled = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let current: Self = {
						use crate::schema::booking::dsl::*;

						booking
							.find(b_id)
							.select(Self::as_select())
							.get_result(conn)?
					};

					let target = match (current.status, refund) {
						(BookingStatus::Held, _) => BookingStatus::Cancelled,
						(BookingStatus::Confirmed, false) => {
							BookingStatus::Cancelled
						},
						(BookingStatus::Confirmed, true) => {
							BookingStatus::Refunded
						},
						(from, _) => {
							return Err(BookingError::InvalidTransition {
								from: from.as_str().to_string(),
								to:   BookingStatus::Cancelled
									.as_str()
									.to_string(),
							}
							.into());
						},
					};

					Self::transition_sync(b_id, target, conn)
				})
			})
			.await??;

		info!("cancelled booking {}", cancelled.id);

		Ok(cancelled)
	}

	fn transition_sync(
		b_id: i32,
		target: BookingStatus,
		conn: &mut PgConnection,
	) -> Result<Self, Error> {
		use crate::schema::booking::dsl::*;

		let updated = diesel::update(booking.find(b_id))
			.set((
				status.eq(target),
				hold_expires_at.eq(None::<NaiveDateTime>),
				updated_at.eq(diesel::dsl::now),
			))
			.returning(Self::as_returning())
			.get_result(conn)?;

		Ok(updated)
	}
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = booking)]
struct InsertableBooking {
	turf_id:         i32,
	customer_id:     i32,
	date:            NaiveDate,
	start_time:      NaiveTime,
	end_time:        NaiveTime,
	duration_slots:  i32,
	total_price:     i32,
	status:          BookingStatus,
	payment_method:  PaymentMethod,
	hold_expires_at: Option<NaiveDateTime>,
}

/// One admission attempt for a turf interval
///
/// [`BookingAdmission::admit`] is the single place the no-double-booking
/// invariant is enforced; everything else in the crate is a lock-free
/// reader whose results it re-validates.
#[derive(Clone, Debug)]
pub struct BookingAdmission {
	pub turf_id:        i32,
	pub date:           NaiveDate,
	pub start_time:     NaiveTime,
	pub duration_slots: i32,
	pub payment_method: PaymentMethod,
	pub customer:       NewCustomer,
}

impl BookingAdmission {
	/// Run the admission protocol and create a held booking
	///
	/// The whole protocol runs in one transaction holding the advisory
	/// lock for this (turf, date), so concurrent attempts on the same day
	/// are totally ordered: the first to pass re-validation wins the slot
	/// and every later overlapping attempt observes its row.
	#[instrument(skip(conn))]
	pub async fn admit(
		self,
		hold_grace: TimeDelta,
		reap_window: TimeDelta,
		conn: &DbConn,
	) -> Result<Booking, Error> {
		let created = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					self.admit_sync(hold_grace, reap_window, conn)
				})
			})
			.await??;

		info!(
			"held booking {} for turf {} on {} [{} - {})",
			created.id,
			created.turf_id,
			created.date,
			created.start_time,
			created.end_time,
		);

		Ok(created)
	}

	fn admit_sync(
		self,
		hold_grace: TimeDelta,
		reap_window: TimeDelta,
		conn: &mut PgConnection,
	) -> Result<Booking, Error> {
		acquire_admission_lock(self.turf_id, self.date, conn)?;

		let now = Utc::now().naive_utc();

		let turf = Turf::get_sync(self.turf_id, conn)?;
		if !turf.is_active {
			return Err(BookingError::TurfDisabled(turf.disabled_reason).into());
		}

		let end_time =
			booking_window(&turf, self.start_time, self.duration_slots)?;
		ensure_not_past(self.date, self.start_time, now)?;

		let requester = self.customer.upsert_sync(conn)?;

		// Re-validation: the availability read that led the client here
		// happened outside the lock and may be stale.
		let entries =
			BlockedEntry::covering_date_sync(self.turf_id, self.date, conn)?;
		ensure_unblocked(&entries, turf.slot_minutes, self.start_time, end_time)?;

		let events =
			Event::active_for_date_sync(self.turf_id, self.date, conn)?;
		ensure_no_event(&events, self.date, self.start_time, end_time)?;

		Booking::reap_stale_holds_sync(self.turf_id, reap_window, conn)?;

		let existing =
			Booking::occupying_for_date_sync(self.turf_id, self.date, conn)?;
		ensure_interval_free(&existing, self.start_time, end_time, now)?;

		let rules = PeakHourRule::for_turf_sync(self.turf_id, conn)?;
		let total_price = pricing::total_price(
			&turf,
			&rules,
			self.date,
			self.start_time,
			self.duration_slots,
		);

		let new_booking = InsertableBooking {
			turf_id:         self.turf_id,
			customer_id:     requester.id,
			date:            self.date,
			start_time:      self.start_time,
			end_time,
			duration_slots:  self.duration_slots,
			total_price,
			status:          BookingStatus::Held,
			payment_method:  self.payment_method,
			hold_expires_at: Some(now + hold_grace),
		};

		let created = diesel::insert_into(booking::table)
			.values(new_booking)
			.returning(Booking::as_returning())
			.get_result(conn)?;

		Ok(created)
	}
}

/// Serialize all admission attempts for one (turf, date)
///
/// `pg_advisory_xact_lock` blocks until the key is free and releases on
/// commit or rollback, so an aborted request can never leave a stuck
/// lock. Turf id lives in the high 32 bits, the day ordinal in the low
/// 32: different turfs or dates never contend.
fn acquire_admission_lock(
	t_id: i32,
	date: NaiveDate,
	conn: &mut PgConnection,
) -> Result<(), Error> {
	let key = (i64::from(t_id) << 32) | i64::from(date.num_days_from_ce());

	sql_query("SELECT pg_advisory_xact_lock($1)")
		.bind::<BigInt, _>(key)
		.execute(conn)?;

	Ok(())
}

/// Derive the end time and enforce the operating-window bounds
pub(crate) fn booking_window(
	turf: &Turf,
	start: NaiveTime,
	duration_slots: i32,
) -> Result<NaiveTime, BookingError> {
	if duration_slots < turf.min_slots {
		return Err(BookingError::TooShort(turf.min_slots));
	}
	if duration_slots > turf.max_slots {
		return Err(BookingError::TooLong(turf.max_slots));
	}

	let end_minutes = minutes_of(start) + duration_slots * turf.slot_minutes;

	if start < turf.opening_time || end_minutes > minutes_of(turf.closing_time)
	{
		return Err(BookingError::OutsideOperatingHours {
			opening: turf.opening_time,
			closing: turf.closing_time,
		});
	}

	Ok(time_of(end_minutes))
}

pub(crate) fn ensure_not_past(
	date: NaiveDate,
	start: NaiveTime,
	now: NaiveDateTime,
) -> Result<(), BookingError> {
	if date < now.date() || (date == now.date() && start <= now.time()) {
		return Err(BookingError::PastSlot);
	}

	Ok(())
}

pub(crate) fn ensure_unblocked(
	entries: &[BlockedEntry],
	slot_minutes: i32,
	start: NaiveTime,
	end: NaiveTime,
) -> Result<(), BookingError> {
	if entries.iter().any(|entry| entry.blocks(start, end, slot_minutes)) {
		return Err(BookingError::IntervalBlocked);
	}

	Ok(())
}

pub(crate) fn ensure_no_event(
	events: &[Event],
	date: NaiveDate,
	start: NaiveTime,
	end: NaiveTime,
) -> Result<(), BookingError> {
	if let Some(event) =
		events.iter().find(|event| event.occupies(date, start, end))
	{
		return Err(BookingError::EventConflict(event.title.clone()));
	}

	Ok(())
}

pub(crate) fn ensure_interval_free(
	existing: &[Booking],
	start: NaiveTime,
	end: NaiveTime,
	now: NaiveDateTime,
) -> Result<(), BookingError> {
	let taken = existing.iter().any(|other| {
		other.occupies(now)
			&& overlaps(start, end, other.start_time, other.end_time)
	});

	if taken {
		return Err(BookingError::SlotTaken);
	}

	Ok(())
}

fn outcome_status(outcome: PaymentOutcome) -> BookingStatus {
	match outcome {
		PaymentOutcome::Success => BookingStatus::Confirmed,
		PaymentOutcome::Failure => BookingStatus::Rejected,
		PaymentOutcome::Cancelled => BookingStatus::Cancelled,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn t(h: u32, m: u32) -> NaiveTime {
		NaiveTime::from_hms_opt(h, m, 0).unwrap()
	}

	fn dt(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
		date.and_time(t(h, m))
	}

	fn turf() -> Turf {
		Turf {
			id: 1,
			name: "center pitch".to_string(),
			description: None,
			opening_time: t(6, 0),
			closing_time: t(22, 0),
			slot_minutes: 60,
			min_slots: 1,
			max_slots: 4,
			base_price: 1000,
			weekday_pricing: false,
			weekday_morning_start: None,
			weekday_morning_price: None,
			weekday_evening_start: None,
			weekday_evening_price: None,
			weekend_pricing: false,
			weekend_morning_start: None,
			weekend_morning_price: None,
			weekend_evening_start: None,
			weekend_evening_price: None,
			is_active: true,
			disabled_reason: None,
			created_at: NaiveDateTime::default(),
			updated_at: NaiveDateTime::default(),
		}
	}

	fn booking_row(
		start: NaiveTime,
		end: NaiveTime,
		status: BookingStatus,
		hold_expires_at: Option<NaiveDateTime>,
	) -> Booking {
		Booking {
			id: 1,
			turf_id: 1,
			customer_id: 1,
			date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
			start_time: start,
			end_time: end,
			duration_slots: 1,
			total_price: 1000,
			status,
			payment_method: PaymentMethod::Online,
			hold_expires_at,
			created_at: NaiveDateTime::default(),
			updated_at: NaiveDateTime::default(),
		}
	}

	#[test]
	fn window_is_derived_and_bounded() {
		let turf = turf();

		assert_eq!(booking_window(&turf, t(17, 0), 2).unwrap(), t(19, 0));

		// Final slot of the day is fine, one past it is not
		assert_eq!(booking_window(&turf, t(21, 0), 1).unwrap(), t(22, 0));
		assert!(matches!(
			booking_window(&turf, t(21, 0), 2),
			Err(BookingError::OutsideOperatingHours { .. })
		));
		assert!(matches!(
			booking_window(&turf, t(5, 0), 1),
			Err(BookingError::OutsideOperatingHours { .. })
		));
	}

	#[test]
	fn window_enforces_slot_count_limits() {
		let turf = turf();

		assert!(matches!(
			booking_window(&turf, t(10, 0), 0),
			Err(BookingError::TooShort(1))
		));
		assert!(matches!(
			booking_window(&turf, t(10, 0), 5),
			Err(BookingError::TooLong(4))
		));
	}

	#[test]
	fn past_slots_are_rejected_on_the_current_date() {
		let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let now = dt(today, 10, 30);

		// The slot that is technically still running counts as past
		assert!(matches!(
			ensure_not_past(today, t(10, 0), now),
			Err(BookingError::PastSlot)
		));
		assert!(matches!(
			ensure_not_past(today.pred_opt().unwrap(), t(18, 0), now),
			Err(BookingError::PastSlot)
		));
		assert!(ensure_not_past(today, t(11, 0), now).is_ok());
		assert!(ensure_not_past(today.succ_opt().unwrap(), t(6, 0), now).is_ok());
	}

	#[test]
	fn winners_row_rejects_overlapping_attempts() {
		// The loser of the admission race observes the winner's held row
		let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let now = dt(date, 9, 0);
		let winner = booking_row(
			t(10, 0),
			t(12, 0),
			BookingStatus::Held,
			Some(dt(date, 9, 5)),
		);

		assert!(matches!(
			ensure_interval_free(&[winner.clone()], t(11, 0), t(13, 0), now),
			Err(BookingError::SlotTaken)
		));

		// Non-overlapping intervals on the same day are unaffected
		assert!(ensure_interval_free(&[winner], t(12, 0), t(13, 0), now).is_ok());
	}

	#[test]
	fn expired_holds_are_invisible_to_the_conflict_check() {
		let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let expired = booking_row(
			t(10, 0),
			t(11, 0),
			BookingStatus::Held,
			Some(dt(date, 9, 0)),
		);

		let before_expiry = dt(date, 8, 30);
		assert!(matches!(
			ensure_interval_free(
				&[expired.clone()],
				t(10, 0),
				t(11, 0),
				before_expiry
			),
			Err(BookingError::SlotTaken)
		));

		// Once the expiry passes, the same attempt succeeds
		let after_expiry = dt(date, 9, 30);
		assert!(
			ensure_interval_free(&[expired], t(10, 0), t(11, 0), after_expiry)
				.is_ok()
		);
	}

	#[test]
	fn terminal_statuses_never_occupy() {
		let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let now = dt(date, 9, 0);

		for status in [
			BookingStatus::Cancelled,
			BookingStatus::Expired,
			BookingStatus::Rejected,
			BookingStatus::Refunded,
		] {
			let row = booking_row(t(10, 0), t(11, 0), status, None);

			assert!(!row.occupies(now), "{status:?} must not occupy");
		}

		let confirmed =
			booking_row(t(10, 0), t(11, 0), BookingStatus::Confirmed, None);
		assert!(confirmed.occupies(now));
	}

	#[test]
	fn partially_blocked_interval_is_rejected() {
		// Operating 06:00-22:00, range 18:00-20:00 blocked: a 17:00 x 2h
		// attempt overlaps the blocked range with only its second half
		use crate::models::{TimeRange, TimeRangeList};

		let entry = BlockedEntry {
			id: 1,
			turf_id: 1,
			start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
			end_date: None,
			blocked_times: None,
			blocked_ranges: Some(TimeRangeList(vec![TimeRange {
				start: t(18, 0),
				end:   t(20, 0),
			}])),
			reason: None,
			created_by: 1,
			created_at: NaiveDateTime::default(),
			updated_at: NaiveDateTime::default(),
		};

		assert!(matches!(
			ensure_unblocked(&[entry.clone()], 60, t(17, 0), t(19, 0)),
			Err(BookingError::IntervalBlocked)
		));
		assert!(ensure_unblocked(&[entry], 60, t(16, 0), t(18, 0)).is_ok());
	}
}

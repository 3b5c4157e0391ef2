use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive calendar-day interval `[start, end]`.
///
/// All scheduling in this crate is date-only. Serialized dates may carry a
/// time component on the wire; the record layer strips it before anything
/// here ever sees it, so two ranges sharing a single calendar day overlap
/// regardless of time zone or hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end, "DateRange start must not be after end");
        Self { start, end }
    }

    /// Single-day range.
    pub fn day(d: NaiveDate) -> Self {
        Self { start: d, end: d }
    }

    /// Number of calendar days covered, counting both endpoints.
    /// A same-day range lasts 1 day; `[d, d+2]` lasts 3.
    pub fn duration_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(1)
    }

    /// Inclusive overlap: the ranges share at least one calendar day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains_day(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }

    /// Iterate every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            d.checked_add_days(Days::new(1)).filter(|next| *next <= end)
        })
    }

    /// Smallest range covering both `self` and `other`.
    pub fn hull(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Pickup,
    Sedan,
}

/// A fleet vehicle. Read-only within this crate: the catalog corrects
/// identities at load time, nothing here ever creates or mutates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u32,
    pub name: String,
    pub plate: String,
    #[serde(rename = "type")]
    pub kind: VehicleKind,
    pub capacity: u32,
    pub fuel_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// Trip-level contact and passenger data.
///
/// The first attendee is the primary contact and must equal `name` by the
/// time a reservation is composed; the lifecycle validation enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDetails {
    pub name: String,
    pub email: String,
    pub destination: String,
    pub attendees: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Single,
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelRoom {
    pub quantity: u32,
    #[serde(rename = "type")]
    pub kind: RoomKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelPassenger {
    pub name: String,
}

/// Lodging request attached to a reservation.
///
/// When `required` is false the remaining fields are semantically empty;
/// check-in/check-out still carry the trip dates so every stored record
/// has the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelDetails {
    pub required: bool,
    pub passengers: Vec<HotelPassenger>,
    pub rooms: Vec<HotelRoom>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub suggestions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounting_account: Option<String>,
}

impl HotelDetails {
    /// The schema-uniform "no lodging" record for a trip.
    pub fn not_required(trip: DateRange) -> Self {
        Self {
            required: false,
            passengers: Vec::new(),
            rooms: Vec::new(),
            check_in: trip.start,
            check_out: trip.end,
            suggestions: String::new(),
            accounting_account: None,
        }
    }
}

/// Opaque identity assigned by the reservation store on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub String);

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReservationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One booked trip. Immutable once created; cancellation deletes it whole.
///
/// `vehicle_name` is a snapshot taken at booking time — it is never
/// re-derived from the fleet, so later identity corrections do not rewrite
/// history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub vehicle_id: u32,
    pub vehicle_name: String,
    pub details: ReservationDetails,
    pub trip: DateRange,
    /// `Some` only when lodging was actually requested; the stored
    /// `{required: false}` record reads back as `None`.
    pub hotel: Option<HotelDetails>,
}

/// Create payload: a [`Reservation`] minus the store-assigned id. The
/// hotel sub-object is always present so the stored schema stays uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub vehicle_id: u32,
    pub vehicle_name: String,
    pub details: ReservationDetails,
    pub trip: DateRange,
    pub hotel: HotelDetails,
}

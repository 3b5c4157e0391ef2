//! Raw record shapes at the store boundary.
//!
//! The managed store has historically returned fields under two naming
//! conventions (`vehicle_id` vs `vehicleId`, `start_date` vs `startDate`,
//! and so on). Everything that crosses the wire lands in one of the record
//! types below, which accept both spellings, and is then normalized into
//! the canonical [`crate::model`] types exactly once. Nothing outside this
//! module ever sees a raw shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{
    DateRange, HotelDetails, HotelPassenger, HotelRoom, NewReservation, Reservation,
    ReservationDetails, ReservationId, Vehicle, VehicleKind,
};

/// Display name used when a reservation references a vehicle that is no
/// longer in the fleet.
pub const UNKNOWN_VEHICLE: &str = "Unknown vehicle";

/// Contact name used when a record carries neither a details block nor any
/// attendees.
pub const UNKNOWN_CONTACT: &str = "Unnamed";

#[derive(Debug, Clone, thiserror::Error)]
pub enum RecordError {
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unparseable calendar date `{0}`")]
    BadDate(String),
}

/// Parse a wire date: either a plain `YYYY-MM-DD` or a full RFC 3339
/// timestamp, of which only the calendar-date part is kept.
pub fn parse_wire_date(s: &str) -> Result<NaiveDate, RecordError> {
    let head = s.get(..10).ok_or_else(|| RecordError::BadDate(s.to_string()))?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|_| RecordError::BadDate(s.to_string()))
}

// ── Vehicles ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleRecord {
    pub id: u32,
    pub name: String,
    pub plate: String,
    #[serde(rename = "type")]
    pub kind: VehicleKind,
    pub capacity: u32,
    #[serde(default, alias = "fuelType")]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
}

impl VehicleRecord {
    pub fn normalize(self) -> Vehicle {
        Vehicle {
            id: self.id,
            name: self.name,
            plate: self.plate,
            kind: self.kind,
            capacity: self.capacity,
            fuel_type: self.fuel_type.unwrap_or_default(),
            features: self.features,
        }
    }
}

// ── Reservations ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsRecord {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotelRecord {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub passengers: Vec<HotelPassenger>,
    #[serde(default)]
    pub rooms: Vec<HotelRoom>,
    #[serde(default, alias = "checkIn")]
    pub check_in: Option<String>,
    #[serde(default, alias = "checkOut")]
    pub check_out: Option<String>,
    #[serde(default)]
    pub suggestions: Option<String>,
    #[serde(default, alias = "accountingAccount")]
    pub accounting_account: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default, alias = "vehicleId")]
    pub vehicle_id: Option<u32>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(default, alias = "userEmail")]
    pub user_email: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
    #[serde(default)]
    pub details: Option<DetailsRecord>,
    #[serde(default, alias = "hotelDetails")]
    pub hotel_details: Option<HotelRecord>,
}

impl ReservationRecord {
    /// The store-assigned id as an opaque string, whether the store typed
    /// it as a string or a number.
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Normalize into the canonical model. `vehicles` is the corrected
    /// fleet; it resolves the booking-time `vehicle_name` snapshot for
    /// records that predate the snapshot column.
    pub fn normalize(&self, vehicles: &[Vehicle]) -> Result<Reservation, RecordError> {
        let id = self
            .id_string()
            .ok_or(RecordError::MissingField("id"))?;
        let vehicle_id = self.vehicle_id.ok_or(RecordError::MissingField("vehicle_id"))?;

        let start = self
            .start_date
            .as_deref()
            .ok_or(RecordError::MissingField("start_date"))
            .and_then(parse_wire_date)?;
        let end = self
            .end_date
            .as_deref()
            .ok_or(RecordError::MissingField("end_date"))
            .and_then(parse_wire_date)?;
        let trip = DateRange::new(start.min(end), end.max(start));

        let vehicle_name = vehicles
            .iter()
            .find(|v| v.id == vehicle_id)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| UNKNOWN_VEHICLE.to_string());

        let attendees = self.attendees.clone().unwrap_or_default();
        let name = self
            .details
            .as_ref()
            .and_then(|d| d.name.clone())
            .or_else(|| attendees.first().cloned())
            .unwrap_or_else(|| UNKNOWN_CONTACT.to_string());

        let details = ReservationDetails {
            name,
            email: self.user_email.clone().unwrap_or_default(),
            destination: self.destination.clone().unwrap_or_default(),
            attendees,
        };

        let hotel = match &self.hotel_details {
            Some(h) if h.required => Some(HotelDetails {
                required: true,
                passengers: h.passengers.clone(),
                rooms: h.rooms.clone(),
                check_in: match &h.check_in {
                    Some(s) => parse_wire_date(s)?,
                    None => trip.start,
                },
                check_out: match &h.check_out {
                    Some(s) => parse_wire_date(s)?,
                    None => trip.end,
                },
                suggestions: h.suggestions.clone().unwrap_or_default(),
                accounting_account: h.accounting_account.clone(),
            }),
            _ => None,
        };

        Ok(Reservation {
            id: ReservationId(id),
            vehicle_id,
            vehicle_name,
            details,
            trip,
            hotel,
        })
    }
}

// ── Create payload ───────────────────────────────────────────────

/// Hotel sub-object as stored: camelCase field names, and the bare
/// `{"required": false}` form when no lodging was requested.
#[derive(Debug, Clone, Serialize)]
pub struct HotelPayload {
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub passengers: Vec<HotelPassenger>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rooms: Vec<HotelRoom>,
    #[serde(rename = "checkIn", skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(rename = "checkOut", skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<String>,
    #[serde(rename = "accountingAccount", skip_serializing_if = "Option::is_none")]
    pub accounting_account: Option<String>,
}

/// The canonical create payload: snake_case top level, dates as plain
/// `YYYY-MM-DD` strings, hotel nested.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationPayload {
    pub vehicle_id: u32,
    pub user_email: String,
    pub destination: String,
    pub attendees: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub hotel_details: HotelPayload,
}

fn wire_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

impl ReservationPayload {
    pub fn from_new(new: &NewReservation) -> Self {
        let hotel_details = if new.hotel.required {
            HotelPayload {
                required: true,
                passengers: new.hotel.passengers.clone(),
                rooms: new.hotel.rooms.clone(),
                check_in: Some(wire_date(new.hotel.check_in)),
                check_out: Some(wire_date(new.hotel.check_out)),
                suggestions: Some(new.hotel.suggestions.clone()),
                accounting_account: new.hotel.accounting_account.clone(),
            }
        } else {
            HotelPayload {
                required: false,
                passengers: Vec::new(),
                rooms: Vec::new(),
                check_in: None,
                check_out: None,
                suggestions: None,
                accounting_account: None,
            }
        };
        Self {
            vehicle_id: new.vehicle_id,
            user_email: new.details.email.clone(),
            destination: new.details.destination.clone(),
            attendees: new.details.attendees.clone(),
            start_date: wire_date(new.trip.start),
            end_date: wire_date(new.trip.end),
            hotel_details,
        }
    }
}

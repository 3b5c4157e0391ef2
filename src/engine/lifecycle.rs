use std::sync::Arc;

use chrono::NaiveDate;

use crate::model::{
    DateRange, HotelDetails, HotelPassenger, HotelRoom, NewReservation, Reservation,
    ReservationDetails, Vehicle,
};

use super::availability::VehicleFilter;
use super::{Engine, EngineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Pick the trip window.
    Dates,
    /// Pick a vehicle from the availability-filtered list.
    Vehicles,
    /// Enter contact and passenger details.
    Trip,
    /// Lodging: yes/no, then the hotel form.
    Hotel,
    /// Terminal: the reservation exists at the store.
    Confirmed,
}

/// Trip-details form input. The primary contact becomes the first
/// attendee; blank extra names are dropped during validation.
#[derive(Debug, Clone, Default)]
pub struct TripDetailsInput {
    pub name: String,
    pub email: String,
    pub destination: String,
    pub extra_attendees: Vec<String>,
}

/// Hotel form input: the binary choice, and the form when the answer is
/// yes.
#[derive(Debug, Clone)]
pub enum HotelInput {
    NotNeeded,
    Needed {
        passengers: Vec<HotelPassenger>,
        rooms: Vec<HotelRoom>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        suggestions: String,
        accounting_account: Option<String>,
    },
}

/// The strictly ordered booking pipeline. Each stage is gated on the
/// previous stage's output; "back" discards only the current stage's own
/// edits, except that leaving vehicle selection clears the date range and
/// leaving trip details clears the vehicle choice.
///
/// Validation failures keep the flow on its current stage with a
/// user-readable message. A store failure on the final submit does the
/// same: all confirmed inputs survive for a retry.
pub struct BookingFlow {
    engine: Arc<Engine>,
    stage: Stage,
    trip: Option<DateRange>,
    vehicle: Option<Vehicle>,
    details: Option<ReservationDetails>,
    confirmed: Option<Reservation>,
}

impl BookingFlow {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            stage: Stage::Dates,
            trip: None,
            vehicle: None,
            details: None,
            confirmed: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn trip(&self) -> Option<DateRange> {
        self.trip
    }

    pub fn vehicle(&self) -> Option<&Vehicle> {
        self.vehicle.as_ref()
    }

    pub fn details(&self) -> Option<&ReservationDetails> {
        self.details.as_ref()
    }

    pub fn confirmed(&self) -> Option<&Reservation> {
        self.confirmed.as_ref()
    }

    /// Stage 1 → 2.
    pub fn pick_dates(&mut self, range: DateRange) -> Result<(), EngineError> {
        if self.stage != Stage::Dates {
            return Err(EngineError::WrongStage);
        }
        self.trip = Some(range);
        self.stage = Stage::Vehicles;
        Ok(())
    }

    /// The vehicles offered in stage 2: availability-filtered for the
    /// picked window, further narrowed by free text and kind.
    pub async fn available(&self, filter: &VehicleFilter) -> Result<Vec<Vehicle>, EngineError> {
        if self.stage != Stage::Vehicles {
            return Err(EngineError::WrongStage);
        }
        Ok(self.engine.available_vehicles(filter, self.trip).await)
    }

    /// Stage 2 → 3.
    pub fn pick_vehicle(&mut self, vehicle: Vehicle) -> Result<(), EngineError> {
        if self.stage != Stage::Vehicles {
            return Err(EngineError::WrongStage);
        }
        self.vehicle = Some(vehicle);
        self.stage = Stage::Trip;
        Ok(())
    }

    /// Stage 3 → 4. Blocks on empty required fields or an attendee list
    /// over the vehicle's capacity.
    pub fn submit_trip_details(&mut self, input: TripDetailsInput) -> Result<(), EngineError> {
        if self.stage != Stage::Trip {
            return Err(EngineError::WrongStage);
        }
        let Some(vehicle) = &self.vehicle else {
            return Err(EngineError::WrongStage);
        };
        self.details = Some(validate_trip_details(input, vehicle)?);
        self.stage = Stage::Hotel;
        Ok(())
    }

    /// Stage 4 → Confirmed. Validates the hotel form, composes the final
    /// reservation with the vehicle-name snapshot, and delegates creation
    /// to the store. On a store failure the flow stays here, inputs
    /// intact.
    pub async fn submit_hotel(&mut self, input: HotelInput) -> Result<Reservation, EngineError> {
        if self.stage != Stage::Hotel {
            return Err(EngineError::WrongStage);
        }
        let (Some(trip), Some(vehicle), Some(details)) =
            (self.trip, &self.vehicle, &self.details)
        else {
            return Err(EngineError::WrongStage);
        };

        let hotel = validate_hotel(input, &trip)?;
        let new = NewReservation {
            vehicle_id: vehicle.id,
            vehicle_name: vehicle.name.clone(),
            details: details.clone(),
            trip,
            hotel,
        };

        let reservation = self.engine.submit(new).await?;
        self.confirmed = Some(reservation.clone());
        self.stage = Stage::Confirmed;
        Ok(reservation)
    }

    /// One stage back. Leaving stage 2 clears the date range, leaving
    /// stage 3 clears the vehicle choice; leaving stage 4 keeps the
    /// confirmed trip details for re-editing. No-op in the first and the
    /// terminal stage.
    pub fn back(&mut self) {
        match self.stage {
            Stage::Vehicles => {
                self.trip = None;
                self.stage = Stage::Dates;
            }
            Stage::Trip => {
                self.vehicle = None;
                self.stage = Stage::Vehicles;
            }
            Stage::Hotel => {
                self.stage = Stage::Trip;
            }
            Stage::Dates | Stage::Confirmed => {}
        }
    }

    /// "New reservation": reset the whole pipeline to stage 1.
    pub fn reset(&mut self) {
        self.trip = None;
        self.vehicle = None;
        self.details = None;
        self.confirmed = None;
        self.stage = Stage::Dates;
    }
}

fn validate_trip_details(
    input: TripDetailsInput,
    vehicle: &Vehicle,
) -> Result<ReservationDetails, EngineError> {
    let name = input.name.trim();
    let email = input.email.trim();
    let destination = input.destination.trim();
    if name.is_empty() || email.is_empty() || destination.is_empty() {
        return Err(EngineError::Validation(
            "name, email and destination are required".into(),
        ));
    }

    let mut attendees = vec![name.to_string()];
    attendees.extend(
        input
            .extra_attendees
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string),
    );

    if attendees.len() as u32 > vehicle.capacity {
        return Err(EngineError::Validation(format!(
            "the attendee count exceeds the vehicle capacity ({})",
            vehicle.capacity
        )));
    }

    Ok(ReservationDetails {
        name: name.to_string(),
        email: email.to_string(),
        destination: destination.to_string(),
        attendees,
    })
}

fn validate_hotel(input: HotelInput, trip: &DateRange) -> Result<HotelDetails, EngineError> {
    match input {
        HotelInput::NotNeeded => Ok(HotelDetails::not_required(*trip)),
        HotelInput::Needed {
            passengers,
            rooms,
            check_in,
            check_out,
            suggestions,
            accounting_account,
        } => {
            if passengers.is_empty() || passengers.iter().any(|p| p.name.trim().is_empty()) {
                return Err(EngineError::Validation(
                    "every hotel passenger needs a name".into(),
                ));
            }
            if rooms.is_empty() || rooms.iter().any(|r| r.quantity < 1) {
                return Err(EngineError::Validation(
                    "at least one room, each with quantity 1 or more".into(),
                ));
            }
            if check_in > check_out {
                return Err(EngineError::Validation(
                    "check-in must not be after check-out".into(),
                ));
            }
            if !trip.contains_day(check_in) || !trip.contains_day(check_out) {
                return Err(EngineError::Validation(
                    "the hotel stay must fall within the trip dates".into(),
                ));
            }
            Ok(HotelDetails {
                required: true,
                passengers,
                rooms,
                check_in,
                check_out,
                suggestions,
                accounting_account,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RoomKind, VehicleKind};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn vehicle(capacity: u32) -> Vehicle {
        Vehicle {
            id: 1,
            name: "Amarok AD459VF".into(),
            plate: "AD459VF".into(),
            kind: VehicleKind::Pickup,
            capacity,
            fuel_type: "diesel".into(),
            features: None,
        }
    }

    fn input(extras: &[&str]) -> TripDetailsInput {
        TripDetailsInput {
            name: "Ana Díaz".into(),
            email: "ana@corp.example".into(),
            destination: "Rosario, Santa Fe".into(),
            extra_attendees: extras.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn trip_details_require_all_fields() {
        let v = vehicle(4);
        let mut missing = input(&[]);
        missing.email = "   ".into();
        let err = validate_trip_details(missing, &v).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn primary_contact_leads_the_attendee_list() {
        let v = vehicle(4);
        let details = validate_trip_details(input(&["Bruno Paz", "  ", "Carla Ruiz"]), &v).unwrap();
        assert_eq!(
            details.attendees,
            vec!["Ana Díaz", "Bruno Paz", "Carla Ruiz"]
        );
        assert_eq!(details.attendees[0], details.name);
    }

    #[test]
    fn five_attendees_overflow_a_four_seat_vehicle() {
        let v = vehicle(4);
        let err = validate_trip_details(
            input(&["Bruno Paz", "Carla Ruiz", "Diego Soto", "Elena Vidal"]),
            &v,
        )
        .unwrap_err();
        match err {
            EngineError::Validation(msg) => assert!(msg.contains("capacity")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn exactly_at_capacity_is_fine() {
        let v = vehicle(4);
        let details =
            validate_trip_details(input(&["Bruno Paz", "Carla Ruiz", "Diego Soto"]), &v).unwrap();
        assert_eq!(details.attendees.len(), 4);
    }

    #[test]
    fn hotel_not_needed_defaults_to_trip_dates() {
        let trip = DateRange::new(d(2024, 3, 10), d(2024, 3, 14));
        let hotel = validate_hotel(HotelInput::NotNeeded, &trip).unwrap();
        assert!(!hotel.required);
        assert_eq!(hotel.check_in, trip.start);
        assert_eq!(hotel.check_out, trip.end);
    }

    fn needed(check_in: NaiveDate, check_out: NaiveDate) -> HotelInput {
        HotelInput::Needed {
            passengers: vec![HotelPassenger {
                name: "Ana Díaz".into(),
            }],
            rooms: vec![HotelRoom {
                quantity: 1,
                kind: RoomKind::Double,
            }],
            check_in,
            check_out,
            suggestions: String::new(),
            accounting_account: None,
        }
    }

    #[test]
    fn hotel_stay_must_sit_inside_the_trip() {
        let trip = DateRange::new(d(2024, 3, 10), d(2024, 3, 14));

        let ok = validate_hotel(needed(d(2024, 3, 11), d(2024, 3, 13)), &trip).unwrap();
        assert!(ok.required);

        let out = validate_hotel(needed(d(2024, 3, 9), d(2024, 3, 13)), &trip).unwrap_err();
        assert!(matches!(out, EngineError::Validation(_)));

        let inverted = validate_hotel(needed(d(2024, 3, 13), d(2024, 3, 11)), &trip).unwrap_err();
        assert!(matches!(inverted, EngineError::Validation(_)));
    }

    #[test]
    fn hotel_passengers_and_rooms_are_checked() {
        let trip = DateRange::new(d(2024, 3, 10), d(2024, 3, 14));

        let blank_passenger = HotelInput::Needed {
            passengers: vec![HotelPassenger { name: "  ".into() }],
            rooms: vec![HotelRoom {
                quantity: 1,
                kind: RoomKind::Single,
            }],
            check_in: d(2024, 3, 10),
            check_out: d(2024, 3, 14),
            suggestions: String::new(),
            accounting_account: None,
        };
        assert!(matches!(
            validate_hotel(blank_passenger, &trip),
            Err(EngineError::Validation(_))
        ));

        let zero_rooms = HotelInput::Needed {
            passengers: vec![HotelPassenger {
                name: "Ana Díaz".into(),
            }],
            rooms: vec![HotelRoom {
                quantity: 0,
                kind: RoomKind::Single,
            }],
            check_in: d(2024, 3, 10),
            check_out: d(2024, 3, 14),
            suggestions: String::new(),
            accounting_account: None,
        };
        assert!(matches!(
            validate_hotel(zero_rooms, &trip),
            Err(EngineError::Validation(_))
        ));
    }
}

use crate::model::{DateRange, Reservation, Vehicle, VehicleKind};

// ── Availability ─────────────────────────────────────────────────

/// True if any reservation for this vehicle overlaps the candidate range.
pub fn conflicts(vehicle_id: u32, candidate: &DateRange, reservations: &[Reservation]) -> bool {
    reservations
        .iter()
        .any(|r| r.vehicle_id == vehicle_id && r.trip.overlaps(candidate))
}

/// A vehicle is available for a candidate range iff no existing
/// reservation for it overlaps the range. Pure function of its inputs.
pub fn is_available(vehicle: &Vehicle, candidate: &DateRange, reservations: &[Reservation]) -> bool {
    !conflicts(vehicle.id, candidate, reservations)
}

/// Vehicles with no overlapping reservation for the candidate range.
/// With no range set yet (pre-selection state) every vehicle passes.
pub fn filter_available(
    vehicles: &[Vehicle],
    candidate: Option<DateRange>,
    reservations: &[Reservation],
) -> Vec<Vehicle> {
    vehicles
        .iter()
        .filter(|v| match &candidate {
            Some(range) => is_available(v, range, reservations),
            None => true,
        })
        .cloned()
        .collect()
}

/// Trip windows already booked on one vehicle, sorted by start date.
/// Feeds the no-straddle picker variant and the per-vehicle calendar.
pub fn reserved_ranges(vehicle_id: u32, reservations: &[Reservation]) -> Vec<DateRange> {
    let mut ranges: Vec<DateRange> = reservations
        .iter()
        .filter(|r| r.vehicle_id == vehicle_id)
        .map(|r| r.trip)
        .collect();
    ranges.sort_by_key(|r| r.start);
    ranges
}

// ── Catalog-side filtering ───────────────────────────────────────

/// Free-text and kind filter applied during vehicle selection, on top of
/// availability.
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    /// Case-insensitive substring matched against name and plate.
    pub search: Option<String>,
    pub kind: Option<VehicleKind>,
}

impl VehicleFilter {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = vehicle.name.to_lowercase().contains(&term)
                || vehicle.plate.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(kind) = self.kind
            && vehicle.kind != kind
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReservationDetails, ReservationId};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn vehicle(id: u32, name: &str, plate: &str, kind: VehicleKind) -> Vehicle {
        Vehicle {
            id,
            name: name.into(),
            plate: plate.into(),
            kind,
            capacity: 4,
            fuel_type: "diesel".into(),
            features: None,
        }
    }

    fn booked(vehicle_id: u32, start: NaiveDate, end: NaiveDate) -> Reservation {
        Reservation {
            id: ReservationId("r".into()),
            vehicle_id,
            vehicle_name: "whatever".into(),
            details: ReservationDetails {
                name: "Ana Díaz".into(),
                email: "ana@corp.example".into(),
                destination: "Rosario, Santa Fe".into(),
                attendees: vec!["Ana Díaz".into()],
            },
            trip: DateRange::new(start, end),
            hotel: None,
        }
    }

    #[test]
    fn overlapping_reservation_excludes_vehicle() {
        let v = vehicle(1, "Amarok AD459VF", "AD459VF", VehicleKind::Pickup);
        let existing = vec![booked(1, d(2024, 3, 14), d(2024, 3, 20))];
        let candidate = DateRange::new(d(2024, 3, 10), d(2024, 3, 15));

        assert!(!is_available(&v, &candidate, &existing));
        let free = filter_available(std::slice::from_ref(&v), Some(candidate), &existing);
        assert!(free.is_empty());
    }

    #[test]
    fn adjacent_reservation_does_not_conflict() {
        let v = vehicle(1, "Amarok AD459VF", "AD459VF", VehicleKind::Pickup);
        let existing = vec![booked(1, d(2024, 3, 6), d(2024, 3, 10))];
        let candidate = DateRange::new(d(2024, 3, 1), d(2024, 3, 5));

        assert!(is_available(&v, &candidate, &existing));
        let free = filter_available(std::slice::from_ref(&v), Some(candidate), &existing);
        assert_eq!(free.len(), 1);
    }

    #[test]
    fn other_vehicles_reservations_are_ignored() {
        let v = vehicle(1, "Amarok AD459VF", "AD459VF", VehicleKind::Pickup);
        let existing = vec![booked(2, d(2024, 3, 10), d(2024, 3, 15))];
        let candidate = DateRange::new(d(2024, 3, 10), d(2024, 3, 15));
        assert!(is_available(&v, &candidate, &existing));
    }

    #[test]
    fn no_candidate_range_passes_everything() {
        let fleet = vec![
            vehicle(1, "Amarok AD459VF", "AD459VF", VehicleKind::Pickup),
            vehicle(2, "Corolla AG204HS", "AG204HS", VehicleKind::Sedan),
        ];
        let existing = vec![booked(1, d(2024, 3, 1), d(2024, 12, 31))];
        assert_eq!(filter_available(&fleet, None, &existing).len(), 2);
    }

    #[test]
    fn reserved_ranges_sorted_per_vehicle() {
        let existing = vec![
            booked(1, d(2024, 4, 1), d(2024, 4, 3)),
            booked(2, d(2024, 1, 1), d(2024, 1, 2)),
            booked(1, d(2024, 3, 1), d(2024, 3, 5)),
        ];
        let ranges = reserved_ranges(1, &existing);
        assert_eq!(
            ranges,
            vec![
                DateRange::new(d(2024, 3, 1), d(2024, 3, 5)),
                DateRange::new(d(2024, 4, 1), d(2024, 4, 3)),
            ]
        );
    }

    #[test]
    fn filter_matches_name_plate_and_kind() {
        let amarok = vehicle(1, "Amarok AD459VF", "AD459VF", VehicleKind::Pickup);
        let corolla = vehicle(2, "Corolla AG204HS", "AG204HS", VehicleKind::Sedan);

        let by_name = VehicleFilter {
            search: Some("amarok".into()),
            kind: None,
        };
        assert!(by_name.matches(&amarok));
        assert!(!by_name.matches(&corolla));

        let by_plate = VehicleFilter {
            search: Some("ag204".into()),
            kind: None,
        };
        assert!(by_plate.matches(&corolla));

        let pickups = VehicleFilter {
            search: None,
            kind: Some(VehicleKind::Pickup),
        };
        assert!(pickups.matches(&amarok));
        assert!(!pickups.matches(&corolla));

        assert!(VehicleFilter::default().matches(&amarok));
    }
}

use std::collections::HashMap;

use crate::model::Vehicle;

/// Identity-correction tables for vehicles whose upstream records carry a
/// known-wrong plate or a stale display name.
///
/// Plates remap to their canonical spelling first; the canonical plate then
/// keys an optional name override. Both tables are keyed uppercase.
#[derive(Debug, Clone, Default)]
pub struct Corrections {
    plates: HashMap<String, String>,
    names: HashMap<String, String>,
}

impl Corrections {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The fixed correction set for the current fleet data.
    pub fn standard() -> Self {
        let mut c = Self::default();
        c.remap_plate("AE729GM", "AD459VF");
        c.remap_plate("AF110DH", "AG919DW");
        c.rename("AD459VF", "Amarok AD459VF");
        c.rename("AH437DS", "Amarok AH437DS");
        c.rename("AG919DW", "Amarok AG919DW");
        c.rename("AG204HS", "Corolla AG204HS");
        c.rename("AG491EI", "Corolla AG491EI");
        c
    }

    pub fn remap_plate(&mut self, wrong: &str, canonical: &str) -> &mut Self {
        self.plates
            .insert(wrong.to_uppercase(), canonical.to_uppercase());
        self
    }

    pub fn rename(&mut self, plate: &str, name: &str) -> &mut Self {
        self.names.insert(plate.to_uppercase(), name.to_string());
        self
    }
}

/// Applies [`Corrections`] to vehicles as they are loaded from the store.
///
/// The tables are injected at construction and never change afterwards;
/// corrections run exactly once per load and are idempotent, so a vehicle
/// that round-trips through the catalog twice comes out unchanged the
/// second time.
#[derive(Debug, Clone)]
pub struct Catalog {
    corrections: Corrections,
}

impl Catalog {
    pub fn new(corrections: Corrections) -> Self {
        Self { corrections }
    }

    pub fn correct(&self, mut vehicle: Vehicle) -> Vehicle {
        let original = vehicle.plate.to_uppercase();
        if let Some(canonical) = self.corrections.plates.get(&original) {
            vehicle.plate = canonical.clone();
        }
        let plate = vehicle.plate.to_uppercase();
        if let Some(name) = self.corrections.names.get(&plate) {
            vehicle.name = name.clone();
        }
        vehicle
    }

    pub fn correct_all(&self, vehicles: Vec<Vehicle>) -> Vec<Vehicle> {
        vehicles.into_iter().map(|v| self.correct(v)).collect()
    }
}

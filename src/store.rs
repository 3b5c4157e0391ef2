use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::{ReservationId, Vehicle};
use crate::record::{ReservationPayload, ReservationRecord, VehicleRecord};

const CHANNEL_CAPACITY: usize = 256;

/// Change notification from the store. Carries the touched id for logging,
/// but consumers must treat any event as "the list may have changed" and
/// re-fetch — never as an incremental patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Created(ReservationId),
    Updated(ReservationId),
    Deleted(ReservationId),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unavailable(String),
    #[error("store rejected the request: {0}")]
    Rejected(String),
}

/// The external reservation store, as this core sees it.
///
/// Reads return raw wire records; normalization into the canonical model
/// happens on the caller's side of the boundary (see [`crate::record`]).
/// There is no retry or backoff here — a failed call fails once.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn fetch_vehicles(&self) -> Result<Vec<VehicleRecord>, StoreError>;

    async fn fetch_reservations(&self) -> Result<Vec<ReservationRecord>, StoreError>;

    /// Persist a new reservation and return the stored record, id included.
    async fn create_reservation(
        &self,
        payload: &ReservationPayload,
    ) -> Result<ReservationRecord, StoreError>;

    async fn delete_reservation(&self, id: &ReservationId) -> Result<(), StoreError>;

    /// At-least-one notification per create/update/delete.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

/// Reference store used by tests and local demos.
///
/// Documents are kept as raw JSON, the way the managed store holds them,
/// so every read path exercises the record-normalization boundary. Seeding
/// helpers accept arbitrary raw documents — either field-naming convention
/// works.
pub struct MemoryStore {
    vehicles: Vec<serde_json::Value>,
    reservations: DashMap<String, serde_json::Value>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            vehicles: Vec::new(),
            reservations: DashMap::new(),
            events: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn with_vehicles(vehicles: &[Vehicle]) -> Self {
        let mut store = Self::new();
        store.vehicles = vehicles
            .iter()
            .map(|v| serde_json::to_value(v).expect("vehicle serializes"))
            .collect();
        store
    }

    pub fn seed_vehicle_doc(&mut self, doc: serde_json::Value) {
        self.vehicles.push(doc);
    }

    /// Insert a raw reservation document without emitting a change event
    /// (pre-subscription state). Assigns an id when the document has none.
    pub fn seed_reservation_doc(&self, mut doc: serde_json::Value) -> ReservationId {
        let id = doc
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| Ulid::new().to_string());
        doc["id"] = serde_json::Value::String(id.clone());
        self.reservations.insert(id.clone(), doc);
        ReservationId(id)
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn fetch_vehicles(&self) -> Result<Vec<VehicleRecord>, StoreError> {
        self.vehicles
            .iter()
            .map(|doc| {
                serde_json::from_value(doc.clone())
                    .map_err(|e| StoreError::Rejected(format!("bad vehicle document: {e}")))
            })
            .collect()
    }

    async fn fetch_reservations(&self) -> Result<Vec<ReservationRecord>, StoreError> {
        self.reservations
            .iter()
            .map(|entry| {
                serde_json::from_value(entry.value().clone())
                    .map_err(|e| StoreError::Rejected(format!("bad reservation document: {e}")))
            })
            .collect()
    }

    async fn create_reservation(
        &self,
        payload: &ReservationPayload,
    ) -> Result<ReservationRecord, StoreError> {
        let mut doc = serde_json::to_value(payload)
            .map_err(|e| StoreError::Rejected(format!("unserializable payload: {e}")))?;
        let id = Ulid::new().to_string();
        doc["id"] = serde_json::Value::String(id.clone());

        let record: ReservationRecord = serde_json::from_value(doc.clone())
            .map_err(|e| StoreError::Rejected(format!("stored document unreadable: {e}")))?;
        self.reservations.insert(id.clone(), doc);

        // No-op if nobody is listening.
        let _ = self.events.send(StoreEvent::Created(ReservationId(id)));
        Ok(record)
    }

    async fn delete_reservation(&self, id: &ReservationId) -> Result<(), StoreError> {
        if self.reservations.remove(&id.0).is_none() {
            return Err(StoreError::Rejected(format!("unknown reservation {id}")));
        }
        let _ = self.events.send(StoreEvent::Deleted(id.clone()));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

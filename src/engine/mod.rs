mod availability;
mod error;
mod lifecycle;
mod picker;
mod stats;

pub use availability::{VehicleFilter, conflicts, filter_available, is_available, reserved_ranges};
pub use error::EngineError;
pub use lifecycle::{BookingFlow, HotelInput, Stage, TripDetailsInput};
pub use picker::{PickerState, RangePicker};
pub use stats::{Stats, StatsWindow, TopEntry, VehicleUsage, resolve_window, summarize};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::model::{DateRange, NewReservation, Reservation, ReservationId, Vehicle};
use crate::notify::{ConfirmationSender, NotifyHub};
use crate::record::{ReservationPayload, VehicleRecord};
use crate::store::{ReservationStore, StoreError};

/// Date-only "now" in local time: the reference point for the picker's
/// past-day cutoff and the relative dashboard windows.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// The reservation desk core: a corrected fleet, a read-only cached
/// projection of the store's reservations, and the mutations the booking
/// workflow needs.
///
/// The store owns the canonical data. Every change notification triggers a
/// full re-derivation of the cache — "the list may have changed", never an
/// incremental patch — so the projection cannot drift from server truth.
pub struct Engine {
    store: Arc<dyn ReservationStore>,
    mailer: Arc<dyn ConfirmationSender>,
    vehicles: RwLock<Vec<Vehicle>>,
    reservations: RwLock<Vec<Reservation>>,
    pub notify: Arc<NotifyHub>,
    /// Submission lock: at most one create call in flight per client.
    submitting: AtomicBool,
}

/// Clears the submission flag when the create path exits, on success or
/// error alike.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Engine {
    /// Initial load: fetch the fleet, apply identity corrections, fetch and
    /// normalize reservations. A store failure here is fatal
    /// ([`EngineError::StoreUnavailable`]); retry is the caller's manual
    /// action, there is no automatic polling.
    pub async fn connect(
        store: Arc<dyn ReservationStore>,
        mailer: Arc<dyn ConfirmationSender>,
        catalog: Catalog,
    ) -> Result<Arc<Self>, EngineError> {
        let vehicles = load_vehicles(store.as_ref(), &catalog).await?;
        let reservations = load_reservations(store.as_ref(), &vehicles).await?;
        info!(
            vehicles = vehicles.len(),
            reservations = reservations.len(),
            "reservation engine connected"
        );
        Ok(Arc::new(Self {
            store,
            mailer,
            vehicles: RwLock::new(vehicles),
            reservations: RwLock::new(reservations),
            notify: Arc::new(NotifyHub::new()),
            submitting: AtomicBool::new(false),
        }))
    }

    /// Re-fetch the reservation list and replace the cached projection.
    pub async fn refresh(&self) -> Result<(), EngineError> {
        let vehicles = self.vehicles.read().await.clone();
        let fresh = load_reservations(self.store.as_ref(), &vehicles).await?;
        *self.reservations.write().await = fresh;
        Ok(())
    }

    /// Follow the store's change stream: each event, whatever it carries,
    /// means "re-fetch". Subscribers of [`Engine::notify`] hear about the
    /// event only after the cache matches server truth again. A lagged
    /// receiver still refreshes — collapsed signals are safe, a dropped
    /// refresh is not.
    pub fn spawn_sync(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut rx = engine.store.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        match engine.refresh().await {
                            Ok(()) => engine.notify.send(event),
                            Err(e) => warn!("refresh after change notification failed: {e}"),
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!("change stream lagged by {missed} events, re-deriving");
                        if let Err(e) = engine.refresh().await {
                            warn!("refresh after lag failed: {e}");
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    // ── Read side ────────────────────────────────────────────

    pub async fn vehicles(&self) -> Vec<Vehicle> {
        self.vehicles.read().await.clone()
    }

    /// Cached reservations, sorted by trip start.
    pub async fn reservations(&self) -> Vec<Reservation> {
        self.reservations.read().await.clone()
    }

    pub async fn reservations_for_vehicle(&self, vehicle_id: u32) -> Vec<Reservation> {
        self.reservations
            .read()
            .await
            .iter()
            .filter(|r| r.vehicle_id == vehicle_id)
            .cloned()
            .collect()
    }

    /// Booked windows for one vehicle, for the no-straddle picker variant.
    pub async fn reserved_ranges_for(&self, vehicle_id: u32) -> Vec<DateRange> {
        reserved_ranges(vehicle_id, &self.reservations.read().await)
    }

    /// Vehicles passing the free-text/kind filter with no conflicting
    /// reservation in the candidate range. With no range yet, availability
    /// does not constrain the result.
    pub async fn available_vehicles(
        &self,
        filter: &VehicleFilter,
        candidate: Option<DateRange>,
    ) -> Vec<Vehicle> {
        let vehicles = self.vehicles.read().await;
        let reservations = self.reservations.read().await;
        let matching: Vec<Vehicle> = vehicles
            .iter()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        filter_available(&matching, candidate, &reservations)
    }

    /// Dashboard summary over the cached projection; `None` when the
    /// window holds no reservations.
    pub async fn stats(&self, window: StatsWindow, today: NaiveDate) -> Option<Stats> {
        summarize(&self.reservations.read().await, window, today)
    }

    /// [`Engine::stats`] resolved against the local calendar date.
    pub async fn stats_now(&self, window: StatsWindow) -> Option<Stats> {
        self.stats(window, today()).await
    }

    // ── Mutations ────────────────────────────────────────────

    /// Persist a composed reservation.
    ///
    /// Only one submission may be in flight at a time; a concurrent call
    /// fails fast with [`EngineError::SubmitInFlight`]. On success the
    /// cache gains the new reservation immediately and the confirmation
    /// email is spawned fire-and-forget — its failure is logged and
    /// discarded, never surfaced.
    ///
    /// Known limitation: this guards a single client's last-synced view.
    /// Two clients racing for the same vehicle and overlapping dates can
    /// both succeed; reconciling that is the store's concern.
    pub async fn submit(&self, new: NewReservation) -> Result<Reservation, EngineError> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(EngineError::SubmitInFlight);
        }
        let _guard = SubmitGuard(&self.submitting);

        let payload = ReservationPayload::from_new(&new);
        let record = self
            .store
            .create_reservation(&payload)
            .await
            .map_err(|e| EngineError::CreateFailed(e.to_string()))?;
        let id = record
            .id_string()
            .ok_or_else(|| EngineError::CreateFailed("store returned no id".into()))?;

        let reservation = Reservation {
            id: ReservationId(id),
            vehicle_id: new.vehicle_id,
            vehicle_name: new.vehicle_name,
            details: new.details,
            trip: new.trip,
            hotel: new.hotel.required.then_some(new.hotel),
        };

        {
            let mut cache = self.reservations.write().await;
            cache.push(reservation.clone());
            cache.sort_by_key(|r| r.trip.start);
        }

        let mailer = Arc::clone(&self.mailer);
        let snapshot = reservation.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_confirmation(&snapshot).await {
                warn!("confirmation for {} not delivered: {e}", snapshot.id);
            }
        });

        Ok(reservation)
    }

    /// Cancel (delete) a reservation. No retry; a failure surfaces once as
    /// [`EngineError::DeleteFailed`] and the cache is left to the change
    /// stream.
    pub async fn cancel(&self, id: &ReservationId) -> Result<(), EngineError> {
        self.store
            .delete_reservation(id)
            .await
            .map_err(|e| EngineError::DeleteFailed(e.to_string()))?;
        if let Err(e) = self.refresh().await {
            warn!("refresh after cancel failed: {e}");
        }
        Ok(())
    }
}

async fn load_vehicles(
    store: &dyn ReservationStore,
    catalog: &Catalog,
) -> Result<Vec<Vehicle>, EngineError> {
    let records = store.fetch_vehicles().await.map_err(unavailable)?;
    let vehicles = records.into_iter().map(VehicleRecord::normalize).collect();
    Ok(catalog.correct_all(vehicles))
}

/// Fetch and normalize reservations. Malformed records are logged and
/// skipped — one bad row must not take down the projection.
async fn load_reservations(
    store: &dyn ReservationStore,
    vehicles: &[Vehicle],
) -> Result<Vec<Reservation>, EngineError> {
    let records = store.fetch_reservations().await.map_err(unavailable)?;
    let mut reservations = Vec::with_capacity(records.len());
    for record in &records {
        match record.normalize(vehicles) {
            Ok(r) => reservations.push(r),
            Err(e) => warn!("skipping malformed reservation record: {e}"),
        }
    }
    reservations.sort_by_key(|r| r.trip.start);
    Ok(reservations)
}

fn unavailable(e: StoreError) -> EngineError {
    EngineError::StoreUnavailable(e.to_string())
}

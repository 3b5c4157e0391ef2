pub mod catalog;
pub mod destinations;
pub mod engine;
pub mod model;
pub mod notify;
pub mod record;
pub mod store;

pub use catalog::{Catalog, Corrections};
pub use engine::{
    BookingFlow, Engine, EngineError, HotelInput, PickerState, RangePicker, Stage, Stats,
    StatsWindow, TripDetailsInput, VehicleFilter, today,
};
pub use model::{
    DateRange, HotelDetails, NewReservation, Reservation, ReservationDetails, ReservationId,
    Vehicle, VehicleKind,
};
pub use notify::{ConfirmationSender, NotifyHub, NullMailer};
pub use store::{MemoryStore, ReservationStore, StoreError, StoreEvent};

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// User-correctable form problem. Resolved entirely inside the
    /// lifecycle; never reaches the store and never logged as a fault.
    #[error("{0}")]
    Validation(String),

    /// The store could not be reached for the initial load. Fatal to
    /// engine construction; retry is a manual, user-initiated action.
    #[error("reservation store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store refused or failed a create. Form state is preserved so
    /// the user can resubmit.
    #[error("could not save the reservation: {0}")]
    CreateFailed(String),

    /// The store refused or failed a delete.
    #[error("could not cancel the reservation: {0}")]
    DeleteFailed(String),

    /// A second submit arrived while a create call was still pending.
    #[error("a submission is already in progress")]
    SubmitInFlight,

    /// A lifecycle operation was invoked out of stage order.
    #[error("operation not valid in the current stage")]
    WrongStage,
}

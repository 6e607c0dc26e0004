pub mod calculations;
pub mod completion;
pub mod controller;
pub mod models;
pub mod platform;
pub mod session;
pub mod surface;
pub mod transport;
pub mod validation;

pub use controller::{
    ControllerConfig, ControllerError, ControllerServices, EventOutcome, FormController,
    FormEvent, KeyChord, SubmitOutcome, SubmitStart,
};
pub use models::*;
pub use session::{AutosaveSnapshot, AutosaveTrigger, SessionState};
pub use surface::{FormSurface, MemorySurface};
pub use transport::{SimulatedTransport, SubmissionReceipt, SubmissionTransport, TransportError};
pub use validation::{FieldError, ValidationError};

pub mod error;
pub mod observation;
pub mod outcome;
pub mod writer;

pub use error::{DomainError, DomainResult};
pub use observation::{Municipality, ObservationRecord, WeatherCondition, WeatherObservation};
pub use outcome::{DispatchOutcome, JointOutcome, SinkKind, SinkStatus};
pub use writer::ObservationWriter;

#[cfg(any(test, feature = "testing"))]
pub use writer::MockObservationWriter;

pub mod exchange;
pub mod patient;

pub use exchange::{AgeUpdateEvent, Answer, Query};
pub use patient::PatientRecord;

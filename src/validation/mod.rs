pub mod confidence;
pub mod document;
pub mod gate;
pub mod required;

pub use confidence::ConfidenceValidator;
pub use document::{DocumentValidator, PASSPORT_TERMS};
pub use gate::ValidationGate;
pub use required::{RequiredFieldsValidator, REQUIRED_PASSPORT_FIELDS};

pub mod config;
pub mod models;
pub mod passport_reader;
pub mod processing;
pub mod progress;
pub mod session;
pub mod utils;
pub mod validation;

pub use config::PipelineConfig;
pub use passport_reader::PassportReader;
pub use session::{ScanOutcome, ScanSession};
pub use utils::PassportError;

pub mod countries;
pub mod data;
pub mod state;

pub use countries::country_name;
pub use data::*;
pub use state::PipelineState;

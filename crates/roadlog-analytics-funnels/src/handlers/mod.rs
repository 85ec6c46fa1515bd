pub mod handler;
pub mod types;

pub use handler::{configure_routes, GrowthApiDoc};
pub use types::AppState;

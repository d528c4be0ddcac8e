pub mod clause;
pub mod manager;
pub mod stores;

pub use manager::{DatabaseError, DatabaseManager, HealthCheck};

//! Postgres stores, one per entity, plus the user cache.

pub mod conditiondb;
pub mod patientdb;
pub mod productdb;
pub mod regiondb;
pub mod roledb;
pub mod usercache;
pub mod userdb;

pub use conditiondb::ConditionDb;
pub use patientdb::PatientDb;
pub use productdb::ProductDb;
pub use regiondb::RegionDb;
pub use roledb::RoleDb;
pub use usercache::UserCache;
pub use userdb::UserDb;

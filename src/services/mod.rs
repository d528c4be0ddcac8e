//! Core services: business rules wrapped around one store per entity.

use thiserror::Error;
use validator::ValidationErrors;

use crate::database::DatabaseError;

pub mod condition;
pub mod patient;
pub mod product;
pub mod region;
pub mod role;
pub mod user;

pub use condition::ConditionService;
pub use patient::PatientService;
pub use product::ProductService;
pub use region::RegionService;
pub use role::RoleService;
pub use user::UserService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("user disabled")]
    UserDisabled,

    #[error("email is not unique")]
    UniqueEmail,

    #[error("authentication failed")]
    AuthenticationFailure,

    #[error("validate: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{context}: {source}")]
    Store {
        context: String,
        source: DatabaseError,
    },

    #[error("hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("background task: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    /// Wrap a store error for `entity`, keeping not-found distinct.
    pub(crate) fn store(entity: &'static str, context: impl Into<String>) -> impl FnOnce(DatabaseError) -> ServiceError {
        move |err| match err {
            DatabaseError::NotFound(_) => ServiceError::NotFound(entity),
            source => ServiceError::Store {
                context: context.into(),
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}

/// Resolves an entity by id; implemented by every core so the
/// authorization layer can load path resources generically.
#[async_trait::async_trait]
pub trait ResourceLoader<R>: Send + Sync {
    async fn load(&self, id: uuid::Uuid) -> Result<R, ServiceError>;
}

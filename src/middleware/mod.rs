pub mod auth;
pub mod authorize;
pub mod response;

pub use auth::authenticate;
pub use authorize::{authorize, authorize_resource, Resource, ResourceGuard, RuleGuard};
pub use response::{ApiResponse, ApiResult};

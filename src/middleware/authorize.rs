use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use uuid::Uuid;

use crate::auth::{Auth, Claims, Rule};
use crate::error::ApiError;
use crate::services::condition::Condition;
use crate::services::patient::Patient;
use crate::services::product::Product;
use crate::services::region::Region;
use crate::services::role::Role;
use crate::services::user::User;
use crate::services::ResourceLoader;

/// An entity that can be resolved from a path parameter and owned by a user.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Name of the path parameter carrying this entity's id.
    const ID_PARAM: &'static str;

    fn owner_id(&self) -> Uuid;
}

impl Resource for User {
    const ID_PARAM: &'static str = "user_id";

    // A user owns itself.
    fn owner_id(&self) -> Uuid {
        self.id
    }
}

impl Resource for Patient {
    const ID_PARAM: &'static str = "patient_id";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Resource for Condition {
    const ID_PARAM: &'static str = "condition_id";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Resource for Region {
    const ID_PARAM: &'static str = "region_id";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Resource for Role {
    const ID_PARAM: &'static str = "role_id";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Resource for Product {
    const ID_PARAM: &'static str = "product_id";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// State for the rule-only `authorize` middleware.
#[derive(Clone)]
pub struct RuleGuard {
    auth: Arc<Auth>,
    rule: Rule,
}

impl RuleGuard {
    pub fn new(auth: Arc<Auth>, rule: Rule) -> Self {
        Self { auth, rule }
    }
}

/// State for `authorize_resource::<R>`.
pub struct ResourceGuard<R> {
    auth: Arc<Auth>,
    rule: Rule,
    loader: Arc<dyn ResourceLoader<R>>,
}

impl<R> ResourceGuard<R> {
    pub fn new(auth: Arc<Auth>, rule: Rule, loader: Arc<dyn ResourceLoader<R>>) -> Self {
        Self { auth, rule, loader }
    }
}

// `derive(Clone)` would add an `R: Clone` bound.
impl<R> Clone for ResourceGuard<R> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            rule: self.rule,
            loader: self.loader.clone(),
        }
    }
}

fn check(auth: &Auth, claims: &Claims, owner: Option<Uuid>, rule: Rule) -> Result<(), ApiError> {
    auth.authorize(claims, owner, rule).map_err(|e| {
        tracing::warn!(user_id = %claims.sub, %rule, "authorization denied");
        ApiError::from(e)
    })
}

/// Evaluate a rule that needs no resource.
pub async fn authorize(
    State(guard): State<RuleGuard>,
    Extension(claims): Extension<Claims>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check(&guard.auth, &claims, None, guard.rule)?;

    Ok(next.run(request).await)
}

/// Resolve `R` from its path parameter, evaluate the rule against its owner,
/// and hand the entity to the handler through request extensions.
/// An id with no matching entity short-circuits with 204 No Content.
pub async fn authorize_resource<R: Resource>(
    State(guard): State<ResourceGuard<R>>,
    Extension(claims): Extension<Claims>,
    params: Option<Path<HashMap<String, String>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw_id = params.and_then(|Path(mut p)| p.remove(R::ID_PARAM));

    let mut owner = None;
    if let Some(raw_id) = raw_id {
        let id = Uuid::parse_str(&raw_id).map_err(|_| ApiError::bad_request("ID is not in its proper form"))?;

        // A missing entity answers 204 with no body and skips the handler.
        let resource = match guard.loader.load(id).await {
            Ok(resource) => resource,
            Err(e) if e.is_not_found() => {
                tracing::debug!(%id, param = R::ID_PARAM, "path resource not found");
                return Ok(StatusCode::NO_CONTENT.into_response());
            }
            Err(e) => return Err(e.into()),
        };
        owner = Some(resource.owner_id());
        request.extensions_mut().insert(resource);
    }

    check(&guard.auth, &claims, owner, guard.rule)?;

    Ok(next.run(request).await)
}

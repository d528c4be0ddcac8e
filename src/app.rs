use std::sync::Arc;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    response::{IntoResponse, Response},
    Router,
};
use sqlx::PgPool;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::{Auth, AuthError, Rule};
use crate::config::AppConfig;
use crate::database::stores::{ConditionDb, PatientDb, ProductDb, RegionDb, RoleDb, UserCache, UserDb};
use crate::database::HealthCheck;
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::{Resource, ResourceGuard, RuleGuard};
use crate::services::{
    ConditionService, PatientService, ProductService, RegionService, ResourceLoader, RoleService, UserService,
};

/// Paging limits applied to every query endpoint
#[derive(Debug, Clone, Copy)]
pub struct Paging {
    pub default_rows: u32,
    pub max_rows: u32,
}

/// Shared handles for handlers and middleware
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub users: Arc<UserService>,
    pub patients: Arc<PatientService>,
    pub conditions: Arc<ConditionService>,
    pub regions: Arc<RegionService>,
    pub roles: Arc<RoleService>,
    pub products: Arc<ProductService>,
    pub health: Arc<dyn HealthCheck>,
    pub paging: Paging,
}

impl AppState {
    /// Wire the Postgres stores and core services together.
    pub fn new(cfg: &AppConfig, pool: PgPool) -> Result<Self, AuthError> {
        let auth = Arc::new(Auth::new(&cfg.security)?);

        let user_store = Arc::new(UserCache::new(Arc::new(UserDb::new(pool.clone()))));
        let users = Arc::new(UserService::new(user_store, cfg.security.bcrypt_cost));

        Ok(Self {
            auth,
            patients: Arc::new(PatientService::new(users.clone(), Arc::new(PatientDb::new(pool.clone())))),
            conditions: Arc::new(ConditionService::new(users.clone(), Arc::new(ConditionDb::new(pool.clone())))),
            regions: Arc::new(RegionService::new(users.clone(), Arc::new(RegionDb::new(pool.clone())))),
            roles: Arc::new(RoleService::new(users.clone(), Arc::new(RoleDb::new(pool.clone())))),
            products: Arc::new(ProductService::new(users.clone(), Arc::new(ProductDb::new(pool.clone())))),
            users,
            health: Arc::new(pool),
            paging: Paging {
                default_rows: cfg.api.default_rows_per_page,
                max_rows: cfg.api.max_rows_per_page,
            },
        })
    }

    pub fn rule(&self, rule: Rule) -> RuleGuard {
        RuleGuard::new(self.auth.clone(), rule)
    }

    pub fn resource<R: Resource>(&self, rule: Rule, loader: Arc<dyn ResourceLoader<R>>) -> ResourceGuard<R> {
        ResourceGuard::new(self.auth.clone(), rule, loader)
    }
}

/// All `/v1` routes plus the global layers.
pub fn router(state: AppState, cfg: &AppConfig) -> Router {
    let v1 = Router::new()
        .merge(handlers::check::routes(state.clone()))
        .merge(handlers::user::routes(state.clone()))
        .merge(handlers::patient::routes(state.clone()))
        .merge(handlers::condition::routes(state.clone()))
        .merge(handlers::region::routes(state.clone()))
        .merge(handlers::role::routes(state.clone()))
        .merge(handlers::product::routes(state));

    with_global_layers(Router::new().nest("/v1", v1), cfg)
}

fn with_global_layers(app: Router, cfg: &AppConfig) -> Router {
    let app = app
        .layer(DefaultBodyLimit::max(cfg.api.max_request_size_bytes))
        .layer(cors_layer(cfg))
        .layer(CatchPanicLayer::custom(panic_response));

    if cfg.api.enable_request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

/// Turn a handler panic into the standard 500 error envelope.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = detail, "request handler panicked");

    ApiError::internal_server_error("An error occurred while processing your request").into_response()
}

fn cors_layer(cfg: &AppConfig) -> CorsLayer {
    if !cfg.security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = cfg
        .security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn panicking_handler_returns_error_envelope() {
        async fn explode() -> &'static str {
            panic!("store invariant broken")
        }

        let app = with_global_layers(Router::new().route("/explode", get(explode)), &AppConfig::development());

        let resp = app
            .oneshot(Request::builder().uri("/explode").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("invariant"));
    }
}

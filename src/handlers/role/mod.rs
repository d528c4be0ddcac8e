//! `/v1/roles`

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    handler::Handler,
    middleware::from_fn_with_state,
    routing::get,
    Extension, Router,
};

use crate::api::{Page, PageDocument, ValidJson};
use crate::app::AppState;
use crate::auth::{Claims, Rule};
use crate::middleware::{authenticate, authorize, authorize_resource, ApiResponse, ApiResult};
use crate::services::role::Role;

mod filter;
mod model;

pub use model::{AppNewRole, AppRole, AppUpdateRole};

async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidJson(app): ValidJson<AppNewRole>,
) -> ApiResult<AppRole> {
    let rol = state.roles.create(app.into_core(claims.sub)).await?;

    Ok(ApiResponse::created(rol.into()))
}

async fn update(
    State(state): State<AppState>,
    Extension(rol): Extension<Role>,
    ValidJson(app): ValidJson<AppUpdateRole>,
) -> ApiResult<AppRole> {
    let rol = state.roles.update(rol, app.into()).await?;

    Ok(ApiResponse::success(rol.into()))
}

async fn delete(State(state): State<AppState>, Extension(rol): Extension<Role>) -> ApiResult<()> {
    state.roles.delete(&rol).await?;

    Ok(ApiResponse::<()>::no_content())
}

async fn query(
    State(state): State<AppState>,
    Query(values): Query<HashMap<String, String>>,
) -> ApiResult<PageDocument<AppRole>> {
    let page = Page::parse(&values, state.paging.default_rows, state.paging.max_rows)?;
    let filter = filter::parse_filter(&values)?;
    let order_by = filter::parse_order(&values)?;

    let rols = state
        .roles
        .query(&filter, &order_by, page.number, page.rows_per_page)
        .await?;
    let total = state.roles.count(&filter).await?;

    let items = rols.into_iter().map(AppRole::from).collect();
    Ok(ApiResponse::success(PageDocument::new(items, total, page)))
}

async fn query_by_id(Extension(rol): Extension<Role>) -> ApiResult<AppRole> {
    Ok(ApiResponse::success(rol.into()))
}

pub fn routes(state: AppState) -> Router {
    let rule_any = from_fn_with_state(state.rule(Rule::Any), authorize);
    let rule_user = from_fn_with_state(state.rule(Rule::UserOnly), authorize);
    let rule_subject = from_fn_with_state(
        state.resource::<Role>(Rule::AdminOrSubject, state.roles.clone()),
        authorize_resource::<Role>,
    );

    Router::new()
        .route("/roles", get(query.layer(rule_any)).post(create.layer(rule_user)))
        .route(
            "/roles/:role_id",
            get(query_by_id.layer(rule_subject.clone()))
                .put(update.layer(rule_subject.clone()))
                .delete(delete.layer(rule_subject)),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

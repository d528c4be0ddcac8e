//! `/v1/conditions`

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
use crate::services::condition::Condition;

mod filter;
mod model;

pub use model::{AppCondition, AppNewCondition, AppUpdateCondition};

async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidJson(app): ValidJson<AppNewCondition>,
) -> ApiResult<AppCondition> {
    let cnd = state.conditions.create(app.into_core(claims.sub)).await?;

    Ok(ApiResponse::created(cnd.into()))
}

async fn update(
    State(state): State<AppState>,
    Extension(cnd): Extension<Condition>,
    ValidJson(app): ValidJson<AppUpdateCondition>,
) -> ApiResult<AppCondition> {
    let cnd = state.conditions.update(cnd, app.into()).await?;

    Ok(ApiResponse::success(cnd.into()))
}

async fn delete(State(state): State<AppState>, Extension(cnd): Extension<Condition>) -> ApiResult<()> {
    state.conditions.delete(&cnd).await?;

    Ok(ApiResponse::<()>::no_content())
}

async fn query(
    State(state): State<AppState>,
    Query(values): Query<HashMap<String, String>>,
) -> ApiResult<PageDocument<AppCondition>> {
    let page = Page::parse(&values, state.paging.default_rows, state.paging.max_rows)?;
    let filter = filter::parse_filter(&values)?;
    let order_by = filter::parse_order(&values)?;

    let cnds = state
        .conditions
        .query(&filter, &order_by, page.number, page.rows_per_page)
        .await?;
    let total = state.conditions.count(&filter).await?;

    let items = cnds.into_iter().map(AppCondition::from).collect();
    Ok(ApiResponse::success(PageDocument::new(items, total, page)))
}

async fn query_by_id(Extension(cnd): Extension<Condition>) -> ApiResult<AppCondition> {
    Ok(ApiResponse::success(cnd.into()))
}

pub fn routes(state: AppState) -> Router {
    let rule_any = from_fn_with_state(state.rule(Rule::Any), authorize);
    let rule_user = from_fn_with_state(state.rule(Rule::UserOnly), authorize);
    let rule_subject = from_fn_with_state(
        state.resource::<Condition>(Rule::AdminOrSubject, state.conditions.clone()),
        authorize_resource::<Condition>,
    );

    Router::new()
        .route("/conditions", get(query.layer(rule_any)).post(create.layer(rule_user)))
        .route(
            "/conditions/:condition_id",
            get(query_by_id.layer(rule_subject.clone()))
                .put(update.layer(rule_subject.clone()))
                .delete(delete.layer(rule_subject)),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

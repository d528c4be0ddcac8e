//! `/v1/regions`

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
use crate::services::region::Region;

mod filter;
mod model;

pub use model::{AppNewRegion, AppRegion, AppUpdateRegion};

async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidJson(app): ValidJson<AppNewRegion>,
) -> ApiResult<AppRegion> {
    let rgn = state.regions.create(app.into_core(claims.sub)).await?;

    Ok(ApiResponse::created(rgn.into()))
}

async fn update(
    State(state): State<AppState>,
    Extension(rgn): Extension<Region>,
    ValidJson(app): ValidJson<AppUpdateRegion>,
) -> ApiResult<AppRegion> {
    let rgn = state.regions.update(rgn, app.into()).await?;

    Ok(ApiResponse::success(rgn.into()))
}

async fn delete(State(state): State<AppState>, Extension(rgn): Extension<Region>) -> ApiResult<()> {
    state.regions.delete(&rgn).await?;

    Ok(ApiResponse::<()>::no_content())
}

async fn query(
    State(state): State<AppState>,
    Query(values): Query<HashMap<String, String>>,
) -> ApiResult<PageDocument<AppRegion>> {
    let page = Page::parse(&values, state.paging.default_rows, state.paging.max_rows)?;
    let filter = filter::parse_filter(&values)?;
    let order_by = filter::parse_order(&values)?;

    let rgns = state
        .regions
        .query(&filter, &order_by, page.number, page.rows_per_page)
        .await?;
    let total = state.regions.count(&filter).await?;

    let items = rgns.into_iter().map(AppRegion::from).collect();
    Ok(ApiResponse::success(PageDocument::new(items, total, page)))
}

async fn query_by_id(Extension(rgn): Extension<Region>) -> ApiResult<AppRegion> {
    Ok(ApiResponse::success(rgn.into()))
}

pub fn routes(state: AppState) -> Router {
    let rule_any = from_fn_with_state(state.rule(Rule::Any), authorize);
    let rule_user = from_fn_with_state(state.rule(Rule::UserOnly), authorize);
    let rule_subject = from_fn_with_state(
        state.resource::<Region>(Rule::AdminOrSubject, state.regions.clone()),
        authorize_resource::<Region>,
    );

    Router::new()
        .route("/regions", get(query.layer(rule_any)).post(create.layer(rule_user)))
        .route(
            "/regions/:region_id",
            get(query_by_id.layer(rule_subject.clone()))
                .put(update.layer(rule_subject.clone()))
                .delete(delete.layer(rule_subject)),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

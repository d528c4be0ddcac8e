//! `/v1/patients`

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
use crate::services::patient::Patient;

mod model;
mod filter;

pub use model::{AppNewPatient, AppPatient, AppUpdatePatient};

async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidJson(app): ValidJson<AppNewPatient>,
) -> ApiResult<AppPatient> {
    let pn = state.patients.create(app.into_core(claims.sub)).await?;

    Ok(ApiResponse::created(pn.into()))
}

async fn update(
    State(state): State<AppState>,
    Extension(pn): Extension<Patient>,
    ValidJson(app): ValidJson<AppUpdatePatient>,
) -> ApiResult<AppPatient> {
    let pn = state.patients.update(pn, app.into()).await?;

    Ok(ApiResponse::success(pn.into()))
}

async fn delete(State(state): State<AppState>, Extension(pn): Extension<Patient>) -> ApiResult<()> {
    state.patients.delete(&pn).await?;

    Ok(ApiResponse::<()>::no_content())
}

async fn query(
    State(state): State<AppState>,
    Query(values): Query<HashMap<String, String>>,
) -> ApiResult<PageDocument<AppPatient>> {
    let page = Page::parse(&values, state.paging.default_rows, state.paging.max_rows)?;
    let filter = filter::parse_filter(&values)?;
    let order_by = filter::parse_order(&values)?;

    let pns = state
        .patients
        .query(&filter, &order_by, page.number, page.rows_per_page)
        .await?;
    let total = state.patients.count(&filter).await?;

    let items = pns.into_iter().map(AppPatient::from).collect();
    Ok(ApiResponse::success(PageDocument::new(items, total, page)))
}

async fn query_by_id(Extension(pn): Extension<Patient>) -> ApiResult<AppPatient> {
    Ok(ApiResponse::success(pn.into()))
}

pub fn routes(state: AppState) -> Router {
    let rule_any = from_fn_with_state(state.rule(Rule::Any), authorize);
    let rule_user = from_fn_with_state(state.rule(Rule::UserOnly), authorize);
    let rule_subject = from_fn_with_state(
        state.resource::<Patient>(Rule::AdminOrSubject, state.patients.clone()),
        authorize_resource::<Patient>,
    );

    Router::new()
        .route("/patients", get(query.layer(rule_any)).post(create.layer(rule_user)))
        .route(
            "/patients/:patient_id",
            get(query_by_id.layer(rule_subject.clone()))
                .put(update.layer(rule_subject.clone()))
                .delete(delete.layer(rule_subject)),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

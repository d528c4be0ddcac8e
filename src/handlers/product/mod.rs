//! `/v1/products`

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
use crate::services::product::Product;

mod filter;
mod model;

pub use model::{AppNewProduct, AppProduct, AppUpdateProduct};

async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidJson(app): ValidJson<AppNewProduct>,
) -> ApiResult<AppProduct> {
    let prd = state.products.create(app.into_core(claims.sub)).await?;

    Ok(ApiResponse::created(prd.into()))
}

async fn update(
    State(state): State<AppState>,
    Extension(prd): Extension<Product>,
    ValidJson(app): ValidJson<AppUpdateProduct>,
) -> ApiResult<AppProduct> {
    let prd = state.products.update(prd, app.into()).await?;

    Ok(ApiResponse::success(prd.into()))
}

async fn delete(State(state): State<AppState>, Extension(prd): Extension<Product>) -> ApiResult<()> {
    state.products.delete(&prd).await?;

    Ok(ApiResponse::<()>::no_content())
}

async fn query(
    State(state): State<AppState>,
    Query(values): Query<HashMap<String, String>>,
) -> ApiResult<PageDocument<AppProduct>> {
    let page = Page::parse(&values, state.paging.default_rows, state.paging.max_rows)?;
    let filter = filter::parse_filter(&values)?;
    let order_by = filter::parse_order(&values)?;

    let prds = state
        .products
        .query(&filter, &order_by, page.number, page.rows_per_page)
        .await?;
    let total = state.products.count(&filter).await?;

    let items = prds.into_iter().map(AppProduct::from).collect();
    Ok(ApiResponse::success(PageDocument::new(items, total, page)))
}

async fn query_by_id(Extension(prd): Extension<Product>) -> ApiResult<AppProduct> {
    Ok(ApiResponse::success(prd.into()))
}

pub fn routes(state: AppState) -> Router {
    let rule_any = from_fn_with_state(state.rule(Rule::Any), authorize);
    let rule_user = from_fn_with_state(state.rule(Rule::UserOnly), authorize);
    let rule_subject = from_fn_with_state(
        state.resource::<Product>(Rule::AdminOrSubject, state.products.clone()),
        authorize_resource::<Product>,
    );

    Router::new()
        .route("/products", get(query.layer(rule_any)).post(create.layer(rule_user)))
        .route(
            "/products/:product_id",
            get(query_by_id.layer(rule_subject.clone()))
                .put(update.layer(rule_subject.clone()))
                .delete(delete.layer(rule_subject)),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::testing::{self, send};

    #[tokio::test]
    async fn restock_updates_quantity_only() {
        let state = testing::app_state();
        let usr = testing::seed_user(&state.users, "stock@example.com").await;
        let token = testing::bearer(&state, &usr);

        let (status, body) = send(
            &state,
            Method::POST,
            "/v1/products",
            Some(&token),
            Some(json!({ "name": "Gauze", "cost": 2.5, "quantity": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/v1/products/{}", body["data"]["id"].as_str().unwrap());

        let (status, body) = send(&state, Method::PUT, &uri, Some(&token), Some(json!({ "quantity": 40 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["quantity"], 40);
        assert_eq!(body["data"]["cost"], 2.5);
    }

    #[tokio::test]
    async fn negative_cost_and_zero_quantity_are_field_errors() {
        let state = testing::app_state();
        let usr = testing::seed_user(&state.users, "bad-product@example.com").await;

        let (status, body) = send(
            &state,
            Method::POST,
            "/v1/products",
            Some(&testing::bearer(&state, &usr)),
            Some(json!({ "name": "Gauze", "cost": -1.0, "quantity": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["field_errors"]["cost"].is_string());
        assert!(body["field_errors"]["quantity"].is_string());
    }

    #[tokio::test]
    async fn filter_by_quantity() {
        let state = testing::app_state();
        let usr = testing::seed_user(&state.users, "filter-product@example.com").await;
        let token = testing::bearer(&state, &usr);
        for (name, quantity) in [("Gauze", 10), ("Splint", 3)] {
            send(
                &state,
                Method::POST,
                "/v1/products",
                Some(&token),
                Some(json!({ "name": name, "cost": 1.0, "quantity": quantity })),
            )
            .await;
        }

        let (status, body) = send(&state, Method::GET, "/v1/products?quantity=3", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["items"][0]["name"], "Splint");
    }
}

//! `/v1/users`

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    handler::Handler,
    middleware::from_fn_with_state,
    routing::get,
    Extension, Router,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};

use crate::api::{Page, PageDocument, ValidJson};
use crate::app::AppState;
use crate::auth::{Claims, Rule};
use crate::error::ApiError;
use crate::middleware::{authenticate, authorize, authorize_resource, ApiResponse, ApiResult};
use crate::services::user::User;

mod filter;
mod model;

pub use model::{AppNewUser, AppToken, AppUpdateUser, AppUser};

async fn create(State(state): State<AppState>, ValidJson(app): ValidJson<AppNewUser>) -> ApiResult<AppUser> {
    let usr = state.users.create(app.into_core()?).await?;

    Ok(ApiResponse::created(usr.into()))
}

async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Extension(usr): Extension<User>,
    ValidJson(app): ValidJson<AppUpdateUser>,
) -> ApiResult<AppUser> {
    // Subjects may edit their own profile; role changes stay with admins.
    if app.roles.is_some() {
        state.auth.authorize(&claims, None, Rule::AdminOnly)?;
    }

    let usr = state.users.update(usr, app.into_core()?).await?;

    Ok(ApiResponse::success(usr.into()))
}

async fn delete(State(state): State<AppState>, Extension(usr): Extension<User>) -> ApiResult<()> {
    state.users.delete(&usr).await?;

    Ok(ApiResponse::<()>::no_content())
}

async fn query(
    State(state): State<AppState>,
    Query(values): Query<HashMap<String, String>>,
) -> ApiResult<PageDocument<AppUser>> {
    let page = Page::parse(&values, state.paging.default_rows, state.paging.max_rows)?;
    let filter = filter::parse_filter(&values)?;
    let order_by = filter::parse_order(&values)?;

    let usrs = state
        .users
        .query(&filter, &order_by, page.number, page.rows_per_page)
        .await?;
    let total = state.users.count(&filter).await?;

    let items = usrs.into_iter().map(AppUser::from).collect();
    Ok(ApiResponse::success(PageDocument::new(items, total, page)))
}

async fn query_by_id(Extension(usr): Extension<User>) -> ApiResult<AppUser> {
    Ok(ApiResponse::success(usr.into()))
}

/// Exchange Basic credentials for a signed bearer token under key `kid`.
async fn token(
    State(state): State<AppState>,
    Path(kid): Path<String>,
    basic: Option<TypedHeader<Authorization<Basic>>>,
) -> ApiResult<AppToken> {
    let TypedHeader(Authorization(creds)) =
        basic.ok_or_else(|| ApiError::unauthorized("must provide email and password in Basic auth"))?;

    let usr = state.users.authenticate(creds.username(), creds.password()).await?;

    let claims = state.auth.claims_for(usr.id, usr.roles);
    let token = state.auth.generate_token(&kid, &claims)?;

    Ok(ApiResponse::success(AppToken { token }))
}

pub fn routes(state: AppState) -> Router {
    let rule_admin = from_fn_with_state(state.rule(Rule::AdminOnly), authorize);
    let rule_subject = from_fn_with_state(
        state.resource::<User>(Rule::AdminOrSubject, state.users.clone()),
        authorize_resource::<User>,
    );

    Router::new()
        .route("/users", get(query.layer(rule_admin.clone())).post(create.layer(rule_admin)))
        .route(
            "/users/:user_id",
            get(query_by_id.layer(rule_subject.clone()))
                .put(update.layer(rule_subject.clone()))
                .delete(delete.layer(rule_subject)),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .route("/users/token/:kid", get(token))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use base64::Engine;
    use serde_json::json;

    use crate::services::user::UserRole;
    use crate::testing::{self, send, TEST_PASSWORD};

    fn basic(email: &str, password: &str) -> String {
        let raw = format!("{}:{}", email, password);
        format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(raw))
    }

    fn new_user(email: &str) -> serde_json::Value {
        json!({
            "name": "Bill Kennedy",
            "email": email,
            "roles": ["USER"],
            "department": "IT",
            "password": "secret",
            "passwordConfirm": "secret"
        })
    }

    #[tokio::test]
    async fn admin_creates_users_and_hides_the_hash() {
        let state = testing::app_state();
        let admin = testing::seed_user_with_roles(&state.users, "admin@example.com", vec![UserRole::Admin]).await;
        let token = testing::bearer(&state, &admin);

        let (status, body) = send(&state, Method::POST, "/v1/users", Some(&token), Some(new_user("bill@example.com"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["roles"], json!(["USER"]));
        assert_eq!(body["data"]["enabled"], true);
        assert!(body["data"].get("passwordHash").is_none());
        assert!(body["data"].get("password_hash").is_none());

        let (status, _) = send(&state, Method::POST, "/v1/users", Some(&token), Some(new_user("bill@example.com"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn plain_users_cannot_list_or_create() {
        let state = testing::app_state();
        let usr = testing::seed_user(&state.users, "plain@example.com").await;
        let token = testing::bearer(&state, &usr);

        let (status, _) = send(&state, Method::GET, "/v1/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&state, Method::POST, "/v1/users", Some(&token), Some(new_user("x@example.com"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn users_read_themselves_but_not_others() {
        let state = testing::app_state();
        let usr = testing::seed_user(&state.users, "self@example.com").await;
        let other = testing::seed_user(&state.users, "other@example.com").await;
        let token = testing::bearer(&state, &usr);

        let (status, body) = send(&state, Method::GET, &format!("/v1/users/{}", usr.id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "self@example.com");

        let (status, _) = send(&state, Method::GET, &format!("/v1/users/{}", other.id), Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn only_admins_change_roles() {
        let state = testing::app_state();
        let usr = testing::seed_user(&state.users, "promote@example.com").await;
        let admin = testing::seed_user_with_roles(&state.users, "boss@example.com", vec![UserRole::Admin]).await;
        let uri = format!("/v1/users/{}", usr.id);
        let body = json!({ "roles": ["ADMIN", "USER"] });

        let (status, resp) = send(&state, Method::PUT, &uri, Some(&testing::bearer(&state, &usr)), Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(resp["message"].as_str().unwrap().contains("admin_only"));

        let (status, resp) = send(&state, Method::PUT, &uri, Some(&testing::bearer(&state, &admin)), Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["data"]["roles"], json!(["ADMIN", "USER"]));
    }

    #[tokio::test]
    async fn users_rename_themselves() {
        let state = testing::app_state();
        let usr = testing::seed_user(&state.users, "rename-self@example.com").await;
        let uri = format!("/v1/users/{}", usr.id);

        let (status, resp) = send(
            &state,
            Method::PUT,
            &uri,
            Some(&testing::bearer(&state, &usr)),
            Some(json!({ "name": "New Name" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["data"]["name"], "New Name");
        assert_eq!(resp["data"]["roles"], json!(["USER"]));
    }

    #[tokio::test]
    async fn disabled_user_token_is_refused() {
        let state = testing::app_state();
        let usr = testing::seed_user(&state.users, "soon-off@example.com").await;
        let token = testing::bearer(&state, &usr);
        let uri = format!("/v1/users/{}", usr.id);

        let (status, _) = send(&state, Method::PUT, &uri, Some(&token), Some(json!({ "enabled": false }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&state, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_issued_for_valid_basic_credentials() {
        let state = testing::app_state();
        let usr = testing::seed_user(&state.users, "login@example.com").await;

        let auth = basic("login@example.com", TEST_PASSWORD);
        let (status, body) = send(&state, Method::GET, "/v1/users/token/54bb2165", Some(&auth), None).await;
        assert_eq!(status, StatusCode::OK);

        let token = body["data"]["token"].as_str().unwrap();
        let claims = state.auth.authenticate(&format!("Bearer {}", token)).unwrap();
        assert_eq!(claims.sub, usr.id);

        let header = jsonwebtoken::decode_header(token).unwrap();
        assert_eq!(header.kid.as_deref(), Some("54bb2165"));
    }

    #[tokio::test]
    async fn token_refused_without_or_with_bad_credentials() {
        let state = testing::app_state();
        testing::seed_user(&state.users, "guarded@example.com").await;

        let (status, _) = send(&state, Method::GET, "/v1/users/token/k1", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let auth = basic("guarded@example.com", "wrong");
        let (status, _) = send(&state, Method::GET, "/v1/users/token/k1", Some(&auth), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let auth = basic("nobody@example.com", TEST_PASSWORD);
        let (status, _) = send(&state, Method::GET, "/v1/users/token/k1", Some(&auth), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn mismatched_password_confirmation() {
        let state = testing::app_state();
        let admin = testing::seed_user_with_roles(&state.users, "root@example.com", vec![UserRole::Admin]).await;

        let mut body = new_user("typo@example.com");
        body["passwordConfirm"] = json!("secrte");
        let (status, resp) = send(&state, Method::POST, "/v1/users", Some(&testing::bearer(&state, &admin)), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp["field_errors"]["passwordConfirm"].is_string());
    }
}

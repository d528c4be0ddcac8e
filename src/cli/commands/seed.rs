use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::services::user::{NewUser, UserRole};
use crate::services::UserService;

pub const SEED_PASSWORD: &str = "gophers";

fn seed_users() -> Vec<NewUser> {
    vec![
        NewUser {
            name: "Admin Gopher".to_string(),
            email: "admin@example.com".to_string(),
            roles: vec![UserRole::Admin, UserRole::User],
            department: None,
            password: SEED_PASSWORD.to_string(),
        },
        NewUser {
            name: "User Gopher".to_string(),
            email: "user@example.com".to_string(),
            roles: vec![UserRole::User],
            department: None,
            password: SEED_PASSWORD.to_string(),
        },
    ]
}

/// Create each seed account unless its email is already registered.
pub async fn seed(users: &UserService) -> anyhow::Result<Vec<String>> {
    let mut created = Vec::new();

    for nu in seed_users() {
        match users.query_by_email(&nu.email).await {
            Ok(_) => tracing::debug!("seed user {} already present", nu.email),
            Err(e) if e.is_not_found() => {
                let usr = users.create(nu).await?;
                created.push(usr.email);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(created)
}

pub async fn handle(cfg: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = crate::cli::connect(cfg).await?;
    let users = crate::cli::user_service(cfg, pool);

    let created = seed(&users).await?;

    utils::output_success(
        &output_format,
        &format!("seeded {} user(s)", created.len()),
        Some(json!({ "created": created.join(", ") })),
    )
}

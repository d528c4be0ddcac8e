use clap::Args;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::services::user::{NewUser, UserRole};

#[derive(Args, Debug)]
pub struct UseraddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long, help = "Grant the ADMIN role as well as USER")]
    pub admin: bool,
}

impl From<UseraddArgs> for NewUser {
    fn from(args: UseraddArgs) -> Self {
        let mut roles = vec![UserRole::User];
        if args.admin {
            roles.insert(0, UserRole::Admin);
        }

        NewUser {
            name: args.name,
            email: args.email,
            roles,
            department: args.department,
            password: args.password,
        }
    }
}

pub async fn handle(cfg: &AppConfig, args: UseraddArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = crate::cli::connect(cfg).await?;
    let users = crate::cli::user_service(cfg, pool);

    let usr = match users.create(args.into()).await {
        Ok(usr) => usr,
        Err(e) => {
            utils::output_error(&output_format, &e.to_string())?;
            return Err(e.into());
        }
    };

    utils::output_success(
        &output_format,
        "user created",
        Some(json!({ "id": usr.id.to_string(), "email": usr.email })),
    )
}

use clap::Args;
use serde_json::json;

use crate::auth::Auth;
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;

pub const DEFAULT_KID: &str = "54bb2165-71e1-41a6-af3e-7da4a0e1e2c1";

#[derive(Args, Debug)]
pub struct GentokenArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, default_value = DEFAULT_KID, help = "Key id written to the token header")]
    pub kid: String,
}

pub async fn handle(cfg: &AppConfig, args: GentokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let auth = Auth::new(&cfg.security)?;
    let pool = crate::cli::connect(cfg).await?;
    let users = crate::cli::user_service(cfg, pool);

    let usr = users.query_by_email(&args.email).await?;
    if !usr.enabled {
        anyhow::bail!("user {} is disabled", usr.email);
    }

    let claims = auth.claims_for(usr.id, usr.roles);
    let token = auth.generate_token(&args.kid, &claims)?;

    utils::output_success(&output_format, "token generated", Some(json!({ "token": token })))
}

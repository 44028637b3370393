//! Bootstrap an administrator account.

use clap::Parser;
use gnss_portal::{
    Config,
    db::{NewUser, PortalStorage},
    service::password::hash_password,
    types::users::normalize_email,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(about = "Create an active staff/superuser account")]
struct Args {
    #[arg(long)]
    email: String,
    #[arg(long)]
    user_name: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    organization: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let cfg = Config::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::new(cfg.loglevel.clone()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if args.email.trim().is_empty() {
        return Err("You must provide an email address".into());
    }

    let storage = PortalStorage::connect(&cfg.database.url).await?;
    let user = storage
        .create_user(NewUser {
            email: normalize_email(&args.email),
            user_name: args.user_name,
            organization: args.organization,
            password_hash: hash_password(&args.password)?,
            is_active: true,
            is_staff: true,
            is_superuser: true,
        })
        .await?;
    info!(user_id = user.id, email = %user.email, "superuser created");
    Ok(())
}

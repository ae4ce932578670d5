//! CLI to create an administrator account.
//!
//! Seeds the default roles and permissions first, so it also works against
//! a database that has never been initialized by the server.

use std::sync::Arc;

use clap::Parser;

use xerppy_api::{
    config::AppConfig,
    db,
    dtos::auth::RegisterRequest,
    models::ROLE_ADMIN,
    observability::init_tracing,
    services::{AuthService, AuthStore, Database, JwtService},
};

#[derive(Parser)]
#[command(name = "create-admin", about = "Create an admin user for Xerppy")]
struct Args {
    /// Admin username
    #[arg(long)]
    username: String,

    /// Admin email
    #[arg(long)]
    email: String,

    /// Admin password (or set XERPPY_ADMIN_PASSWORD)
    #[arg(long, env = "XERPPY_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.password.len() < 8 {
        anyhow::bail!("Password must be at least 8 characters");
    }

    let config = AppConfig::from_env()?;
    init_tracing(&config.log_level);

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let store: Arc<dyn AuthStore> = Arc::new(Database::new(pool));
    let jwt = JwtService::new(&config.jwt)?;
    let auth = AuthService::new(store, jwt);

    auth.seed_default_roles_and_permissions().await?;

    let user = auth
        .register_with_role(
            RegisterRequest {
                username: args.username,
                email: args.email,
                password: args.password,
            },
            ROLE_ADMIN,
        )
        .await?;

    println!("Admin user '{}' created (id {})", user.username, user.id);
    Ok(())
}

//! Giveaway bot - Telegram giveaways with referrals and promo codes
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Teloxide for the Telegram bot with inline keyboards
//! - Axum for the admin JSON API with rate limiting
//! - Tokio for async runtime

mod entity;
mod error;
mod flow;
mod fraud;
mod gateway;
mod input;
mod plugins;
mod prelude;
mod state;
mod sv;

use std::{collections::HashSet, env};

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{prelude::*, state::AppState};

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "giveaway=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let admins: HashSet<i64> = env::var("ADMIN_IDS")
    .expect("ADMIN_IDS not set")
    .split(',')
    .filter(|s| !s.trim().is_empty())
    .map(|id| id.trim().parse().expect("Invalid Admin ID format"))
    .collect();

  let db_url = env::var("DATABASE_URL")
    .unwrap_or_else(|_| "sqlite:giveaway.db?mode=rwc".into());
  let token = env::var("TELOXIDE_TOKEN").expect("TELOXIDE_TOKEN not set");
  let secret = env::var("ADMIN_SECRET").expect("ADMIN_SECRET not set");

  info!("Starting Giveaway Bot v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(&db_url, &token, admins, secret).await);

  plugins::App::new()
    .register(plugins::telegram::Plugin)
    .register(plugins::server::Plugin)
    .run(app)
    .await;

  tokio::signal::ctrl_c().await.expect("Failed to listen for ctrl-c");
  info!("Shutting down");
}

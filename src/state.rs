use std::collections::HashSet;

use migration::Migrator;
use teloxide::Bot;

use crate::{
  flow::{Flow, Flows},
  fraud::RateLimiter,
  gateway::TelegramGateway,
  prelude::*,
  sv,
};

/// Which side of the bot a user is currently operating, toggled from the
/// role-choice keyboard. Admin actions require this *and* membership in the
/// configured admin-id set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  User,
  Admin,
}

#[derive(Debug, Clone)]
pub struct Config {
  /// Redemption attempts admitted per user within the window.
  pub redeem_limit: usize,
  pub redeem_window_secs: i64,
}

impl Default for Config {
  fn default() -> Self {
    Self { redeem_limit: 5, redeem_window_secs: 60 }
  }
}

pub struct Services<'a> {
  pub giveaway: sv::Giveaway<'a>,
  pub participant: sv::Participant<'a>,
  pub referral: sv::Referral<'a>,
  pub promo: sv::Promo<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub bot: Bot,
  pub gateway: TelegramGateway,
  pub admins: HashSet<i64>,
  pub secret: String,
  pub flows: Flows,
  pub limiter: RateLimiter,
  pub config: Config,
  modes: DashMap<i64, Mode>,
}

impl AppState {
  pub async fn new(
    db_url: &str,
    bot_token: &str,
    admins: HashSet<i64>,
    secret: String,
  ) -> Self {
    Self::with_config(db_url, bot_token, admins, secret, Config::default())
      .await
  }

  pub async fn with_config(
    db_url: &str,
    bot_token: &str,
    admins: HashSet<i64>,
    secret: String,
    config: Config,
  ) -> Self {
    info!("Connecting to database...");
    let db =
      Database::connect(db_url).await.expect("Failed to connect to database");

    info!("Running migrations...");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let bot = Bot::new(bot_token);
    let gateway = TelegramGateway::new(bot.clone());

    Self {
      db,
      bot,
      gateway,
      admins,
      secret,
      flows: DashMap::new(),
      limiter: RateLimiter::new(),
      config,
      modes: DashMap::new(),
    }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      giveaway: sv::Giveaway::new(&self.db),
      participant: sv::Participant::new(&self.db),
      referral: sv::Referral::new(&self.db),
      promo: sv::Promo::new(&self.db),
    }
  }

  pub fn is_admin(&self, user_id: i64) -> bool {
    self.admins.contains(&user_id)
  }

  pub fn mode_of(&self, user_id: i64) -> Mode {
    self.modes.get(&user_id).map(|mode| *mode).unwrap_or(Mode::User)
  }

  pub fn set_mode(&self, user_id: i64, mode: Mode) {
    self.modes.insert(user_id, mode);
  }

  /// Authorization gate for every admin flow step.
  pub fn admin_acting(&self, user_id: i64) -> bool {
    self.is_admin(user_id) && self.mode_of(user_id) == Mode::Admin
  }

  /// Starting a flow always discards whatever the user had in progress.
  pub fn enter_flow(&self, user_id: i64, flow: Flow) {
    self.flows.insert(user_id, flow);
  }

  pub fn clear_flow(&self, user_id: i64) {
    self.flows.remove(&user_id);
  }
}

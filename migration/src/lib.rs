//! Database migrations using SeaORM

pub use sea_orm_migration::prelude::*;

mod m20260830_000001_create_giveaways;
mod m20260830_000002_create_participants;
mod m20260830_000003_create_referrals;
mod m20260830_000004_create_promo_codes;
mod m20260830_000005_create_promo_uses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260830_000001_create_giveaways::Migration),
      Box::new(m20260830_000002_create_participants::Migration),
      Box::new(m20260830_000003_create_referrals::Migration),
      Box::new(m20260830_000004_create_promo_codes::Migration),
      Box::new(m20260830_000005_create_promo_uses::Migration),
    ]
  }
}

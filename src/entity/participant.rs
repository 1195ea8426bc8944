//! Participant entity - a user's enrollment in one giveaway
//!
//! `tickets` is the entry weight used for a future draw; it starts at 1 and
//! grows via referral milestones and promo redemptions.

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub giveaway_id: i64,
  #[sea_orm(primary_key, auto_increment = false)]
  pub user_id: i64,
  pub username: String,
  pub first_name: String,
  pub tickets: i32,
  pub invited_count: i32,
  pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::giveaway::Entity",
    from = "Column::GiveawayId",
    to = "super::giveaway::Column::Id"
  )]
  Giveaway,
}

impl Related<super::giveaway::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Giveaway.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

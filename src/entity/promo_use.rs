//! PromoUse entity - one redemption event
//!
//! Inserting this row is what prevents a user redeeming the same code twice
//! for the same giveaway.

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promo_uses")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub giveaway_id: i64,
  #[sea_orm(primary_key, auto_increment = false)]
  pub user_id: i64,
  #[sea_orm(primary_key, auto_increment = false)]
  pub code: String,
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

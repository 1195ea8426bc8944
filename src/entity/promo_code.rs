//! PromoCode entity - a redeemable token with finite capacity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promo_codes")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub giveaway_id: i64,
  #[sea_orm(primary_key, auto_increment = false)]
  pub code: String,
  pub is_active: bool,
  pub max_uses: i32,
  pub uses: i32,
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

impl Model {
  pub fn redeemable(&self) -> bool {
    self.is_active && self.uses < self.max_uses
  }
}

impl ActiveModelBehavior for ActiveModel {}

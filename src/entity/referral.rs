//! Referral entity - who invited whom, scoped to one giveaway
//!
//! The (giveaway, invited) primary key makes the first recorded inviter win;
//! later referral links for the same user are silently ignored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referrals")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub giveaway_id: i64,
  #[sea_orm(primary_key, auto_increment = false)]
  pub invited_id: i64,
  pub inviter_id: i64,
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

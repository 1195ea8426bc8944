//! Giveaway entity - a promotional campaign with an optional gating channel

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "giveaways")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub title: String,
  #[sea_orm(column_type = "Text")]
  pub description: String,
  pub winners_count: i32,
  /// Public `@handle` whose membership gates participation, if any.
  pub channel: Option<String>,
  pub ends_at: Option<NaiveDateTime>,
  pub is_active: bool,
  pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::participant::Entity")]
  Participants,
  #[sea_orm(has_many = "super::referral::Entity")]
  Referrals,
  #[sea_orm(has_many = "super::promo_code::Entity")]
  PromoCodes,
  #[sea_orm(has_many = "super::promo_use::Entity")]
  PromoUses,
}

impl Related<super::participant::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Participants.def()
  }
}

impl Related<super::promo_code::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PromoCodes.def()
  }
}

impl Model {
  /// Whether the stored deadline has passed at `now`.
  pub fn expired_at(&self, now: NaiveDateTime) -> bool {
    matches!(self.ends_at, Some(ends_at) if ends_at <= now)
  }
}

impl ActiveModelBehavior for ActiveModel {}

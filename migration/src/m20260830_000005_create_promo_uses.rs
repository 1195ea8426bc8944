use sea_orm_migration::prelude::*;

use super::m20260830_000001_create_giveaways::Giveaways;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PromoUses::Table)
          .if_not_exists()
          .col(ColumnDef::new(PromoUses::GiveawayId).big_integer().not_null())
          .col(ColumnDef::new(PromoUses::UserId).big_integer().not_null())
          .col(ColumnDef::new(PromoUses::Code).string().not_null())
          .col(ColumnDef::new(PromoUses::CreatedAt).date_time().not_null())
          // one redemption per (giveaway, user, code)
          .primary_key(
            Index::create()
              .col(PromoUses::GiveawayId)
              .col(PromoUses::UserId)
              .col(PromoUses::Code),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_promo_uses_giveaway")
              .from(PromoUses::Table, PromoUses::GiveawayId)
              .to(Giveaways::Table, Giveaways::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PromoUses::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PromoUses {
  Table,
  GiveawayId,
  UserId,
  Code,
  CreatedAt,
}

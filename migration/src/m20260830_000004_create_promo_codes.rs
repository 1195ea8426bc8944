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
          .table(PromoCodes::Table)
          .if_not_exists()
          .col(ColumnDef::new(PromoCodes::GiveawayId).big_integer().not_null())
          .col(ColumnDef::new(PromoCodes::Code).string().not_null())
          .col(
            ColumnDef::new(PromoCodes::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(
            ColumnDef::new(PromoCodes::MaxUses)
              .integer()
              .not_null()
              .default(1),
          )
          .col(
            ColumnDef::new(PromoCodes::Uses).integer().not_null().default(0),
          )
          .primary_key(
            Index::create().col(PromoCodes::GiveawayId).col(PromoCodes::Code),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_promo_codes_giveaway")
              .from(PromoCodes::Table, PromoCodes::GiveawayId)
              .to(Giveaways::Table, Giveaways::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PromoCodes::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PromoCodes {
  Table,
  GiveawayId,
  Code,
  IsActive,
  MaxUses,
  Uses,
}

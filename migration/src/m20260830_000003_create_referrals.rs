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
          .table(Referrals::Table)
          .if_not_exists()
          .col(ColumnDef::new(Referrals::GiveawayId).big_integer().not_null())
          .col(ColumnDef::new(Referrals::InvitedId).big_integer().not_null())
          .col(ColumnDef::new(Referrals::InviterId).big_integer().not_null())
          // an invited user has exactly one inviter per giveaway
          .primary_key(
            Index::create().col(Referrals::GiveawayId).col(Referrals::InvitedId),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_referrals_giveaway")
              .from(Referrals::Table, Referrals::GiveawayId)
              .to(Giveaways::Table, Giveaways::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Referrals::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Referrals {
  Table,
  GiveawayId,
  InvitedId,
  InviterId,
}

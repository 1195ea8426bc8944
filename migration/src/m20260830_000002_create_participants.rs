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
          .table(Participants::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Participants::GiveawayId).big_integer().not_null(),
          )
          .col(ColumnDef::new(Participants::UserId).big_integer().not_null())
          .col(
            ColumnDef::new(Participants::Username)
              .string()
              .not_null()
              .default(""),
          )
          .col(
            ColumnDef::new(Participants::FirstName)
              .string()
              .not_null()
              .default(""),
          )
          .col(
            ColumnDef::new(Participants::Tickets)
              .integer()
              .not_null()
              .default(1),
          )
          .col(
            ColumnDef::new(Participants::InvitedCount)
              .integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Participants::CreatedAt).date_time().not_null())
          // one row per (giveaway, user)
          .primary_key(
            Index::create()
              .col(Participants::GiveawayId)
              .col(Participants::UserId),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_participants_giveaway")
              .from(Participants::Table, Participants::GiveawayId)
              .to(Giveaways::Table, Giveaways::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Participants::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Participants {
  Table,
  GiveawayId,
  UserId,
  Username,
  FirstName,
  Tickets,
  InvitedCount,
  CreatedAt,
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Giveaways::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Giveaways::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Giveaways::Title).string().not_null())
          .col(
            ColumnDef::new(Giveaways::Description)
              .text()
              .not_null()
              .default(""),
          )
          .col(
            ColumnDef::new(Giveaways::WinnersCount)
              .integer()
              .not_null()
              .default(1),
          )
          .col(ColumnDef::new(Giveaways::Channel).string().null())
          .col(ColumnDef::new(Giveaways::EndsAt).date_time().null())
          .col(
            ColumnDef::new(Giveaways::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Giveaways::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Giveaways::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Giveaways {
  Table,
  Id,
  Title,
  Description,
  WinnersCount,
  Channel,
  EndsAt,
  IsActive,
  CreatedAt,
}

pub mod giveaway;
pub mod participant;
pub mod promo;
pub mod referral;

pub use giveaway::Giveaway;
pub use participant::{Join, Milestone, NewParticipant, Participant};
pub use promo::{Create, Promo, Redeem};
pub use referral::{Referral, Register};

#[cfg(test)]
pub(crate) mod tests {
  use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema};

  use crate::entity;

  pub async fn mem_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    create_schema(&db).await;
    db
  }

  /// File-backed database for tests that need multiple connections racing
  /// on the same data; in-memory sqlite is private per connection.
  pub async fn file_db(path: std::path::PathBuf) -> DatabaseConnection {
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = Database::connect(url).await.unwrap();
    create_schema(&db).await;
    db
  }

  async fn create_schema(db: &DatabaseConnection) {
    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(entity::giveaway::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(entity::participant::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(entity::referral::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(entity::promo_code::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(entity::promo_use::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();
  }

  /// Giveaway row for tests that exercise child tables.
  pub async fn seed_giveaway(db: &DatabaseConnection) -> i64 {
    seed_giveaway_until(db, None).await
  }

  pub async fn seed_giveaway_until(
    db: &DatabaseConnection,
    ends_at: Option<chrono::NaiveDateTime>,
  ) -> i64 {
    super::Giveaway::new(db)
      .create("Spring Draw", "", ends_at, 1, None)
      .await
      .unwrap()
      .id
  }
}

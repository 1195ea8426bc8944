use crate::{entity::referral, prelude::*};

/// Outcome of an attempt to record who invited a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
  Registered,
  /// Invite-yourself links are refused before any row exists.
  SelfReferral,
  /// The user was already referred into this giveaway; first inviter wins
  /// and later attempts are ignored quietly.
  Duplicate,
  /// The link points at a giveaway that was never created.
  UnknownGiveaway,
}

pub struct Referral<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Referral<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn register(
    &self,
    giveaway_id: i64,
    inviter_id: i64,
    invited_id: i64,
  ) -> Result<Register> {
    if inviter_id == invited_id {
      return Ok(Register::SelfReferral);
    }

    let row = referral::ActiveModel {
      giveaway_id: Set(giveaway_id),
      invited_id: Set(invited_id),
      inviter_id: Set(inviter_id),
    };

    match row.insert(self.db).await {
      Ok(_) => Ok(Register::Registered),
      Err(err)
        if matches!(
          err.sql_err(),
          Some(SqlErr::UniqueConstraintViolation(_))
        ) =>
      {
        Ok(Register::Duplicate)
      }
      Err(err)
        if matches!(
          err.sql_err(),
          Some(SqlErr::ForeignKeyConstraintViolation(_))
        ) =>
      {
        Ok(Register::UnknownGiveaway)
      }
      Err(err) => Err(err.into()),
    }
  }

  pub async fn for_invited(
    &self,
    giveaway_id: i64,
    invited_id: i64,
  ) -> Result<Option<referral::Model>> {
    let found = referral::Entity::find_by_id((giveaway_id, invited_id))
      .one(self.db)
      .await?;
    Ok(found)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::tests::{mem_db, seed_giveaway};

  #[tokio::test]
  async fn first_inviter_wins() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    let sv = Referral::new(&db);

    assert_eq!(sv.register(gid, 100, 200).await.unwrap(), Register::Registered);
    assert_eq!(sv.register(gid, 300, 200).await.unwrap(), Register::Duplicate);

    let row = sv.for_invited(gid, 200).await.unwrap().unwrap();
    assert_eq!(row.inviter_id, 100);
  }

  #[tokio::test]
  async fn self_referral_creates_nothing() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    let sv = Referral::new(&db);

    assert_eq!(
      sv.register(gid, 200, 200).await.unwrap(),
      Register::SelfReferral
    );
    assert!(sv.for_invited(gid, 200).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn scoped_per_giveaway() {
    let db = mem_db().await;
    let first = seed_giveaway(&db).await;
    let second = seed_giveaway(&db).await;
    let sv = Referral::new(&db);

    assert_eq!(
      sv.register(first, 100, 200).await.unwrap(),
      Register::Registered
    );
    assert_eq!(
      sv.register(second, 100, 200).await.unwrap(),
      Register::Registered
    );
  }

  #[tokio::test]
  async fn unknown_giveaway_is_reported() {
    let db = mem_db().await;
    let sv = Referral::new(&db);

    assert_eq!(
      sv.register(9999, 100, 200).await.unwrap(),
      Register::UnknownGiveaway
    );
  }
}

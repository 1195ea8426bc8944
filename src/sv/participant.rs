use sea_orm::DatabaseTransaction;

use crate::{
  entity::{participant, referral},
  prelude::*,
};

/// Snapshot of the joining user at enrollment time.
#[derive(Debug, Clone)]
pub struct NewParticipant {
  pub user_id: i64,
  pub username: String,
  pub first_name: String,
}

/// Referral bonus granted during a join: the inviter crossed an
/// every-5th-invite milestone and earned an extra ticket. The caller
/// dispatches the (best-effort) notification after the transaction commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
  pub inviter_id: i64,
  pub invited_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
  Joined { milestone: Option<Milestone> },
  /// Duplicate enrollment is acknowledged, never treated as an error.
  AlreadyJoined,
}

pub struct Participant<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Participant<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Enroll a user and, in the same transaction, credit the inviter that
  /// referred them (if any). Referral credit is evaluated exactly once, at
  /// this moment; an inviter without a participant row gets nothing, now or
  /// later.
  pub async fn join(
    &self,
    giveaway_id: i64,
    user: NewParticipant,
  ) -> Result<Join> {
    let txn = self.db.begin().await?;
    let now = Utc::now().naive_utc();

    let row = participant::ActiveModel {
      giveaway_id: Set(giveaway_id),
      user_id: Set(user.user_id),
      username: Set(user.username),
      first_name: Set(user.first_name),
      tickets: Set(1),
      invited_count: Set(0),
      created_at: Set(now),
    };

    if let Err(err) = row.insert(&txn).await {
      return match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
          txn.rollback().await?;
          Ok(Join::AlreadyJoined)
        }
        _ => Err(err.into()),
      };
    }

    let milestone = credit_inviter(&txn, giveaway_id, user.user_id).await?;
    txn.commit().await?;

    Ok(Join::Joined { milestone })
  }

  pub async fn by_user(
    &self,
    giveaway_id: i64,
    user_id: i64,
  ) -> Result<Option<participant::Model>> {
    let found = participant::Entity::find_by_id((giveaway_id, user_id))
      .one(self.db)
      .await?;
    Ok(found)
  }

  pub async fn count(&self, giveaway_id: i64) -> Result<u64> {
    let count = participant::Entity::find()
      .filter(participant::Column::GiveawayId.eq(giveaway_id))
      .count(self.db)
      .await?;
    Ok(count)
  }
}

async fn credit_inviter(
  txn: &DatabaseTransaction,
  giveaway_id: i64,
  invited_id: i64,
) -> Result<Option<Milestone>> {
  let Some(referral) =
    referral::Entity::find_by_id((giveaway_id, invited_id)).one(txn).await?
  else {
    return Ok(None);
  };

  if referral.inviter_id == invited_id {
    return Ok(None);
  }

  let Some(inviter) =
    participant::Entity::find_by_id((giveaway_id, referral.inviter_id))
      .one(txn)
      .await?
  else {
    // inviter never joined: credit is lost, not deferred
    return Ok(None);
  };

  let invited_count = inviter.invited_count + 1;
  let bonus = invited_count % 5 == 0;
  let tickets = inviter.tickets + i32::from(bonus);

  participant::ActiveModel {
    invited_count: Set(invited_count),
    tickets: Set(tickets),
    ..inviter.into()
  }
  .update(txn)
  .await?;

  Ok(bonus.then_some(Milestone {
    inviter_id: referral.inviter_id,
    invited_count,
  }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{
    Referral,
    tests::{mem_db, seed_giveaway},
  };

  fn user(id: i64) -> NewParticipant {
    NewParticipant {
      user_id: id,
      username: format!("user{id}"),
      first_name: "Test".into(),
    }
  }

  #[tokio::test]
  async fn join_is_idempotent() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    let sv = Participant::new(&db);

    assert_eq!(
      sv.join(gid, user(1)).await.unwrap(),
      Join::Joined { milestone: None }
    );
    assert_eq!(sv.join(gid, user(1)).await.unwrap(), Join::AlreadyJoined);

    assert_eq!(sv.count(gid).await.unwrap(), 1);
    let row = sv.by_user(gid, 1).await.unwrap().unwrap();
    assert_eq!(row.tickets, 1);
  }

  #[tokio::test]
  async fn inviter_earns_ticket_every_fifth_join() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    let sv = Participant::new(&db);
    let referrals = Referral::new(&db);

    sv.join(gid, user(100)).await.unwrap();

    for invited in 1..=7 {
      referrals.register(gid, 100, invited).await.unwrap();
      let join = sv.join(gid, user(invited)).await.unwrap();

      let milestone = (invited == 5).then_some(Milestone {
        inviter_id: 100,
        invited_count: 5,
      });
      assert_eq!(join, Join::Joined { milestone });
    }

    let inviter = sv.by_user(gid, 100).await.unwrap().unwrap();
    assert_eq!(inviter.invited_count, 7);
    assert_eq!(inviter.tickets, 1 + 7 / 5);
  }

  #[tokio::test]
  async fn rejoining_grants_no_second_credit() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    let sv = Participant::new(&db);

    sv.join(gid, user(100)).await.unwrap();
    Referral::new(&db).register(gid, 100, 1).await.unwrap();

    sv.join(gid, user(1)).await.unwrap();
    assert_eq!(sv.join(gid, user(1)).await.unwrap(), Join::AlreadyJoined);

    let inviter = sv.by_user(gid, 100).await.unwrap().unwrap();
    assert_eq!(inviter.invited_count, 1);
  }

  #[tokio::test]
  async fn credit_is_lost_when_inviter_never_joined() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    let sv = Participant::new(&db);

    Referral::new(&db).register(gid, 100, 1).await.unwrap();
    assert_eq!(
      sv.join(gid, user(1)).await.unwrap(),
      Join::Joined { milestone: None }
    );

    // inviter joining afterwards does not backfill the credit
    sv.join(gid, user(100)).await.unwrap();
    let inviter = sv.by_user(gid, 100).await.unwrap().unwrap();
    assert_eq!(inviter.invited_count, 0);
    assert_eq!(inviter.tickets, 1);
  }
}

use crate::{
  entity::{participant, promo_code, promo_use},
  prelude::*,
  sv,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Create {
  Created(promo_code::Model),
  /// The code already exists for this giveaway.
  Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redeem {
  Accepted { tickets: i32 },
  /// Giveaway missing, deactivated, or past its deadline.
  Closed,
  /// Joining is a prerequisite to redeeming.
  NotParticipant,
  /// Code missing, deactivated, or out of capacity.
  Invalid,
  /// This user already redeemed this exact code.
  AlreadyRedeemed,
}

pub struct Promo<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Promo<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(
    &self,
    giveaway_id: i64,
    code: &str,
    max_uses: i32,
  ) -> Result<Create> {
    let row = promo_code::ActiveModel {
      giveaway_id: Set(giveaway_id),
      code: Set(code.to_string()),
      is_active: Set(true),
      max_uses: Set(max_uses),
      uses: Set(0),
    };

    match row.insert(self.db).await {
      Ok(created) => Ok(Create::Created(created)),
      Err(err)
        if matches!(
          err.sql_err(),
          Some(SqlErr::UniqueConstraintViolation(_))
        ) =>
      {
        Ok(Create::Duplicate)
      }
      Err(err) => Err(err.into()),
    }
  }

  pub async fn list(
    &self,
    giveaway_id: i64,
  ) -> Result<Vec<promo_code::Model>> {
    let codes = promo_code::Entity::find()
      .filter(promo_code::Column::GiveawayId.eq(giveaway_id))
      .order_by_asc(promo_code::Column::Code)
      .all(self.db)
      .await?;
    Ok(codes)
  }

  /// Redeem `code` for a participant. The precondition reads run inside the
  /// transaction that performs the increments, so two concurrent redemptions
  /// of the same code cannot both observe spare capacity and commit; the
  /// promo_use primary key, not the counter, is what blocks a repeat by the
  /// same user.
  pub async fn redeem(
    &self,
    giveaway_id: i64,
    user_id: i64,
    code: &str,
  ) -> Result<Redeem> {
    // expiry detection first, with its deactivate-on-read side effect
    let giveaway = sv::Giveaway::new(self.db).fresh(giveaway_id).await?;
    if !giveaway.is_some_and(|g| g.is_active) {
      return Ok(Redeem::Closed);
    }

    let txn = self.db.begin().await?;

    let Some(participant) =
      participant::Entity::find_by_id((giveaway_id, user_id)).one(&txn).await?
    else {
      txn.rollback().await?;
      return Ok(Redeem::NotParticipant);
    };

    let found = promo_code::Entity::find_by_id((giveaway_id, code.to_string()))
      .one(&txn)
      .await?;
    let Some(promo) = found.filter(|promo| promo.redeemable()) else {
      txn.rollback().await?;
      return Ok(Redeem::Invalid);
    };

    let now = Utc::now().naive_utc();
    let use_row = promo_use::ActiveModel {
      giveaway_id: Set(giveaway_id),
      user_id: Set(user_id),
      code: Set(code.to_string()),
      created_at: Set(now),
    };

    if let Err(err) = use_row.insert(&txn).await {
      return match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
          txn.rollback().await?;
          Ok(Redeem::AlreadyRedeemed)
        }
        _ => Err(err.into()),
      };
    }

    promo_code::ActiveModel { uses: Set(promo.uses + 1), ..promo.into() }
      .update(&txn)
      .await?;

    let tickets = participant.tickets + 1;
    participant::ActiveModel { tickets: Set(tickets), ..participant.into() }
      .update(&txn)
      .await?;

    txn.commit().await?;
    Ok(Redeem::Accepted { tickets })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{
    NewParticipant, Participant,
    tests::{file_db, mem_db, seed_giveaway, seed_giveaway_until},
  };

  async fn join(db: &DatabaseConnection, gid: i64, user_id: i64) {
    Participant::new(db)
      .join(
        gid,
        NewParticipant {
          user_id,
          username: format!("user{user_id}"),
          first_name: "Test".into(),
        },
      )
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn duplicate_code_reports_conflict() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    let sv = Promo::new(&db);

    assert!(matches!(
      sv.create(gid, "BUY100", 10).await.unwrap(),
      Create::Created(_)
    ));
    assert_eq!(sv.create(gid, "BUY100", 3).await.unwrap(), Create::Duplicate);

    // same code on another giveaway is fine
    let other = seed_giveaway(&db).await;
    assert!(matches!(
      sv.create(other, "BUY100", 1).await.unwrap(),
      Create::Created(_)
    ));
  }

  #[tokio::test]
  async fn redeem_requires_participation() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    let sv = Promo::new(&db);
    sv.create(gid, "BUY100", 10).await.unwrap();

    assert_eq!(
      sv.redeem(gid, 1, "BUY100").await.unwrap(),
      Redeem::NotParticipant
    );
  }

  #[tokio::test]
  async fn redeem_same_code_twice() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    let sv = Promo::new(&db);
    sv.create(gid, "BUY100", 10).await.unwrap();
    join(&db, gid, 1).await;

    assert_eq!(
      sv.redeem(gid, 1, "BUY100").await.unwrap(),
      Redeem::Accepted { tickets: 2 }
    );
    assert_eq!(
      sv.redeem(gid, 1, "BUY100").await.unwrap(),
      Redeem::AlreadyRedeemed
    );

    // second attempt changed nothing
    let tickets = Participant::new(&db)
      .by_user(gid, 1)
      .await
      .unwrap()
      .unwrap()
      .tickets;
    assert_eq!(tickets, 2);

    let uses = sv.list(gid).await.unwrap()[0].uses;
    assert_eq!(uses, 1);
  }

  #[tokio::test]
  async fn capacity_is_exhausted_at_max_uses() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    let sv = Promo::new(&db);
    sv.create(gid, "LIMITED", 2).await.unwrap();

    for user_id in 1..=3 {
      join(&db, gid, user_id).await;
    }

    assert!(matches!(
      sv.redeem(gid, 1, "LIMITED").await.unwrap(),
      Redeem::Accepted { .. }
    ));
    assert!(matches!(
      sv.redeem(gid, 2, "LIMITED").await.unwrap(),
      Redeem::Accepted { .. }
    ));
    assert_eq!(sv.redeem(gid, 3, "LIMITED").await.unwrap(), Redeem::Invalid);

    let uses = sv.list(gid).await.unwrap()[0].uses;
    assert_eq!(uses, 2);
  }

  #[tokio::test]
  async fn unknown_code_is_invalid() {
    let db = mem_db().await;
    let gid = seed_giveaway(&db).await;
    join(&db, gid, 1).await;

    assert_eq!(
      Promo::new(&db).redeem(gid, 1, "NOPE").await.unwrap(),
      Redeem::Invalid
    );
  }

  #[tokio::test]
  async fn expired_giveaway_closes_redemption() {
    let db = mem_db().await;
    let past = Utc::now().naive_utc() - chrono::TimeDelta::hours(1);
    let gid = seed_giveaway_until(&db, Some(past)).await;

    let sv = Promo::new(&db);
    sv.create(gid, "BUY100", 10).await.unwrap();
    join(&db, gid, 1).await;

    assert_eq!(sv.redeem(gid, 1, "BUY100").await.unwrap(), Redeem::Closed);
    assert_eq!(
      sv.redeem(9999, 1, "BUY100").await.unwrap(),
      Redeem::Closed,
      "missing giveaway is closed, not an error"
    );
  }

  /// Admin creates the giveaway and a 10-use code, user joins, redeems once,
  /// and a retry is refused without touching the counters.
  #[tokio::test]
  async fn spring_draw_scenario() {
    let db = mem_db().await;
    let future = Utc::now().naive_utc() + chrono::TimeDelta::days(7);

    let giveaway = crate::sv::Giveaway::new(&db)
      .create("Spring Draw", "", Some(future), 1, None)
      .await
      .unwrap();

    let sv = Promo::new(&db);
    sv.create(giveaway.id, "BUY100", 10).await.unwrap();

    join(&db, giveaway.id, 1).await;

    assert_eq!(
      sv.redeem(giveaway.id, 1, "BUY100").await.unwrap(),
      Redeem::Accepted { tickets: 2 }
    );
    assert_eq!(
      sv.redeem(giveaway.id, 1, "BUY100").await.unwrap(),
      Redeem::AlreadyRedeemed
    );

    let tickets = Participant::new(&db)
      .by_user(giveaway.id, 1)
      .await
      .unwrap()
      .unwrap()
      .tickets;
    assert_eq!(tickets, 2);
    assert_eq!(sv.list(giveaway.id).await.unwrap()[0].uses, 1);
  }

  /// Capacity must hold when redemptions race: every accepted redemption
  /// increments `uses` exactly once and `uses` never passes `max_uses`.
  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_redemptions_respect_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(dir.path().join("race.db")).await;

    let gid = seed_giveaway(&db).await;
    for user_id in 1..=8 {
      join(&db, gid, user_id).await;
    }
    Promo::new(&db).create(gid, "RACE", 3).await.unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for user_id in 1..=8 {
      let db = db.clone();
      tasks
        .spawn(async move { Promo::new(&db).redeem(gid, user_id, "RACE").await });
    }

    let mut accepted = 0;
    while let Some(outcome) = tasks.join_next().await {
      match outcome.unwrap().unwrap() {
        Redeem::Accepted { .. } => accepted += 1,
        Redeem::Invalid => {}
        other => panic!("unexpected outcome: {other:?}"),
      }
    }

    let promo = &Promo::new(&db).list(gid).await.unwrap()[0];
    assert_eq!(accepted, 3);
    assert_eq!(promo.uses, accepted);
    assert!(promo.uses <= promo.max_uses);
  }
}

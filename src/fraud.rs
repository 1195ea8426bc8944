//! Anti-fraud heuristics and a sliding-window rate limiter.

use chrono::TimeDelta;
use teloxide::types::User;

use crate::prelude::*;

/// Review signal for moderation, not an automatic block: bot accounts, or
/// accounts with neither a handle nor a display name.
pub fn looks_like_fake(user: &User) -> bool {
  user.is_bot || (user.username.is_none() && user.first_name.is_empty())
}

/// Sliding-window admission gate. Events older than the window are dropped
/// on every check, so each key holds at most `limit` timestamps.
#[derive(Debug, Default)]
pub struct RateLimiter {
  events: DashMap<String, Vec<DateTime>>,
}

impl RateLimiter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Admit one event for `key` if fewer than `limit` happened within the
  /// trailing `per_seconds` window. Denied events are not recorded.
  pub fn allow(&self, key: &str, limit: usize, per_seconds: i64) -> bool {
    self.allow_at(key, limit, per_seconds, Utc::now().naive_utc())
  }

  fn allow_at(
    &self,
    key: &str,
    limit: usize,
    per_seconds: i64,
    now: DateTime,
  ) -> bool {
    let mut events = self.events.entry(key.to_string()).or_default();
    let window = TimeDelta::seconds(per_seconds);

    events.retain(|&at| now - at < window);

    if events.len() >= limit {
      return false;
    }

    events.push(now);
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(secs: i64) -> DateTime {
    chrono::DateTime::from_timestamp(1_700_000_000 + secs, 0)
      .unwrap()
      .naive_utc()
  }

  #[test]
  fn admits_up_to_limit_within_window() {
    let limiter = RateLimiter::new();

    assert!(limiter.allow_at("u1:join", 3, 60, at(0)));
    assert!(limiter.allow_at("u1:join", 3, 60, at(10)));
    assert!(limiter.allow_at("u1:join", 3, 60, at(20)));
    assert!(!limiter.allow_at("u1:join", 3, 60, at(30)));
  }

  #[test]
  fn admits_again_after_window_elapses() {
    let limiter = RateLimiter::new();

    for i in 0..3 {
      assert!(limiter.allow_at("k", 3, 60, at(i)));
    }
    assert!(!limiter.allow_at("k", 3, 60, at(59)));
    assert!(limiter.allow_at("k", 3, 60, at(61)));
  }

  #[test]
  fn keys_are_independent() {
    let limiter = RateLimiter::new();

    assert!(limiter.allow_at("a", 1, 60, at(0)));
    assert!(!limiter.allow_at("a", 1, 60, at(1)));
    assert!(limiter.allow_at("b", 1, 60, at(1)));
  }

  #[test]
  fn denied_events_are_not_recorded() {
    let limiter = RateLimiter::new();

    assert!(limiter.allow_at("k", 1, 60, at(0)));
    // denials inside the window must not extend it
    assert!(!limiter.allow_at("k", 1, 60, at(30)));
    assert!(!limiter.allow_at("k", 1, 60, at(59)));
    assert!(limiter.allow_at("k", 1, 60, at(61)));
  }

  #[test]
  fn fake_account_heuristic() {
    use teloxide::types::UserId;

    let user = |is_bot, username: Option<&str>, first_name: &str| User {
      id: UserId(1),
      is_bot,
      first_name: first_name.to_string(),
      last_name: None,
      username: username.map(str::to_string),
      language_code: None,
      is_premium: false,
      added_to_attachment_menu: false,
    };

    assert!(looks_like_fake(&user(true, Some("bot"), "Bot")));
    assert!(looks_like_fake(&user(false, None, "")));
    assert!(!looks_like_fake(&user(false, None, "Alice")));
    assert!(!looks_like_fake(&user(false, Some("alice"), "")));
  }
}

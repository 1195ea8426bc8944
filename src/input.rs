//! Input grammars for the conversation flows.
//!
//! Everything here is pure parsing: promo code specs, channel references,
//! deadlines, winner counts and referral payloads. Validation failures are
//! reported to the caller, which re-prompts without advancing the flow.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

/// Literal token that skips an optional step.
pub const SKIP: &str = "-";

/// Fixed deadline format, local time.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M";

static CODE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

static HANDLE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{5,32}$").unwrap());

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?:https?://)?(?:t\.me|telegram\.me)/([A-Za-z0-9_]{5,32})")
    .unwrap()
});

pub fn valid_code(code: &str) -> bool {
  CODE_RE.is_match(code)
}

/// Admin promo input: `CODE` or `CODE:MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoSpec {
  pub code: String,
  pub max_uses: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoSpecError {
  /// `MAX` segment present but not a positive integer.
  BadMax,
  /// Code does not match `[A-Za-z0-9_-]{1,64}`.
  BadCode,
}

pub fn parse_promo_spec(input: &str) -> Result<PromoSpec, PromoSpecError> {
  let input = input.trim();

  let (code, max_uses) = match input.split_once(':') {
    Some((code, max)) => {
      let max: i32 =
        max.trim().parse().ok().filter(|&n| n > 0).ok_or(PromoSpecError::BadMax)?;
      (code.trim(), max)
    }
    None => (input, 1),
  };

  if !valid_code(code) {
    return Err(PromoSpecError::BadCode);
  }

  Ok(PromoSpec { code: code.to_string(), max_uses })
}

/// User redemption input: take the leading token, tolerate a stray `code`
/// prefix word and a mistakenly supplied `:max` tail.
pub fn extract_code(input: &str) -> Option<String> {
  let parts: Vec<&str> = input.split_whitespace().collect();

  let token = match parts.as_slice() {
    [] => return None,
    [first, .., last] if first.eq_ignore_ascii_case("code") => last,
    [first, ..] => first,
  };

  let code = token.split(':').next().unwrap_or("").trim();
  valid_code(code).then(|| code.to_string())
}

/// Channel step input, normalized to `@handle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelInput {
  /// `-`: no membership gating.
  Skip,
  Handle(String),
}

/// Accepts the skip token, `@handle`, or a `t.me/handle` link.
/// Returns `None` for anything else.
pub fn normalize_channel(input: &str) -> Option<ChannelInput> {
  let input = input.trim();

  if input == SKIP {
    return Some(ChannelInput::Skip);
  }

  if let Some(captures) = LINK_RE.captures(input) {
    return Some(ChannelInput::Handle(format!("@{}", &captures[1])));
  }

  if let Some(handle) = input.strip_prefix('@') {
    if HANDLE_RE.is_match(handle) {
      return Some(ChannelInput::Handle(format!("@{handle}")));
    }
  }

  None
}

pub fn parse_deadline(input: &str) -> Option<NaiveDateTime> {
  NaiveDateTime::parse_from_str(input.trim(), DEADLINE_FORMAT).ok()
}

pub fn parse_winners(input: &str) -> Option<i32> {
  input.trim().parse().ok().filter(|&n| n > 0)
}

/// Referral deep-link payload: `ref_<giveaway_id>_<inviter_id>`.
pub fn parse_ref_payload(payload: &str) -> Option<(i64, i64)> {
  let fields: Vec<&str> = payload.strip_prefix("ref_")?.split('_').collect();

  match fields.as_slice() {
    [gid, inviter] => Some((gid.parse().ok()?, inviter.parse().ok()?)),
    _ => None,
  }
}

pub fn ref_link(bot_handle: &str, giveaway_id: i64, inviter_id: i64) -> String {
  format!("https://t.me/{bot_handle}?start=ref_{giveaway_id}_{inviter_id}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn code_pattern() {
    assert!(valid_code("BUY100"));
    assert!(valid_code("3432"));
    assert!(valid_code("a_b-c"));
    assert!(!valid_code(""));
    assert!(!valid_code("with space"));
    assert!(!valid_code(&"x".repeat(65)));
  }

  #[test]
  fn promo_spec_defaults_to_single_use() {
    let spec = parse_promo_spec("BUY100").unwrap();
    assert_eq!(spec, PromoSpec { code: "BUY100".into(), max_uses: 1 });
  }

  #[test]
  fn promo_spec_with_max() {
    let spec = parse_promo_spec("BUY100:10").unwrap();
    assert_eq!(spec.max_uses, 10);

    assert_eq!(parse_promo_spec("BUY100:0"), Err(PromoSpecError::BadMax));
    assert_eq!(parse_promo_spec("BUY100:ten"), Err(PromoSpecError::BadMax));
    assert_eq!(parse_promo_spec("bad code:5"), Err(PromoSpecError::BadCode));
  }

  #[test]
  fn redeem_input_tolerates_noise() {
    assert_eq!(extract_code("BUY100"), Some("BUY100".into()));
    assert_eq!(extract_code("  BUY100  "), Some("BUY100".into()));
    assert_eq!(extract_code("BUY100:10"), Some("BUY100".into()));
    assert_eq!(extract_code("code BUY100"), Some("BUY100".into()));
    assert_eq!(extract_code(""), None);
    assert_eq!(extract_code("!!!"), None);
  }

  #[test]
  fn channel_forms() {
    assert_eq!(normalize_channel("-"), Some(ChannelInput::Skip));
    assert_eq!(
      normalize_channel("@my_channel"),
      Some(ChannelInput::Handle("@my_channel".into()))
    );
    assert_eq!(
      normalize_channel("https://t.me/my_channel"),
      Some(ChannelInput::Handle("@my_channel".into()))
    );
    assert_eq!(
      normalize_channel("telegram.me/my_channel"),
      Some(ChannelInput::Handle("@my_channel".into()))
    );
    // too short for a telegram handle
    assert_eq!(normalize_channel("@abc"), None);
    assert_eq!(normalize_channel("just text"), None);
  }

  /// A caption-less photo or sticker reaches the flow as empty text; every
  /// step grammar must reject it so the step re-prompts.
  #[test]
  fn empty_input_never_parses() {
    assert_eq!(parse_deadline(""), None);
    assert_eq!(parse_winners(""), None);
    assert_eq!(normalize_channel(""), None);
    assert_eq!(extract_code(""), None);
    assert_eq!(parse_promo_spec(""), Err(PromoSpecError::BadCode));
  }

  #[test]
  fn deadline_format_is_strict() {
    assert!(parse_deadline("2026-02-07 18:30").is_some());
    assert!(parse_deadline("07.02.2026 18:30").is_none());
    assert!(parse_deadline("2026-02-07").is_none());
  }

  #[test]
  fn winners_must_be_positive() {
    assert_eq!(parse_winners("3"), Some(3));
    assert_eq!(parse_winners("0"), None);
    assert_eq!(parse_winners("-1"), None);
    assert_eq!(parse_winners("three"), None);
  }

  #[test]
  fn ref_payload_round_trip() {
    let link = ref_link("giveaway_bot", 7, 42);
    assert_eq!(link, "https://t.me/giveaway_bot?start=ref_7_42");

    let payload = link.split_once("start=").unwrap().1;
    assert_eq!(parse_ref_payload(payload), Some((7, 42)));
  }

  #[test]
  fn ref_payload_rejects_malformed() {
    assert_eq!(parse_ref_payload("ref_7"), None);
    assert_eq!(parse_ref_payload("ref_7_42_9"), None);
    assert_eq!(parse_ref_payload("ref_x_42"), None);
    assert_eq!(parse_ref_payload("promo_7_42"), None);
  }
}

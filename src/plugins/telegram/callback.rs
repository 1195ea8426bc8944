use std::sync::Arc;

use teloxide::{
  prelude::*,
  types::{InlineKeyboardButton, InlineKeyboardMarkup},
};
use url::Url;

use super::ReplyBot;
use crate::{
  entity::giveaway,
  flow::Flow,
  fraud,
  gateway::{ChatGateway, Membership},
  input,
  prelude::*,
  state::{AppState, Services},
  sv,
};

/// Callback data enum - provides type-safe callback handling
#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
  Join(i64),
  JoinConfirm(i64),
  RefLink(i64),
  EnterCode(i64),
  AdmCreateCode(i64),
  AdmListCodes(i64),
  Delete(i64),
  DeleteOk(i64),
  DeleteCancel,
}

impl Callback {
  /// Serialize callback to string for Telegram API
  pub fn to_data(&self) -> String {
    match self {
      Callback::Join(id) => format!("join:{id}"),
      Callback::JoinConfirm(id) => format!("join_ok:{id}"),
      Callback::RefLink(id) => format!("ref:{id}"),
      Callback::EnterCode(id) => format!("code:{id}"),
      Callback::AdmCreateCode(id) => format!("adm_code:{id}"),
      Callback::AdmListCodes(id) => format!("adm_codes:{id}"),
      Callback::Delete(id) => format!("del:{id}"),
      Callback::DeleteOk(id) => format!("del_ok:{id}"),
      Callback::DeleteCancel => "del_cancel".to_string(),
    }
  }

  /// Parse callback from string received from Telegram API. Anything with
  /// a malformed id tail is dropped, not guessed at.
  pub fn from_data(data: &str) -> Option<Self> {
    if data == "del_cancel" {
      return Some(Callback::DeleteCancel);
    }

    let (head, id) = data.split_once(':')?;
    let id: i64 = id.parse().ok()?;

    match head {
      "join" => Some(Callback::Join(id)),
      "join_ok" => Some(Callback::JoinConfirm(id)),
      "ref" => Some(Callback::RefLink(id)),
      "code" => Some(Callback::EnterCode(id)),
      "adm_code" => Some(Callback::AdmCreateCode(id)),
      "adm_codes" => Some(Callback::AdmListCodes(id)),
      "del" => Some(Callback::Delete(id)),
      "del_ok" => Some(Callback::DeleteOk(id)),
      _ => None,
    }
  }
}

pub fn giveaway_card(id: i64, joined: bool) -> InlineKeyboardMarkup {
  let join_label = if joined { "✅ You're in" } else { "🎉 Join" };

  InlineKeyboardMarkup::new(vec![
    vec![InlineKeyboardButton::callback(
      join_label,
      Callback::Join(id).to_data(),
    )],
    vec![InlineKeyboardButton::callback(
      "🔗 My referral link",
      Callback::RefLink(id).to_data(),
    )],
    vec![InlineKeyboardButton::callback(
      "🎟 Enter promo code",
      Callback::EnterCode(id).to_data(),
    )],
  ])
}

pub fn admin_card(id: i64) -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![
    vec![InlineKeyboardButton::callback(
      "➕ Promo code",
      Callback::AdmCreateCode(id).to_data(),
    )],
    vec![InlineKeyboardButton::callback(
      "📄 Promo codes",
      Callback::AdmListCodes(id).to_data(),
    )],
    vec![InlineKeyboardButton::callback(
      "🗑 Delete",
      Callback::Delete(id).to_data(),
    )],
  ])
}

fn confirm_delete(id: i64) -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![vec![
    InlineKeyboardButton::callback("Yes, delete", Callback::DeleteOk(id).to_data()),
    InlineKeyboardButton::callback("Cancel", Callback::DeleteCancel.to_data()),
  ]])
}

fn join_gate(channel: &str, id: i64) -> InlineKeyboardMarkup {
  let link = format!("https://t.me/{}", channel.trim_start_matches('@'));

  InlineKeyboardMarkup::new(vec![
    vec![InlineKeyboardButton::url(
      "📣 Open channel",
      Url::parse(&link).expect("invalid link, what???"),
    )],
    vec![InlineKeyboardButton::callback(
      "✅ I'm subscribed",
      Callback::JoinConfirm(id).to_data(),
    )],
  ])
}

pub async fn handle(
  app: Arc<AppState>,
  bot: ReplyBot,
  data: &str,
) -> ResponseResult<()> {
  let Some(callback) = Callback::from_data(data) else {
    return Ok(());
  };

  match callback {
    Callback::Join(id) => {
      handle_join(&app, &bot, id, false).await?;
    }
    Callback::JoinConfirm(id) => {
      handle_join(&app, &bot, id, true).await?;
    }
    Callback::RefLink(id) => {
      handle_ref_link(&app, &bot, id).await?;
    }
    Callback::EnterCode(id) => {
      app.enter_flow(bot.user_id, Flow::RedeemPromo { giveaway_id: id });
      bot
        .reply_html(
          "🎟 Enter the promo code in one message, e.g. <code>3432</code> \
           or <code>BUY100</code>:",
        )
        .await?;
    }
    Callback::AdmCreateCode(id) => {
      if !app.admin_acting(bot.user_id) {
        bot.reply_html("⛔ Access denied.").await?;
        return Ok(());
      }
      app.enter_flow(bot.user_id, Flow::CreatePromo { giveaway_id: id });
      bot
        .reply_html(
          "➕ Enter the promo code as <code>CODE</code> or \
           <code>CODE:MAX</code>, e.g. <code>BUY100:10</code>:",
        )
        .await?;
    }
    Callback::AdmListCodes(id) => {
      if !app.admin_acting(bot.user_id) {
        bot.reply_html("⛔ Access denied.").await?;
        return Ok(());
      }
      handle_list_codes(&app.sv(), &bot, id).await?;
    }
    Callback::Delete(id) => {
      if !app.admin_acting(bot.user_id) {
        bot.reply_html("⛔ Access denied.").await?;
        return Ok(());
      }
      bot
        .reply_with_keyboard(
          "⚠️ Delete this giveaway? Participants will no longer see it.",
          confirm_delete(id),
        )
        .await?;
    }
    Callback::DeleteOk(id) => {
      if !app.admin_acting(bot.user_id) {
        bot.reply_html("⛔ Access denied.").await?;
        return Ok(());
      }
      match app.sv().giveaway.deactivate(id).await {
        Ok(()) => {
          bot.reply_html("🗑 Giveaway removed.").await?;
        }
        Err(Error::GiveawayNotFound) => {
          bot.reply_html("⚠️ That giveaway no longer exists.").await?;
        }
        Err(err) => {
          error!("giveaway delete failed: {err}");
          bot.reply_html("Something went wrong. Try again.").await?;
        }
      }
    }
    Callback::DeleteCancel => {
      bot.reply_html("Cancelled.").await?;
    }
  }

  Ok(())
}

async fn handle_join(
  app: &Arc<AppState>,
  bot: &ReplyBot,
  giveaway_id: i64,
  confirmed: bool,
) -> ResponseResult<()> {
  let sv = app.sv();

  let giveaway = match sv.giveaway.fresh(giveaway_id).await {
    Ok(found) => found,
    Err(err) => {
      error!("giveaway lookup failed: {err}");
      bot.reply_html("Something went wrong. Try again.").await?;
      return Ok(());
    }
  };

  let Some(giveaway) = giveaway.filter(|g| g.is_active) else {
    bot.reply_html("⛔ This giveaway is over.").await?;
    return Ok(());
  };

  if let Some(channel) = &giveaway.channel {
    if !confirmed {
      bot
        .reply_with_keyboard(
          format!(
            "📣 To participate, subscribe to {channel} first, then tap \
             the button below."
          ),
          join_gate(channel, giveaway_id),
        )
        .await?;
      return Ok(());
    }

    // a check the API refuses to answer never blocks the join
    if app.gateway.membership(channel, bot.user_id).await
      == Membership::NotSubscribed
    {
      bot
        .reply_with_keyboard(
          format!("❌ You are not subscribed to {channel} yet."),
          join_gate(channel, giveaway_id),
        )
        .await?;
      return Ok(());
    }
  }

  enroll(app, bot, &sv, giveaway_id).await
}

async fn enroll(
  app: &Arc<AppState>,
  bot: &ReplyBot,
  sv: &Services<'_>,
  giveaway_id: i64,
) -> ResponseResult<()> {
  if fraud::looks_like_fake(&bot.user) {
    warn!("user {} joins giveaway {giveaway_id} looking fake", bot.user_id);
  }

  let user = sv::NewParticipant {
    user_id: bot.user_id,
    username: bot.user.username.clone().unwrap_or_default(),
    first_name: bot.user.first_name.clone(),
  };

  match sv.participant.join(giveaway_id, user).await {
    Ok(sv::Join::Joined { milestone }) => {
      bot
        .reply_html(
          "✅ You're in! Share your referral link: every 5 invited \
           friends earn you an extra ticket.",
        )
        .await?;

      if let Some(milestone) = milestone {
        notify_milestone(app.clone(), milestone);
      }
    }
    Ok(sv::Join::AlreadyJoined) => {
      bot.reply_html("✅ You are already participating.").await?;
    }
    Err(err) => {
      error!("join failed: {err}");
      bot.reply_html("Something went wrong. Try again.").await?;
    }
  }

  Ok(())
}

/// Best effort, after the credit already committed: a blocked bot or a
/// deleted chat must not affect the join that triggered it.
fn notify_milestone(app: Arc<AppState>, milestone: sv::Milestone) {
  tokio::spawn(async move {
    let text = format!(
      "🎉 +1 ticket! {} friends joined via your referral link.",
      milestone.invited_count
    );

    if let Err(err) = app.gateway.send_text(milestone.inviter_id, &text).await
    {
      debug!("milestone notify failed for {}: {err}", milestone.inviter_id);
    }
  });
}

async fn handle_ref_link(
  app: &Arc<AppState>,
  bot: &ReplyBot,
  giveaway_id: i64,
) -> ResponseResult<()> {
  let sv = app.sv();

  let active = match sv.giveaway.fresh(giveaway_id).await {
    Ok(found) => found.is_some_and(|g| g.is_active),
    Err(err) => {
      error!("giveaway lookup failed: {err}");
      bot.reply_html("Something went wrong. Try again.").await?;
      return Ok(());
    }
  };

  if !active {
    bot.reply_html("⛔ This giveaway is over.").await?;
    return Ok(());
  }

  let handle = match app.gateway.bot_handle().await {
    Ok(handle) => handle,
    Err(err) => {
      error!("bot handle lookup failed: {err}");
      bot.reply_html("Something went wrong. Try again.").await?;
      return Ok(());
    }
  };

  let link = input::ref_link(&handle, giveaway_id, bot.user_id);
  bot
    .reply_html(format!(
      "🔗 Your referral link:\n{link}\n\n\
       Every 5 friends who join through it earn you an extra ticket."
    ))
    .await?;

  Ok(())
}

async fn handle_list_codes(
  sv: &Services<'_>,
  bot: &ReplyBot,
  giveaway_id: i64,
) -> ResponseResult<()> {
  let codes = match sv.promo.list(giveaway_id).await {
    Ok(codes) => codes,
    Err(err) => {
      error!("promo list failed: {err}");
      bot.reply_html("Something went wrong. Try again.").await?;
      return Ok(());
    }
  };

  if codes.is_empty() {
    bot.reply_html("📄 No promo codes yet.").await?;
    return Ok(());
  }

  let mut text = String::from("📄 <b>Promo codes:</b>\n");
  for promo in codes.iter().take(50) {
    let status = if promo.redeemable() { "✅" } else { "❌" };
    text.push_str(&format!(
      "\n{status} <code>{}</code> - {}/{}",
      promo.code, promo.uses, promo.max_uses
    ));
  }

  bot.reply_html(text).await?;
  Ok(())
}

pub fn card_text(giveaway: &giveaway::Model, joined: bool) -> String {
  let mut text = format!("🎁 <b>{}</b>", giveaway.title);

  if !giveaway.description.is_empty() {
    text.push_str(&format!("\n\n{}", giveaway.description));
  }

  text.push_str(&format!("\n\n🏆 Winners: {}", giveaway.winners_count));

  if let Some(ends_at) = giveaway.ends_at {
    text.push_str(&format!(
      "\n⏰ Ends: {}",
      ends_at.format(input::DEADLINE_FORMAT)
    ));
  }

  if let Some(channel) = &giveaway.channel {
    text.push_str(&format!("\n📣 Channel: {channel}"));
  }

  if joined {
    text.push_str("\n\n✅ You are participating.");
  }

  text
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn callback_round_trip() {
    let all = [
      Callback::Join(7),
      Callback::JoinConfirm(7),
      Callback::RefLink(7),
      Callback::EnterCode(7),
      Callback::AdmCreateCode(7),
      Callback::AdmListCodes(7),
      Callback::Delete(7),
      Callback::DeleteOk(7),
      Callback::DeleteCancel,
    ];

    for callback in all {
      assert_eq!(Callback::from_data(&callback.to_data()), Some(callback));
    }
  }

  #[test]
  fn join_gate_links_to_channel() {
    let keyboard = join_gate("@springs", 7);
    let button = &keyboard.inline_keyboard[0][0];

    match &button.kind {
      teloxide::types::InlineKeyboardButtonKind::Url(url) => {
        assert_eq!(url.as_str(), "https://t.me/springs");
      }
      other => panic!("expected a url button, got {other:?}"),
    }
  }

  #[test]
  fn malformed_callbacks_are_dropped() {
    assert_eq!(Callback::from_data("join:abc"), None);
    assert_eq!(Callback::from_data("join:"), None);
    assert_eq!(Callback::from_data("join"), None);
    assert_eq!(Callback::from_data("nope:3"), None);
    assert_eq!(Callback::from_data(""), None);
  }
}

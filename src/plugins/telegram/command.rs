use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

use super::{ReplyBot, flow};
use crate::{
  input,
  prelude::*,
  state::{AppState, Mode},
  sv,
};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
  /// Also carries the referral deep-link payload, when present.
  Start(String),
  Help,
}

const HELP: &str = "\
<b>🎁 Giveaway bot</b>

Tap <b>🎁 Active giveaways</b> to see what is running, join with one \
button, and share your referral link: every 5 invited friends earn \
you an extra ticket.

Got a promo code? Open a giveaway card and tap <b>🎟 Enter promo code</b>.";

const ADMIN_HELP: &str = "\
<b>📋 Admin</b>

Switch to 🛠 Admin mode, then:
➕ New giveaway - title, description, deadline, winners, channel
➕ Promo code - <code>CODE</code> or <code>CODE:MAX</code> on a card
📄 Promo codes - usage per code
🗑 Delete - deactivate a giveaway

Everything else works like the user side.";

pub async fn handle(
  app: Arc<AppState>,
  bot: ReplyBot,
  cmd: Command,
) -> ResponseResult<()> {
  match cmd {
    Command::Start(payload) => start(app, bot, payload.trim()).await,
    Command::Help if app.is_admin(bot.user_id) => {
      bot.reply_html(ADMIN_HELP).await?;
      Ok(())
    }
    Command::Help => {
      bot.reply_html(HELP).await?;
      Ok(())
    }
  }
}

/// `/start` resets the conversation: any half-finished flow is dropped and
/// the user lands in user mode.
async fn start(
  app: Arc<AppState>,
  bot: ReplyBot,
  payload: &str,
) -> ResponseResult<()> {
  app.clear_flow(bot.user_id);
  app.set_mode(bot.user_id, Mode::User);

  if !payload.is_empty() {
    return start_via_referral(app, bot, payload).await;
  }

  bot
    .reply_with_menu(
      "👋 Welcome! Choose how you want to use the bot:",
      flow::role_choice(&app, bot.user_id),
    )
    .await?;

  Ok(())
}

async fn start_via_referral(
  app: Arc<AppState>,
  bot: ReplyBot,
  payload: &str,
) -> ResponseResult<()> {
  let Some((giveaway_id, inviter_id)) = input::parse_ref_payload(payload)
  else {
    bot
      .reply_with_menu(
        "⚠️ That invite link is broken, but you can still participate:",
        flow::user_menu(),
      )
      .await?;
    return Ok(());
  };

  let text = match app
    .sv()
    .referral
    .register(giveaway_id, inviter_id, bot.user_id)
    .await
  {
    Ok(sv::Register::SelfReferral) => {
      "🔗 That is your own referral link; inviting yourself does not count."
    }
    // first inviter wins, a repeat visit changes nothing
    Ok(sv::Register::Registered) | Ok(sv::Register::Duplicate) => {
      "✅ You arrived via an invite! Open 🎁 Active giveaways and join."
    }
    Ok(sv::Register::UnknownGiveaway) => {
      "⚠️ That invite link points at a giveaway that no longer exists."
    }
    Err(err) => {
      error!("referral registration failed: {err}");
      "👋 Welcome! Open 🎁 Active giveaways to participate."
    }
  };

  bot.reply_with_menu(text, flow::user_menu()).await?;
  Ok(())
}

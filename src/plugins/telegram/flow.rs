//! Free-text handling: menu buttons and the per-user input flows.

use std::sync::Arc;

use teloxide::{
  prelude::*,
  types::{KeyboardButton, KeyboardMarkup},
};

use super::{ReplyBot, callback};
use crate::{
  flow::{CreateStep, Flow},
  gateway::ChatGateway,
  input::{self, ChannelInput, PromoSpecError},
  prelude::*,
  state::{AppState, Mode},
  sv,
};

const BTN_ADMIN: &str = "🛠 Admin";
const BTN_USER: &str = "👤 User";
const BTN_ACTIVE: &str = "🎁 Active giveaways";
const BTN_CREATE: &str = "➕ New giveaway";

pub fn role_choice(app: &AppState, user_id: i64) -> KeyboardMarkup {
  let mut rows = vec![vec![KeyboardButton::new(BTN_USER)]];
  if app.is_admin(user_id) {
    rows.push(vec![KeyboardButton::new(BTN_ADMIN)]);
  }

  KeyboardMarkup::new(rows).resize_keyboard()
}

pub fn user_menu() -> KeyboardMarkup {
  KeyboardMarkup::new(vec![
    vec![KeyboardButton::new(BTN_ACTIVE)],
    vec![KeyboardButton::new(BTN_ADMIN)],
  ])
  .resize_keyboard()
}

fn admin_menu() -> KeyboardMarkup {
  KeyboardMarkup::new(vec![
    vec![KeyboardButton::new(BTN_ACTIVE), KeyboardButton::new(BTN_CREATE)],
    vec![KeyboardButton::new(BTN_USER)],
  ])
  .resize_keyboard()
}

pub async fn handle_text(
  app: Arc<AppState>,
  bot: ReplyBot,
  text: &str,
) -> ResponseResult<()> {
  match text.trim() {
    BTN_ADMIN => switch_admin(&app, &bot).await,
    BTN_USER => switch_user(&app, &bot).await,
    BTN_ACTIVE => show_active(&app, &bot).await,
    BTN_CREATE => start_create(&app, &bot).await,
    trimmed => advance(&app, &bot, trimmed).await,
  }
}

async fn switch_admin(
  app: &Arc<AppState>,
  bot: &ReplyBot,
) -> ResponseResult<()> {
  if !app.is_admin(bot.user_id) {
    bot
      .reply_with_menu("⛔ You are not an administrator.", user_menu())
      .await?;
    return Ok(());
  }

  app.set_mode(bot.user_id, Mode::Admin);
  app.clear_flow(bot.user_id);
  bot.reply_with_menu("🛠 Admin menu:", admin_menu()).await?;
  Ok(())
}

async fn switch_user(
  app: &Arc<AppState>,
  bot: &ReplyBot,
) -> ResponseResult<()> {
  app.set_mode(bot.user_id, Mode::User);
  app.clear_flow(bot.user_id);
  bot.reply_with_menu("👤 User menu:", user_menu()).await?;
  Ok(())
}

async fn show_active(
  app: &Arc<AppState>,
  bot: &ReplyBot,
) -> ResponseResult<()> {
  let sv = app.sv();

  let giveaways = match sv.giveaway.active().await {
    Ok(giveaways) => giveaways,
    Err(err) => {
      error!("active list failed: {err}");
      bot.reply_html("Something went wrong. Try again.").await?;
      return Ok(());
    }
  };

  if giveaways.is_empty() {
    bot.reply_html("😔 No active giveaways right now.").await?;
    return Ok(());
  }

  let admin = app.admin_acting(bot.user_id);

  for giveaway in giveaways {
    let joined = sv
      .participant
      .by_user(giveaway.id, bot.user_id)
      .await
      .ok()
      .flatten()
      .is_some();

    let keyboard = if admin {
      callback::admin_card(giveaway.id)
    } else {
      callback::giveaway_card(giveaway.id, joined)
    };

    bot
      .reply_with_keyboard(callback::card_text(&giveaway, joined), keyboard)
      .await?;
  }

  Ok(())
}

async fn start_create(
  app: &Arc<AppState>,
  bot: &ReplyBot,
) -> ResponseResult<()> {
  if !app.admin_acting(bot.user_id) {
    bot.reply_html("⛔ Access denied.").await?;
    return Ok(());
  }

  app.enter_flow(bot.user_id, Flow::CreateGiveaway(CreateStep::Title));
  bot.reply_html("✏️ Enter the giveaway title:").await?;
  Ok(())
}

async fn advance(
  app: &Arc<AppState>,
  bot: &ReplyBot,
  text: &str,
) -> ResponseResult<()> {
  let Some(flow) = app.flows.get(&bot.user_id).map(|flow| flow.clone())
  else {
    // free text outside any flow is ignored
    return Ok(());
  };

  match flow {
    Flow::CreateGiveaway(step) => {
      if !admit_admin(app, bot).await? {
        return Ok(());
      }
      create_step(app, bot, step, text).await
    }
    Flow::CreatePromo { giveaway_id } => {
      if !admit_admin(app, bot).await? {
        return Ok(());
      }
      if submit_promo(app, bot, giveaway_id, text).await? {
        app.clear_flow(bot.user_id);
      }
      Ok(())
    }
    Flow::RedeemPromo { giveaway_id } => {
      redeem_step(app, bot, giveaway_id, text).await
    }
  }
}

/// Admin flows re-check authority on every message; losing it mid-flow
/// drops the draft.
async fn admit_admin(
  app: &Arc<AppState>,
  bot: &ReplyBot,
) -> ResponseResult<bool> {
  if app.admin_acting(bot.user_id) {
    return Ok(true);
  }

  app.clear_flow(bot.user_id);
  bot.reply_html("⛔ Access denied.").await?;
  Ok(false)
}

async fn create_step(
  app: &Arc<AppState>,
  bot: &ReplyBot,
  step: CreateStep,
  text: &str,
) -> ResponseResult<()> {
  match step {
    CreateStep::Title => {
      if text.is_empty() {
        bot.reply_html("❌ The title cannot be empty. Enter it again:").await?;
        return Ok(());
      }

      app.enter_flow(
        bot.user_id,
        Flow::CreateGiveaway(CreateStep::Description {
          title: text.to_string(),
        }),
      );
      bot
        .reply_html(format!(
          "📝 Enter the description, or <code>{}</code> for none:",
          input::SKIP
        ))
        .await?;
    }
    CreateStep::Description { title } => {
      let description =
        if text == input::SKIP { String::new() } else { text.to_string() };

      app.enter_flow(
        bot.user_id,
        Flow::CreateGiveaway(CreateStep::Deadline { title, description }),
      );
      bot
        .reply_html(
          "⏰ Enter the deadline as <code>2026-02-07 18:30</code>:",
        )
        .await?;
    }
    CreateStep::Deadline { title, description } => {
      let Some(ends_at) = input::parse_deadline(text) else {
        bot
          .reply_html(
            "❌ Wrong format. Example: <code>2026-02-07 18:30</code>",
          )
          .await?;
        return Ok(());
      };

      app.enter_flow(
        bot.user_id,
        Flow::CreateGiveaway(CreateStep::Winners {
          title,
          description,
          ends_at,
        }),
      );
      bot.reply_html("🏆 How many winners?").await?;
    }
    CreateStep::Winners { title, description, ends_at } => {
      let Some(winners_count) = input::parse_winners(text) else {
        bot.reply_html("❌ Enter a whole number greater than zero.").await?;
        return Ok(());
      };

      app.enter_flow(
        bot.user_id,
        Flow::CreateGiveaway(CreateStep::Channel {
          title,
          description,
          ends_at,
          winners_count,
        }),
      );
      bot
        .reply_html(format!(
          "📣 Which channel must participants join? Send \
           <code>@handle</code> or a <code>t.me/...</code> link, or \
           <code>{}</code> for no requirement:",
          input::SKIP
        ))
        .await?;
    }
    CreateStep::Channel { title, description, ends_at, winners_count } => {
      let channel = match input::normalize_channel(text) {
        Some(ChannelInput::Skip) => None,
        Some(ChannelInput::Handle(handle)) => {
          match resolve_channel(app, bot, &handle).await? {
            Some(handle) => Some(handle),
            // the step already re-prompted
            None => return Ok(()),
          }
        }
        None => {
          bot
            .reply_html(format!(
              "❌ Send <code>@handle</code>, a <code>t.me/...</code> \
               link, or <code>{}</code>:",
              input::SKIP
            ))
            .await?;
          return Ok(());
        }
      };

      let created = app
        .sv()
        .giveaway
        .create(&title, &description, Some(ends_at), winners_count, channel)
        .await;

      match created {
        Ok(giveaway) => {
          app.enter_flow(
            bot.user_id,
            Flow::CreateGiveaway(CreateStep::Promo {
              giveaway_id: giveaway.id,
            }),
          );
          bot
            .reply_html(format!(
              "✅ Giveaway <b>{}</b> created!\n\n\
               🎟 Add a promo code as <code>CODE</code> or \
               <code>CODE:MAX</code>, or <code>{}</code> to finish:",
              giveaway.title,
              input::SKIP
            ))
            .await?;
        }
        Err(err) => {
          error!("giveaway create failed: {err}");
          bot
            .reply_html("Something went wrong. Send the channel again:")
            .await?;
        }
      }
    }
    CreateStep::Promo { giveaway_id } => {
      if text == input::SKIP {
        app.clear_flow(bot.user_id);
        bot.reply_with_menu("✅ Done.", admin_menu()).await?;
        return Ok(());
      }

      if submit_promo(app, bot, giveaway_id, text).await? {
        app.clear_flow(bot.user_id);
        bot.reply_with_menu("✅ Done.", admin_menu()).await?;
      }
    }
  }

  Ok(())
}

/// Validate a channel handle against the live API. Replies and returns
/// `None` when the handle cannot gate a giveaway.
async fn resolve_channel(
  app: &Arc<AppState>,
  bot: &ReplyBot,
  handle: &str,
) -> ResponseResult<Option<String>> {
  let Some(kind) = app.gateway.resolve_chat(handle).await else {
    bot
      .reply_html(format!(
        "⚠️ Can't find {handle}. Make sure it is public and the bot can \
         see it, then send it again:"
      ))
      .await?;
    return Ok(None);
  };

  if !kind.gating() {
    bot
      .reply_html(format!(
        "❌ {handle} is a user or bot account, not a channel or group. \
         Send another one:"
      ))
      .await?;
    return Ok(None);
  }

  Ok(Some(handle.to_string()))
}

/// Returns `true` when the promo step is finished and the flow may close;
/// `false` keeps the flow waiting for a corrected code.
async fn submit_promo(
  app: &Arc<AppState>,
  bot: &ReplyBot,
  giveaway_id: i64,
  text: &str,
) -> ResponseResult<bool> {
  let spec = match input::parse_promo_spec(text) {
    Ok(spec) => spec,
    Err(PromoSpecError::BadMax) => {
      bot
        .reply_html(
          "❌ MAX must be a whole number greater than zero, e.g. \
           <code>BUY100:10</code>. Try again:",
        )
        .await?;
      return Ok(false);
    }
    Err(PromoSpecError::BadCode) => {
      bot
        .reply_html(
          "❌ Codes are 1-64 letters, digits, <code>_</code> or \
           <code>-</code>. Try again:",
        )
        .await?;
      return Ok(false);
    }
  };

  match app.sv().promo.create(giveaway_id, &spec.code, spec.max_uses).await {
    Ok(sv::Create::Created(promo)) => {
      bot
        .reply_html(format!(
          "✅ Promo code <code>{}</code> created, up to {} uses.",
          promo.code, promo.max_uses
        ))
        .await?;
      Ok(true)
    }
    Ok(sv::Create::Duplicate) => {
      bot
        .reply_html(
          "❌ That code already exists for this giveaway. Enter another:",
        )
        .await?;
      Ok(false)
    }
    Err(err) => {
      error!("promo create failed: {err}");
      bot.reply_html("Something went wrong. Try again:").await?;
      Ok(false)
    }
  }
}

async fn redeem_step(
  app: &Arc<AppState>,
  bot: &ReplyBot,
  giveaway_id: i64,
  text: &str,
) -> ResponseResult<()> {
  let key = format!("redeem:{}", bot.user_id);
  if !app.limiter.allow(
    &key,
    app.config.redeem_limit,
    app.config.redeem_window_secs,
  ) {
    bot
      .reply_html("⏳ Too many attempts. Wait a minute and try again.")
      .await?;
    return Ok(());
  }

  let Some(code) = input::extract_code(text) else {
    // bad format keeps the flow open for a corrected attempt
    bot
      .reply_html(
        "❌ That does not look like a promo code. Send just the code, \
         e.g. <code>BUY100</code>:",
      )
      .await?;
    return Ok(());
  };

  let outcome = match app.sv().promo.redeem(giveaway_id, bot.user_id, &code).await
  {
    Ok(outcome) => outcome,
    Err(err) => {
      error!("promo redeem failed: {err}");
      bot.reply_html("Something went wrong. Try again.").await?;
      return Ok(());
    }
  };

  match outcome {
    sv::Redeem::Accepted { tickets } => {
      app.clear_flow(bot.user_id);
      bot
        .reply_html(format!(
          "✅ Promo code accepted! +1 ticket, you now have {tickets}."
        ))
        .await?;
    }
    sv::Redeem::Closed => {
      app.clear_flow(bot.user_id);
      bot.reply_html("⛔ This giveaway is over.").await?;
    }
    sv::Redeem::NotParticipant => {
      // joining fixes this without re-entering the code flow
      bot
        .reply_html(
          "🎉 Join the giveaway first, then send the code again.",
        )
        .await?;
    }
    sv::Redeem::Invalid => {
      app.clear_flow(bot.user_id);
      bot.reply_html("❌ That promo code is not valid.").await?;
    }
    sv::Redeem::AlreadyRedeemed => {
      app.clear_flow(bot.user_id);
      bot.reply_html("⚠️ You already used this promo code.").await?;
    }
  }

  Ok(())
}

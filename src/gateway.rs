//! Chat transport capability consumed by the engine.
//!
//! The engine never talks to the Telegram API directly for its own
//! invariants; everything it needs from the transport is behind this trait
//! so tests can substitute a scripted gateway.

use async_trait::async_trait;
use teloxide::Bot;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberStatus, Recipient, UserId};
use tokio::sync::OnceCell;

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
  Subscribed,
  NotSubscribed,
  /// Access failure of any kind. "Cannot verify" is distinct from
  /// "not a member" and must never block the primary operation.
  Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedKind {
  Private,
  Group,
  Supergroup,
  Channel,
}

impl ResolvedKind {
  /// Only channels and groups can gate participation.
  pub fn gating(self) -> bool {
    !matches!(self, ResolvedKind::Private)
  }
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
  async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

  async fn membership(&self, channel: &str, user_id: i64) -> Membership;

  async fn resolve_chat(&self, reference: &str) -> Option<ResolvedKind>;

  async fn bot_handle(&self) -> Result<String>;
}

pub struct TelegramGateway {
  bot: Bot,
  handle: OnceCell<String>,
}

impl TelegramGateway {
  pub fn new(bot: Bot) -> Self {
    Self { bot, handle: OnceCell::new() }
  }
}

#[async_trait]
impl ChatGateway for TelegramGateway {
  async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
    self.bot.send_message(ChatId(chat_id), text).await?;
    Ok(())
  }

  async fn membership(&self, channel: &str, user_id: i64) -> Membership {
    let recipient = Recipient::ChannelUsername(channel.to_string());

    match self.bot.get_chat_member(recipient, UserId(user_id as u64)).await {
      Ok(member) => match member.status() {
        ChatMemberStatus::Owner
        | ChatMemberStatus::Administrator
        | ChatMemberStatus::Member
        | ChatMemberStatus::Restricted => Membership::Subscribed,
        ChatMemberStatus::Left | ChatMemberStatus::Banned => {
          Membership::NotSubscribed
        }
      },
      Err(err) => {
        debug!("membership check failed for {channel}: {err}");
        Membership::Unknown
      }
    }
  }

  async fn resolve_chat(&self, reference: &str) -> Option<ResolvedKind> {
    let recipient = Recipient::ChannelUsername(reference.to_string());
    let chat = self.bot.get_chat(recipient).await.ok()?;

    let kind = if chat.is_private() {
      ResolvedKind::Private
    } else if chat.is_channel() {
      ResolvedKind::Channel
    } else if chat.is_supergroup() {
      ResolvedKind::Supergroup
    } else {
      ResolvedKind::Group
    };

    Some(kind)
  }

  async fn bot_handle(&self) -> Result<String> {
    let handle = self
      .handle
      .get_or_try_init(|| async {
        let me = self.bot.get_me().await?;
        Ok::<_, teloxide::RequestError>(me.username().to_string())
      })
      .await?;

    Ok(handle.clone())
  }
}

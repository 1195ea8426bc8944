//! Conversation flow state, keyed per user.
//!
//! Each state carries exactly the draft fields collected so far, so a flow
//! can never observe a half-filled form. Starting a new flow overwrites the
//! previous one for that user; there is no timeout for abandoned flows.

use crate::prelude::*;

pub type Flows = DashMap<i64, Flow>;

#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
  /// Admin multi-step giveaway creation.
  CreateGiveaway(CreateStep),
  /// Admin promo creation from a giveaway card.
  CreatePromo { giveaway_id: i64 },
  /// User entering a promo code for a specific giveaway.
  RedeemPromo { giveaway_id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateStep {
  Title,
  Description {
    title: String,
  },
  Deadline {
    title: String,
    description: String,
  },
  Winners {
    title: String,
    description: String,
    ends_at: DateTime,
  },
  Channel {
    title: String,
    description: String,
    ends_at: DateTime,
    winners_count: i32,
  },
  /// Optional trailing promo-code step after the giveaway row exists.
  Promo {
    giveaway_id: i64,
  },
}

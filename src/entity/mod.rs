//! SeaORM entity definitions for the giveaway engine.

pub mod giveaway;
pub mod participant;
pub mod promo_code;
pub mod promo_use;
pub mod referral;

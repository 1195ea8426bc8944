//! Error types for the giveaway engine
//!
//! Expected conflicts (already joined, already redeemed, duplicate code) are
//! modeled as outcome enums in the service layer, not as errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("giveaway not found")]
  GiveawayNotFound,

  #[error("telegram request failed: {0}")]
  Telegram(#[from] teloxide::RequestError),

  #[error("unauthorized")]
  Unauthorized,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Database(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
      }
      Error::GiveawayNotFound => (StatusCode::NOT_FOUND, "Giveaway not found"),
      Error::Telegram(_) => (StatusCode::BAD_GATEWAY, "Telegram API error"),
      Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T> = std::result::Result<T, Error>;

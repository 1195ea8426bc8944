//! Admin JSON API, guarded by the `X-Admin-Secret` header.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
  input::{self, ChannelInput},
  prelude::*,
  state::AppState,
  sv,
};

fn guard(app: &AppState, headers: &HeaderMap) -> Result<()> {
  let presented = headers
    .get("x-admin-secret")
    .and_then(|value| value.to_str().ok())
    .unwrap_or_default();

  if presented == app.secret { Ok(()) } else { Err(Error::Unauthorized) }
}

fn unprocessable(message: &str) -> Response {
  let body = json::json!({ "success": false, "error": message });
  (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}

pub async fn health() -> &'static str {
  "OK"
}

#[derive(Debug, Serialize)]
pub struct GiveawayRes {
  pub id: i64,
  pub title: String,
  pub description: String,
  pub winners_count: i32,
  pub channel: Option<String>,
  pub ends_at: Option<DateTime>,
  pub is_active: bool,
  pub created_at: DateTime,
  pub participants: u64,
}

pub async fn list_giveaways(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Vec<GiveawayRes>>> {
  guard(&app, &headers)?;
  let sv = app.sv();

  let mut out = Vec::new();
  for giveaway in sv.giveaway.all().await? {
    let participants = sv.participant.count(giveaway.id).await?;
    out.push(GiveawayRes {
      id: giveaway.id,
      title: giveaway.title,
      description: giveaway.description,
      winners_count: giveaway.winners_count,
      channel: giveaway.channel,
      ends_at: giveaway.ends_at,
      is_active: giveaway.is_active,
      created_at: giveaway.created_at,
      participants,
    });
  }

  Ok(Json(out))
}

fn default_one() -> i32 {
  1
}

#[derive(Debug, Deserialize)]
pub struct CreateGiveawayReq {
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default = "default_one")]
  pub winners_count: i32,
  pub ends_at: Option<DateTime>,
  pub channel: Option<String>,
}

pub async fn create_giveaway(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(req): Json<CreateGiveawayReq>,
) -> Result<Response> {
  guard(&app, &headers)?;

  if req.title.trim().is_empty() {
    return Ok(unprocessable("Title cannot be empty"));
  }
  if req.winners_count <= 0 {
    return Ok(unprocessable("winners_count must be positive"));
  }

  let channel = match req.channel.as_deref() {
    None => None,
    Some(raw) => match input::normalize_channel(raw) {
      Some(ChannelInput::Handle(handle)) => Some(handle),
      Some(ChannelInput::Skip) | None => {
        return Ok(unprocessable("channel must be @handle or a t.me link"));
      }
    },
  };

  let created = app
    .sv()
    .giveaway
    .create(
      &req.title,
      &req.description,
      req.ends_at,
      req.winners_count,
      channel,
    )
    .await?;

  Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub async fn delete_giveaway(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i64>,
) -> Result<Json<json::Value>> {
  guard(&app, &headers)?;

  app.sv().giveaway.deactivate(id).await?;
  Ok(Json(json::json!({ "success": true })))
}

#[derive(Debug, Serialize)]
pub struct PromoRes {
  pub code: String,
  pub is_active: bool,
  pub uses: i32,
  pub max_uses: i32,
}

pub async fn list_codes(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i64>,
) -> Result<Json<Vec<PromoRes>>> {
  guard(&app, &headers)?;

  let codes = app
    .sv()
    .promo
    .list(id)
    .await?
    .into_iter()
    .map(|promo| PromoRes {
      code: promo.code,
      is_active: promo.is_active,
      uses: promo.uses,
      max_uses: promo.max_uses,
    })
    .collect();

  Ok(Json(codes))
}

#[derive(Debug, Deserialize)]
pub struct CreatePromoReq {
  pub code: String,
  #[serde(default = "default_one")]
  pub max_uses: i32,
}

pub async fn create_code(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i64>,
  Json(req): Json<CreatePromoReq>,
) -> Result<Response> {
  guard(&app, &headers)?;

  if !input::valid_code(&req.code) {
    return Ok(unprocessable(
      "code must be 1-64 chars of letters, digits, `_` or `-`",
    ));
  }
  if req.max_uses <= 0 {
    return Ok(unprocessable("max_uses must be positive"));
  }

  // reject codes for giveaways that never existed
  if app.sv().giveaway.fresh(id).await?.is_none() {
    return Err(Error::GiveawayNotFound);
  }

  match app.sv().promo.create(id, &req.code, req.max_uses).await? {
    sv::Create::Created(promo) => {
      Ok((StatusCode::CREATED, Json(promo)).into_response())
    }
    sv::Create::Duplicate => {
      let body = json::json!({
        "success": false,
        "error": "Code already exists for this giveaway"
      });
      Ok((StatusCode::CONFLICT, Json(body)).into_response())
    }
  }
}

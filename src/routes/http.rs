//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::blocks::DayBlock;
use crate::error::ApiResult;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_labs(State(state): State<Arc<AppState>>) -> Json<Vec<LabOut>> {
  Json(list_labs(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_days(
  State(state): State<Arc<AppState>>,
  Path(slug): Path<String>,
) -> ApiResult<Json<Vec<DaySummaryOut>>> {
  let days = list_day_summaries(&state, &slug).await?;
  info!(target: "labs_backend", %slug, days = days.len(), "HTTP day list served");
  Ok(Json(days))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_day(
  State(state): State<Arc<AppState>>,
  Path((slug, day)): Path<(String, u32)>,
) -> ApiResult<Json<DayOut>> {
  let view = load_day(&state, &slug, day).await?;
  info!(target: "labs_backend", %slug, day, blocks = view.blocks.len(), "HTTP day served");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body), fields(blocks = body.blocks.len()))]
pub async fn http_put_day_content(
  State(state): State<Arc<AppState>>,
  Path((slug, day)): Path<(String, u32)>,
  Json(body): Json<SaveDayIn>,
) -> ApiResult<Json<DayOut>> {
  let view = save_day_content(&state, &slug, day, body).await?;
  info!(target: "labs_backend", %slug, day, revision = view.revision, "HTTP day content saved");
  Ok(Json(view))
}

#[instrument(level = "info", skip(body), fields(block_type = %body.block_type))]
pub async fn http_post_block(Json(body): Json<CreateBlockIn>) -> ApiResult<Json<DayBlock>> {
  Ok(Json(new_block(&body.block_type)?))
}

#[instrument(level = "info", skip(state, body), fields(content_len = body.content.as_ref().map_or(0, String::len)))]
pub async fn http_post_parse(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ParseIn>,
) -> Json<ParseOut> {
  Json(parse_content(&body, state.settings.summary_max_chars))
}

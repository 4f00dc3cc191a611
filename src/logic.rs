//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Building the learner view of a day (parse, resolve primary, prompt)
//!   - Lab listings with per-day summaries
//!   - Saving authored blocks (prune, serialize, sync the legacy video column)
//!   - Stateless parsing of arbitrary stored content

use tracing::{debug, info, instrument, warn};

use crate::blocks::{
  create_block, discussion_prompt_or_default, extract_discussion_prompt, legacy_video_url, normalize_blocks,
  parse_day_content, prune_for_save, resolve_primary_resource, serialize_day_content, BlockType, DayBlock,
};
use crate::domain::Day;
use crate::error::{ApiError, ApiResult};
use crate::protocol::*;
use crate::state::{AppState, DayWrite};
use crate::util::{summarize_blocks, trunc_for_log};

/// Learner view: normalized blocks, resolved primary resource, and forum prompt.
pub fn day_view(day: &Day) -> DayOut {
  let content = day.content.as_deref();
  let blocks = parse_day_content(content, day.video_url.as_deref());
  let primary = resolve_primary_resource(&blocks).map(|p| to_primary_out(&p));
  let has_custom_prompt = !extract_discussion_prompt(content).is_empty();
  DayOut {
    lab_slug: day.lab_slug.clone(),
    day_number: day.day_number,
    title: day.title.clone(),
    video_url: day.video_url.clone(),
    revision: day.revision,
    discussion_prompt: discussion_prompt_or_default(content, &day.title),
    has_custom_prompt,
    primary,
    blocks,
  }
}

#[instrument(level = "info", skip(state))]
pub async fn load_day(state: &AppState, slug: &str, day_number: u32) -> ApiResult<DayOut> {
  let day = find_day(state, slug, day_number).await?;
  let view = day_view(&day);
  debug!(target: "blocks", %slug, day = day_number, blocks = view.blocks.len(), gating = view.primary.as_ref().map_or(false, |p| p.gating), "Day view built");
  Ok(view)
}

#[instrument(level = "info", skip(state))]
pub async fn list_labs(state: &AppState) -> Vec<LabOut> {
  state
    .list_labs()
    .await
    .into_iter()
    .map(|(lab, day_count)| LabOut { slug: lab.slug, title: lab.title, description: lab.description, day_count })
    .collect()
}

#[instrument(level = "info", skip(state))]
pub async fn list_day_summaries(state: &AppState, slug: &str) -> ApiResult<Vec<DaySummaryOut>> {
  let days = state.list_days(slug).await.ok_or_else(|| ApiError::LabNotFound(slug.to_string()))?;
  let max_chars = state.settings.summary_max_chars;
  Ok(
    days
      .iter()
      .map(|day| {
        let blocks = parse_day_content(day.content.as_deref(), day.video_url.as_deref());
        let primary = resolve_primary_resource(&blocks);
        DaySummaryOut {
          day_number: day.day_number,
          title: day.title.clone(),
          summary: summarize_blocks(&blocks, max_chars),
          block_count: blocks.len(),
          primary_type: primary.as_ref().map(|p| p.block.block_type()),
          gating: primary.as_ref().map_or(false, |p| p.gating),
        }
      })
      .collect(),
  )
}

/// Factory entry point for the authoring UI; rejects unknown type names.
pub fn new_block(type_name: &str) -> ApiResult<DayBlock> {
  BlockType::from_wire(type_name.trim())
    .map(create_block)
    .ok_or_else(|| ApiError::InvalidInput(format!("unknown block type: {type_name}")))
}

/// HTTP save: loose JSON blocks are normalized first, then saved like any authored list.
#[instrument(level = "info", skip(state, input), fields(raw_blocks = input.blocks.len()))]
pub async fn save_day_content(state: &AppState, slug: &str, day_number: u32, input: SaveDayIn) -> ApiResult<DayOut> {
  let blocks = normalize_blocks(&input.blocks);
  if blocks.len() != input.blocks.len() {
    warn!(target: "blocks", %slug, day = day_number, dropped = input.blocks.len() - blocks.len(), "Unreadable blocks dropped from save request");
  }
  save_blocks(state, slug, day_number, input.title, blocks, input.discussion_prompt.as_deref()).await
}

/// Prune, serialize, and store. The legacy `video_url` follows the primary video.
#[instrument(level = "info", skip(state, title, blocks, prompt), fields(blocks = blocks.len()))]
pub async fn save_blocks(
  state: &AppState,
  slug: &str,
  day_number: u32,
  title: Option<String>,
  blocks: Vec<DayBlock>,
  prompt: Option<&str>,
) -> ApiResult<DayOut> {
  let blocks = prune_for_save(blocks);
  let content = serialize_day_content(&blocks, prompt)?;
  let video_url = legacy_video_url(&blocks);
  debug!(target: "blocks", %slug, day = day_number, content = %trunc_for_log(&content, 200), "Serialized day content");

  let write = DayWrite { title, content, video_url };
  match state.write_day(slug, day_number, write).await {
    Some(day) => {
      info!(target: "blocks", %slug, day = day_number, blocks = blocks.len(), revision = day.revision, "Day content saved");
      Ok(day_view(&day))
    }
    None => Err(missing(state, slug, day_number).await),
  }
}

/// Stateless parse of arbitrary stored columns; handy for migrations and previews.
pub fn parse_content(input: &ParseIn, summary_max_chars: usize) -> ParseOut {
  let content = input.content.as_deref();
  let blocks = parse_day_content(content, input.video_url.as_deref());
  let primary = resolve_primary_resource(&blocks).map(|p| to_primary_out(&p));
  ParseOut {
    discussion_prompt: extract_discussion_prompt(content),
    summary: summarize_blocks(&blocks, summary_max_chars),
    primary,
    blocks,
  }
}

pub async fn find_day(state: &AppState, slug: &str, day_number: u32) -> ApiResult<Day> {
  match state.get_day(slug, day_number).await {
    Some(day) => Ok(day),
    None => Err(missing(state, slug, day_number).await),
  }
}

async fn missing(state: &AppState, slug: &str, day_number: u32) -> ApiError {
  if state.get_lab(slug).await.is_none() {
    ApiError::LabNotFound(slug.to_string())
  } else {
    ApiError::DayNotFound { lab: slug.to_string(), day: day_number }
  }
}

//! Authoring session: the admin's in-progress edit of one day.
//!
//! Every edit produces a whole new `Draft` (blocks + prompt) that is pushed onto
//! a bounded history, so undo/redo is just moving between snapshots. Saving
//! goes through the same prune/serialize path as the HTTP save and then adopts
//! what was actually stored as the new clean state.

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::blocks::history::EditHistory;
use crate::blocks::schema::{create_block, BlockGroup, BlockRole, BlockType, DayBlock};
use crate::blocks::{extract_discussion_prompt, normalize_blocks, parse_day_content};
use crate::domain::Day;
use crate::error::{ApiError, ApiResult};
use crate::logic::{find_day, save_blocks};
use crate::protocol::{DayOut, SessionOut};
use crate::state::AppState;

#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
  pub blocks: Vec<DayBlock>,
  pub prompt: String,
}

pub struct AuthoringSession {
  pub lab_slug: String,
  pub day_number: u32,
  pub title: String,
  history: EditHistory<Draft>,
  saved: Draft,
}

impl AuthoringSession {
  pub fn from_day(day: &Day, history_limit: usize) -> Self {
    let draft = Draft {
      blocks: parse_day_content(day.content.as_deref(), day.video_url.as_deref()),
      prompt: extract_discussion_prompt(day.content.as_deref()),
    };
    Self {
      lab_slug: day.lab_slug.clone(),
      day_number: day.day_number,
      title: day.title.clone(),
      history: EditHistory::new(draft.clone(), history_limit),
      saved: draft,
    }
  }

  #[instrument(level = "info", skip(state))]
  pub async fn open(state: &AppState, lab: &str, day: u32) -> ApiResult<Self> {
    let day = find_day(state, lab, day).await?;
    let session = Self::from_day(&day, state.settings.history_limit);
    info!(target: "authoring", lab = %session.lab_slug, day = session.day_number, blocks = session.blocks().len(), "Authoring session opened");
    Ok(session)
  }

  pub fn blocks(&self) -> &[DayBlock] {
    &self.history.present().blocks
  }

  pub fn prompt(&self) -> &str {
    &self.history.present().prompt
  }

  pub fn is_dirty(&self) -> bool {
    *self.history.present() != self.saved
  }

  /// Insert a fresh block of `kind` at `index` (clamped), or at the end. Returns its id.
  pub fn add_block(&mut self, kind: BlockType, index: Option<usize>) -> String {
    let block = create_block(kind);
    let id = block.id.clone();
    self.edit(|draft| {
      let at = index.unwrap_or(draft.blocks.len()).min(draft.blocks.len());
      draft.blocks.insert(at, block);
      Ok(())
    })
    .map(|_| id)
    .unwrap_or_default()
  }

  /// Replace a block (matched by id) with an edited version sent as loose JSON.
  pub fn update_block(&mut self, raw: &Value) -> ApiResult<bool> {
    let has_id = raw.get("id").and_then(Value::as_str).map_or(false, |id| !id.trim().is_empty());
    if !has_id {
      return Err(ApiError::InvalidInput("block id is required".into()));
    }
    let block = normalize_blocks(std::slice::from_ref(raw))
      .pop()
      .ok_or_else(|| ApiError::InvalidInput("unreadable block".into()))?;
    self.edit(|draft| {
      let slot = draft
        .blocks
        .iter_mut()
        .find(|b| b.id == block.id)
        .ok_or_else(|| ApiError::BlockNotFound(block.id.clone()))?;
      *slot = block;
      Ok(())
    })
  }

  pub fn remove_block(&mut self, block_id: &str) -> ApiResult<bool> {
    self.edit(|draft| {
      let at = position(draft, block_id)?;
      draft.blocks.remove(at);
      Ok(())
    })
  }

  /// Move a block to position `to` (clamped to the end).
  pub fn move_block(&mut self, block_id: &str, to: usize) -> ApiResult<bool> {
    self.edit(|draft| {
      let from = position(draft, block_id)?;
      let block = draft.blocks.remove(from);
      let to = to.min(draft.blocks.len());
      draft.blocks.insert(to, block);
      Ok(())
    })
  }

  /// Make one resource block the day's primary and demote every other.
  pub fn set_primary(&mut self, block_id: &str) -> ApiResult<bool> {
    self.edit(|draft| {
      let at = position(draft, block_id)?;
      if draft.blocks[at].group != BlockGroup::Resource {
        return Err(ApiError::InvalidInput("challenge blocks cannot be the primary resource".into()));
      }
      for (i, b) in draft.blocks.iter_mut().enumerate() {
        if i == at {
          b.role = BlockRole::Primary;
          b.resource_slot = None;
        } else if b.role == BlockRole::Primary {
          b.role = BlockRole::Support;
        }
      }
      Ok(())
    })
  }

  pub fn set_prompt(&mut self, text: &str) -> bool {
    self.edit(|draft| {
      draft.prompt = text.to_string();
      Ok(())
    })
    .unwrap_or(false)
  }

  pub fn undo(&mut self) -> bool {
    self.history.undo()
  }

  pub fn redo(&mut self) -> bool {
    self.history.redo()
  }

  /// Persist the current draft, then treat what was stored as the clean state.
  #[instrument(level = "info", skip(self, state), fields(lab = %self.lab_slug, day = self.day_number))]
  pub async fn save(&mut self, state: &AppState) -> ApiResult<DayOut> {
    let draft = self.history.present().clone();
    let view = save_blocks(state, &self.lab_slug, self.day_number, None, draft.blocks, Some(&draft.prompt)).await?;
    let stored = Draft {
      blocks: view.blocks.clone(),
      prompt: if view.has_custom_prompt { view.discussion_prompt.clone() } else { String::new() },
    };
    self.history.push(stored.clone());
    self.saved = stored;
    self.title = view.title.clone();
    Ok(view)
  }

  pub fn snapshot(&self) -> SessionOut {
    SessionOut {
      lab_slug: self.lab_slug.clone(),
      day_number: self.day_number,
      title: self.title.clone(),
      blocks: self.blocks().to_vec(),
      discussion_prompt: self.prompt().to_string(),
      can_undo: self.history.can_undo(),
      can_redo: self.history.can_redo(),
      dirty: self.is_dirty(),
    }
  }

  /// Apply `change` to a copy of the current draft and record it. Ok(false) means nothing changed.
  fn edit(&mut self, change: impl FnOnce(&mut Draft) -> ApiResult<()>) -> ApiResult<bool> {
    let mut next = self.history.present().clone();
    change(&mut next)?;
    let changed = self.history.push(next);
    debug!(target: "authoring", lab = %self.lab_slug, day = self.day_number, changed, "Draft edited");
    Ok(changed)
  }
}

fn position(draft: &Draft, block_id: &str) -> ApiResult<usize> {
  draft
    .blocks
    .iter()
    .position(|b| b.id == block_id)
    .ok_or_else(|| ApiError::BlockNotFound(block_id.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blocks::schema::BlockBody;
  use crate::seeds::SEED_LAB_SLUG;
  use serde_json::json;

  async fn open(day: u32) -> (AppState, AuthoringSession) {
    let state = AppState::from_config(None);
    let session = AuthoringSession::open(&state, SEED_LAB_SLUG, day).await.unwrap();
    (state, session)
  }

  #[tokio::test]
  async fn opening_parses_stored_content() {
    let (_, s) = open(3).await;
    let ids: Vec<&str> = s.blocks().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["d3-video", "d3-notes", "d3-quiz"]);
    assert!(s.prompt().starts_with("¿Qué error"));
    assert!(!s.is_dirty());
  }

  #[tokio::test]
  async fn edits_undo_and_redo() {
    let (_, mut s) = open(4).await;
    let id = s.add_block(BlockType::Text, Some(0));
    assert_eq!(s.blocks()[0].id, id);
    assert!(s.is_dirty());

    s.update_block(&json!({ "id": id, "type": "text", "html": "<p>Lee primero</p>" })).unwrap();
    assert_eq!(s.blocks()[0].body, BlockBody::Text { html: "<p>Lee primero</p>".into() });

    assert!(s.undo());
    assert_eq!(s.blocks()[0].body, BlockBody::Text { html: String::new() });
    assert!(s.undo());
    assert_eq!(s.blocks().len(), 1);
    assert!(!s.is_dirty());
    assert!(s.redo());
    assert_eq!(s.blocks().len(), 2);
  }

  #[tokio::test]
  async fn set_primary_demotes_others_and_rejects_challenge_blocks() {
    let (_, mut s) = open(3).await;
    s.set_primary("d3-notes").unwrap();
    let roles: Vec<BlockRole> = s.blocks().iter().map(|b| b.role).collect();
    assert_eq!(roles, vec![BlockRole::Support, BlockRole::Primary, BlockRole::Support]);
    assert!(matches!(s.set_primary("d3-quiz"), Err(ApiError::InvalidInput(_))));
    assert!(matches!(s.set_primary("missing"), Err(ApiError::BlockNotFound(_))));
  }

  #[tokio::test]
  async fn move_and_remove() {
    let (_, mut s) = open(3).await;
    s.move_block("d3-quiz", 0).unwrap();
    assert_eq!(s.blocks()[0].id, "d3-quiz");
    s.move_block("d3-quiz", 99).unwrap();
    assert_eq!(s.blocks()[2].id, "d3-quiz");
    s.remove_block("d3-notes").unwrap();
    assert_eq!(s.blocks().len(), 2);
    assert!(s.remove_block("d3-notes").is_err());
  }

  #[tokio::test]
  async fn update_requires_known_id() {
    let (_, mut s) = open(3).await;
    assert!(s.update_block(&json!({ "type": "text" })).is_err());
    assert!(matches!(s.update_block(&json!({ "id": "zzz", "type": "text" })), Err(ApiError::BlockNotFound(_))));
    assert!(matches!(s.update_block(&json!({ "id": "d3-quiz", "type": "poll" })), Err(ApiError::InvalidInput(_))));
  }

  #[tokio::test]
  async fn save_adopts_pruned_content() {
    let (state, mut s) = open(4).await;
    s.add_block(BlockType::Checklist, None);
    s.set_prompt("  Muestra tu CLI  ");
    let view = s.save(&state).await.unwrap();
    assert!(!s.is_dirty());
    assert_eq!(view.discussion_prompt, "Muestra tu CLI");
    let BlockBody::Checklist(c) = &s.blocks()[1].body else { panic!("not a checklist") };
    assert!(c.items.is_empty(), "empty checklist item pruned on save");
    assert!(s.undo(), "save is undoable");
  }
}

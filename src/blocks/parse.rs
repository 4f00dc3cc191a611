//! Stored payload -> normalized block list.
//!
//! Parsing is lenient: nothing stored in a day's `content` column may make the
//! reader fail. The document goes through a short chain of format detectors:
//!
//!   1. JSON object with a `blocks` array (version 2, and version 1 objects)
//!   2. JSON bare array of blocks (earliest JSON encoding)
//!   3. legacy plain text + separate `video_url` column
//!
//! Content that starts like JSON but fails to parse is treated as corrupt and
//! yields no blocks rather than being shown as prose.
//!
//! Each raw block is then normalized on its own; a corrupt block is dropped
//! without affecting its siblings. Missing ids are derived from position so
//! the same content always parses to the same ids.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use super::schema::*;
use crate::util::plain_text_to_html;

pub const LEGACY_VIDEO_ID: &str = "legacy-video";
pub const LEGACY_TEXT_ID: &str = "legacy-text";

type Detector = fn(&Value) -> Option<&Vec<Value>>;

const DETECTORS: [(&str, Detector); 2] = [("json_object", detect_blocks_object), ("json_array", detect_bare_array)];

fn detect_blocks_object(doc: &Value) -> Option<&Vec<Value>> {
  doc.as_object()?.get("blocks")?.as_array()
}

fn detect_bare_array(doc: &Value) -> Option<&Vec<Value>> {
  doc.as_array()
}

/// Rebuild a day's blocks from `content` and the legacy `video_url` column. Never fails.
pub fn parse_day_content(content: Option<&str>, legacy_video_url: Option<&str>) -> Vec<DayBlock> {
  let text = content.map(str::trim).filter(|s| !s.is_empty());

  let Some(text) = text else {
    return legacy_blocks(None, legacy_video_url);
  };

  match serde_json::from_str::<Value>(text) {
    Ok(doc) => {
      let blocks = DETECTORS
        .iter()
        .find_map(|(name, detect)| {
          detect(&doc).map(|raw| {
            debug!(target: "blocks", format = *name, raw_blocks = raw.len(), "Detected stored content format");
            normalize_blocks(raw)
          })
        })
        .unwrap_or_default();
      if blocks.is_empty() {
        // Valid JSON never turns into a text block; only the video column can help.
        legacy_blocks(None, legacy_video_url)
      } else {
        blocks
      }
    }
    // Broken JSON is corrupt content, not legacy prose.
    Err(_) if looks_like_json(text) => {
      debug!(target: "blocks", "Stored content looks like JSON but does not parse");
      legacy_blocks(None, legacy_video_url)
    }
    Err(_) => legacy_blocks(Some(text), legacy_video_url),
  }
}

fn looks_like_json(text: &str) -> bool {
  text.starts_with('{') || text.starts_with('[')
}

/// Normalize an array of untrusted block values, dropping the ones that cannot be read.
pub fn normalize_blocks(raw: &[Value]) -> Vec<DayBlock> {
  let mut ids = IdSet::reserving(raw);
  raw
    .iter()
    .enumerate()
    .filter_map(|(position, value)| {
      let block = normalize_block(value, position, &mut ids);
      if block.is_none() {
        debug!(target: "blocks", position, "Dropped unreadable block");
      }
      block
    })
    .collect()
}

fn normalize_block(raw: &Value, position: usize, ids: &mut IdSet) -> Option<DayBlock> {
  let obj = raw.as_object()?;
  let kind = str_field(obj, &["type"]).and_then(BlockType::from_wire)?;

  let id = ids.claim(id_field(obj), || format!("{}-{}", kind.as_str(), position + 1));
  let group = str_field(obj, &["group"])
    .and_then(BlockGroup::from_wire)
    .unwrap_or_else(|| default_group_for(kind));
  let role = match group {
    BlockGroup::Challenge => BlockRole::Support,
    BlockGroup::Resource => str_field(obj, &["role"]).and_then(BlockRole::from_wire).unwrap_or(BlockRole::Support),
  };
  let resource_slot = normalize_slot(kind, group, role, str_field(obj, &["resourceSlot", "resource_slot"]));
  let body = normalize_body(kind, obj, &id);

  Some(DayBlock { id, group, role, resource_slot, body })
}

fn normalize_slot(kind: BlockType, group: BlockGroup, role: BlockRole, raw: Option<&str>) -> Option<ResourceSlot> {
  let slot = raw.and_then(ResourceSlot::from_wire)?;
  if group != BlockGroup::Resource || role != BlockRole::Support {
    return Some(ResourceSlot::None);
  }
  slot_allowed(kind, slot).then_some(slot)
}

fn normalize_body(kind: BlockType, obj: &Map<String, Value>, block_id: &str) -> BlockBody {
  match kind {
    BlockType::Text => BlockBody::Text {
      html: str_field(obj, &["html", "content", "text"]).unwrap_or_default().to_string(),
    },
    BlockType::Video => BlockBody::Video(media_body(obj)),
    BlockType::Audio => BlockBody::Audio(media_body(obj)),
    BlockType::Image => BlockBody::Image(media_body(obj)),
    BlockType::File => BlockBody::File(media_body(obj)),
    BlockType::Checklist => BlockBody::Checklist(ChecklistBody {
      title: opt_text(obj, &["title"]),
      items: checklist_items(array_field(obj, "items"), block_id),
    }),
    BlockType::Quiz => BlockBody::Quiz(QuizBody {
      title: opt_text(obj, &["title"]),
      questions: quiz_questions(array_field(obj, "questions"), block_id),
    }),
    BlockType::ChallengeSteps => BlockBody::ChallengeSteps(StepsBody {
      title: opt_text(obj, &["title"]),
      steps: challenge_steps(array_field(obj, "steps"), block_id),
    }),
  }
}

fn media_body(obj: &Map<String, Value>) -> MediaBody {
  MediaBody {
    url: str_field(obj, &["url", "src"]).unwrap_or_default().trim().to_string(),
    caption: opt_text(obj, &["caption"]),
  }
}

fn checklist_items(raw: &[Value], block_id: &str) -> Vec<ChecklistItem> {
  let mut ids = IdSet::reserving(raw);
  raw
    .iter()
    .enumerate()
    .filter_map(|(i, v)| {
      let fallback = || format!("{block_id}-item-{}", i + 1);
      match v {
        Value::String(s) => Some(ChecklistItem { id: ids.claim(None, fallback), text: s.clone() }),
        Value::Object(o) => Some(ChecklistItem {
          id: ids.claim(id_field(o), fallback),
          text: str_field(o, &["text", "label"]).unwrap_or_default().to_string(),
        }),
        _ => None,
      }
    })
    .collect()
}

fn quiz_questions(raw: &[Value], block_id: &str) -> Vec<QuizQuestion> {
  let mut ids = IdSet::reserving(raw);
  raw
    .iter()
    .enumerate()
    .filter_map(|(i, v)| {
      let fallback = || format!("{block_id}-q-{}", i + 1);
      match v {
        Value::String(s) => Some(QuizQuestion {
          id: ids.claim(None, fallback),
          prompt: s.clone(),
          options: Vec::new(),
          correct_index: None,
          explanation: None,
        }),
        Value::Object(o) => {
          let stored_index = ["correctIndex", "correct_index"]
            .iter()
            .find_map(|k| o.get(*k))
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok());
          // Unreadable options are dropped; the answer must keep pointing at the same option.
          let mut options = Vec::new();
          let mut correct_index = None;
          for (i, option) in array_field(o, "options").iter().enumerate() {
            let Some(text) = scalar_text(option) else { continue };
            if stored_index == Some(i) {
              correct_index = Some(options.len());
            }
            options.push(text);
          }
          Some(QuizQuestion {
            id: ids.claim(id_field(o), fallback),
            prompt: str_field(o, &["prompt", "question"]).unwrap_or_default().to_string(),
            options,
            correct_index,
            explanation: opt_text(o, &["explanation"]),
          })
        }
        _ => None,
      }
    })
    .collect()
}

fn challenge_steps(raw: &[Value], block_id: &str) -> Vec<ChallengeStep> {
  let mut ids = IdSet::reserving(raw);
  raw
    .iter()
    .enumerate()
    .filter_map(|(i, v)| {
      let fallback = || format!("{block_id}-step-{}", i + 1);
      match v {
        Value::String(s) => Some(ChallengeStep { id: ids.claim(None, fallback), label: step_label(i + 1), text: s.clone() }),
        Value::Object(o) => Some(ChallengeStep {
          id: ids.claim(id_field(o), fallback),
          label: str_field(o, &["label"])
            .filter(|l| !l.trim().is_empty())
            .map_or_else(|| step_label(i + 1), str::to_string),
          text: str_field(o, &["text", "description"]).unwrap_or_default().to_string(),
        }),
        _ => None,
      }
    })
    .collect()
}

/// Pre-JSON storage: plain text in `content`, the video in its own column.
fn legacy_blocks(text: Option<&str>, video_url: Option<&str>) -> Vec<DayBlock> {
  let mut out = Vec::new();
  if let Some(url) = video_url.map(str::trim).filter(|s| !s.is_empty()) {
    out.push(DayBlock {
      id: LEGACY_VIDEO_ID.into(),
      group: BlockGroup::Resource,
      role: BlockRole::Primary,
      resource_slot: None,
      body: BlockBody::Video(MediaBody { url: url.to_string(), caption: None }),
    });
  }
  if let Some(text) = text.map(str::trim).filter(|s| !s.is_empty()) {
    let role = if out.is_empty() { BlockRole::Primary } else { BlockRole::Support };
    out.push(DayBlock {
      id: LEGACY_TEXT_ID.into(),
      group: BlockGroup::Resource,
      role,
      resource_slot: None,
      body: BlockBody::Text { html: plain_text_to_html(text) },
    });
  }
  if !out.is_empty() {
    debug!(target: "blocks", blocks = out.len(), "Upgraded legacy day content");
  }
  out
}

/// Ids within one list. Explicit ids are reserved up front so a positional
/// fallback never takes an id a later entry stored; duplicates get a numeric suffix.
struct IdSet {
  taken: HashSet<String>,
  reserved: HashSet<String>,
}

impl IdSet {
  fn reserving(raw: &[Value]) -> Self {
    let reserved = raw
      .iter()
      .filter_map(Value::as_object)
      .filter_map(id_field)
      .filter(|id| !id.is_empty())
      .collect();
    Self { taken: HashSet::new(), reserved }
  }

  fn claim(&mut self, preferred: Option<String>, fallback: impl FnOnce() -> String) -> String {
    let (base, explicit) = match preferred.filter(|s| !s.is_empty()) {
      Some(id) => (id, true),
      None => (fallback(), false),
    };
    if !self.taken.contains(&base) && (explicit || !self.reserved.contains(&base)) {
      self.taken.insert(base.clone());
      return base;
    }
    let mut n = 2;
    loop {
      let candidate = format!("{base}-{n}");
      if !self.taken.contains(&candidate) && !self.reserved.contains(&candidate) {
        self.taken.insert(candidate.clone());
        return candidate;
      }
      n += 1;
    }
  }
}

fn str_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
  keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_str))
}

/// Ids were sometimes stored as numbers.
fn id_field(obj: &Map<String, Value>) -> Option<String> {
  match obj.get("id")? {
    Value::String(s) => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Optional text is kept as stored; trimming happens on save.
fn opt_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
  str_field(obj, keys).map(str::to_string)
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
  obj.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn scalar_text(v: &Value) -> Option<String> {
  match v {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

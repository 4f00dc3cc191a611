//! Block list -> stored JSON payload.

use serde::Serialize;

use super::schema::DayBlock;

/// Version written on every save. Older payloads are upgraded on read.
pub const CONTENT_VERSION: u32 = 2;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredPayload<'a> {
  version: u32,
  blocks: &'a [DayBlock],
  #[serde(skip_serializing_if = "Option::is_none")]
  discussion_prompt: Option<&'a str>,
}

/// Serialize blocks plus an optional discussion prompt into the `content` column.
///
/// Only the fields of each block's own type are emitted. The prompt is trimmed and
/// the key is left out entirely when it ends up empty. No semantic validation
/// happens here; callers prune before saving.
pub fn serialize_day_content(blocks: &[DayBlock], discussion_prompt: Option<&str>) -> Result<String, serde_json::Error> {
  let prompt = discussion_prompt.map(str::trim).filter(|p| !p.is_empty());
  serde_json::to_string(&StoredPayload { version: CONTENT_VERSION, blocks, discussion_prompt: prompt })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blocks::schema::*;
  use serde_json::{json, Value};

  fn quiz_block() -> DayBlock {
    DayBlock {
      id: "b1".into(),
      group: BlockGroup::Challenge,
      role: BlockRole::Support,
      resource_slot: None,
      body: BlockBody::Quiz(QuizBody {
        title: None,
        questions: vec![QuizQuestion {
          id: "q1".into(),
          prompt: "2+2?".into(),
          options: vec!["3".into(), "4".into()],
          correct_index: Some(1),
          explanation: None,
        }],
      }),
    }
  }

  #[test]
  fn writes_version_and_omits_empty_prompt() {
    let s = serialize_day_content(&[quiz_block()], Some("   ")).unwrap();
    assert!(s.contains("\"version\":2"));
    assert!(!s.contains("discussionPrompt"));
  }

  #[test]
  fn trims_prompt() {
    let s = serialize_day_content(&[], Some("  What did you build?  ")).unwrap();
    let v: Value = serde_json::from_str(&s).unwrap();
    assert_eq!(v["discussionPrompt"], "What did you build?");
    assert_eq!(v["blocks"], json!([]));
  }

  #[test]
  fn block_shape_is_flat_and_type_tagged() {
    let s = serialize_day_content(&[quiz_block()], None).unwrap();
    let v: Value = serde_json::from_str(&s).unwrap();
    assert_eq!(
      v["blocks"][0],
      json!({
        "id": "b1",
        "group": "challenge",
        "role": "support",
        "type": "quiz",
        "questions": [{ "id": "q1", "prompt": "2+2?", "options": ["3", "4"], "correctIndex": 1 }]
      })
    );
  }

  #[test]
  fn null_correct_index_is_kept() {
    let mut b = quiz_block();
    if let BlockBody::Quiz(q) = &mut b.body {
      q.questions[0].correct_index = None;
    }
    let s = serialize_day_content(&[b], None).unwrap();
    assert!(s.contains("\"correctIndex\":null"));
  }

  #[test]
  fn media_block_emits_slot_and_caption() {
    let b = DayBlock {
      id: "f1".into(),
      group: BlockGroup::Resource,
      role: BlockRole::Support,
      resource_slot: Some(ResourceSlot::Download),
      body: BlockBody::File(MediaBody { url: "https://cdn.example.com/a.pdf".into(), caption: Some("Slides".into()) }),
    };
    let s = serialize_day_content(&[b], None).unwrap();
    let v: Value = serde_json::from_str(&s).unwrap();
    assert_eq!(
      v["blocks"][0],
      json!({
        "id": "f1",
        "group": "resource",
        "role": "support",
        "resourceSlot": "download",
        "type": "file",
        "url": "https://cdn.example.com/a.pdf",
        "caption": "Slides"
      })
    );
  }
}

//! Day-content block schema and factory.
//!
//! A day is an ordered list of `DayBlock`s. Every block carries the common
//! envelope (`id`, `group`, `role`, optional `resourceSlot`) and exactly one
//! typed payload (`BlockBody`). Serialization flattens the payload next to the
//! envelope and tags it with `type`, which is the stored wire shape.

use serde::Serialize;
use uuid::Uuid;

/// Every block type the model knows about. Anything else found in storage is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
  Text,
  Video,
  Audio,
  Image,
  File,
  Checklist,
  Quiz,
  ChallengeSteps,
}

impl BlockType {
  pub const ALL: [BlockType; 8] = [
    BlockType::Text,
    BlockType::Video,
    BlockType::Audio,
    BlockType::Image,
    BlockType::File,
    BlockType::Checklist,
    BlockType::Quiz,
    BlockType::ChallengeSteps,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      BlockType::Text => "text",
      BlockType::Video => "video",
      BlockType::Audio => "audio",
      BlockType::Image => "image",
      BlockType::File => "file",
      BlockType::Checklist => "checklist",
      BlockType::Quiz => "quiz",
      BlockType::ChallengeSteps => "challenge_steps",
    }
  }

  pub fn from_wire(s: &str) -> Option<Self> {
    BlockType::ALL.into_iter().find(|t| t.as_str() == s)
  }
}

/// Section of the day UI a block is rendered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockGroup {
  Resource,
  Challenge,
}

impl BlockGroup {
  pub fn from_wire(s: &str) -> Option<Self> {
    match s {
      "resource" => Some(BlockGroup::Resource),
      "challenge" => Some(BlockGroup::Challenge),
      _ => None,
    }
  }
}

/// Only meaningful inside the resource group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockRole {
  Primary,
  Support,
}

impl BlockRole {
  pub fn from_wire(s: &str) -> Option<Self> {
    match s {
      "primary" => Some(BlockRole::Primary),
      "support" => Some(BlockRole::Support),
      _ => None,
    }
  }
}

/// Presentation hint for supporting resource blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceSlot {
  Link,
  Download,
  Text,
  Media,
  None,
}

impl ResourceSlot {
  pub fn from_wire(s: &str) -> Option<Self> {
    match s {
      "link" => Some(ResourceSlot::Link),
      "download" => Some(ResourceSlot::Download),
      "text" => Some(ResourceSlot::Text),
      "media" => Some(ResourceSlot::Media),
      "none" => Some(ResourceSlot::None),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBlock {
  pub id: String,
  pub group: BlockGroup,
  pub role: BlockRole,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resource_slot: Option<ResourceSlot>,
  #[serde(flatten)]
  pub body: BlockBody,
}

/// Typed payload. The serde tag doubles as the stored `type` discriminator.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockBody {
  Text { html: String },
  Video(MediaBody),
  Audio(MediaBody),
  Image(MediaBody),
  File(MediaBody),
  Checklist(ChecklistBody),
  Quiz(QuizBody),
  ChallengeSteps(StepsBody),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MediaBody {
  pub url: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub caption: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChecklistBody {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  pub items: Vec<ChecklistItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChecklistItem {
  pub id: String,
  pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QuizBody {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  pub questions: Vec<QuizQuestion>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub id: String,
  pub prompt: String,
  pub options: Vec<String>,
  /// Always emitted; `null` when no valid answer is set.
  pub correct_index: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StepsBody {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  pub steps: Vec<ChallengeStep>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChallengeStep {
  pub id: String,
  pub label: String,
  pub text: String,
}

impl BlockBody {
  pub fn block_type(&self) -> BlockType {
    match self {
      BlockBody::Text { .. } => BlockType::Text,
      BlockBody::Video(_) => BlockType::Video,
      BlockBody::Audio(_) => BlockType::Audio,
      BlockBody::Image(_) => BlockType::Image,
      BlockBody::File(_) => BlockType::File,
      BlockBody::Checklist(_) => BlockType::Checklist,
      BlockBody::Quiz(_) => BlockType::Quiz,
      BlockBody::ChallengeSteps(_) => BlockType::ChallengeSteps,
    }
  }

  pub fn media(&self) -> Option<&MediaBody> {
    match self {
      BlockBody::Video(m) | BlockBody::Audio(m) | BlockBody::Image(m) | BlockBody::File(m) => Some(m),
      _ => None,
    }
  }

  /// Minimal valid payload for a freshly created block.
  fn empty(kind: BlockType) -> Self {
    match kind {
      BlockType::Text => BlockBody::Text { html: String::new() },
      BlockType::Video => BlockBody::Video(MediaBody::default()),
      BlockType::Audio => BlockBody::Audio(MediaBody::default()),
      BlockType::Image => BlockBody::Image(MediaBody::default()),
      BlockType::File => BlockBody::File(MediaBody::default()),
      BlockType::Checklist => BlockBody::Checklist(ChecklistBody {
        title: None,
        items: vec![ChecklistItem { id: new_id(), text: String::new() }],
      }),
      BlockType::Quiz => BlockBody::Quiz(QuizBody {
        title: None,
        questions: vec![QuizQuestion {
          id: new_id(),
          prompt: String::new(),
          options: vec![String::new(), String::new()],
          correct_index: Some(0),
          explanation: None,
        }],
      }),
      BlockType::ChallengeSteps => BlockBody::ChallengeSteps(StepsBody {
        title: None,
        steps: vec![ChallengeStep { id: new_id(), label: step_label(1), text: String::new() }],
      }),
    }
  }
}

impl DayBlock {
  pub fn block_type(&self) -> BlockType {
    self.body.block_type()
  }

  pub fn is_resource(&self) -> bool {
    self.group == BlockGroup::Resource
  }

  /// `resource` group and `primary` role; challenge blocks never qualify.
  pub fn is_marked_primary(&self) -> bool {
    self.is_resource() && self.role == BlockRole::Primary
  }

  pub fn media_url(&self) -> Option<&str> {
    self.body.media().map(|m| m.url.as_str())
  }

  /// Title-ish label used by listings when there is no text to summarize.
  pub fn label(&self) -> Option<&str> {
    let label = match &self.body {
      BlockBody::Text { .. } => None,
      BlockBody::Video(m) | BlockBody::Audio(m) | BlockBody::Image(m) | BlockBody::File(m) => m.caption.as_deref(),
      BlockBody::Checklist(c) => c.title.as_deref(),
      BlockBody::Quiz(q) => q.title.as_deref(),
      BlockBody::ChallengeSteps(s) => s.title.as_deref(),
    };
    label.map(str::trim).filter(|s| !s.is_empty())
  }
}

/// Fresh opaque identifier for authored blocks and their sub-entities.
pub fn new_id() -> String {
  Uuid::new_v4().to_string()
}

/// Auto label for challenge steps, 1-based.
pub fn step_label(n: usize) -> String {
  format!("Paso {n}")
}

/// Grouping a block type gets when nothing else says otherwise.
pub fn default_group_for(kind: BlockType) -> BlockGroup {
  match kind {
    BlockType::Checklist | BlockType::Quiz | BlockType::ChallengeSteps => BlockGroup::Challenge,
    _ => BlockGroup::Resource,
  }
}

/// Slots a supporting resource block of this type may be rendered in (`none` is always allowed).
pub fn allowed_slots(kind: BlockType) -> &'static [ResourceSlot] {
  match kind {
    BlockType::Text => &[ResourceSlot::Text],
    BlockType::Video | BlockType::Audio => &[ResourceSlot::Link],
    BlockType::Image => &[ResourceSlot::Media, ResourceSlot::Link],
    BlockType::File => &[ResourceSlot::Download, ResourceSlot::Link],
    BlockType::Checklist | BlockType::Quiz | BlockType::ChallengeSteps => &[],
  }
}

pub fn slot_allowed(kind: BlockType, slot: ResourceSlot) -> bool {
  slot == ResourceSlot::None || allowed_slots(kind).contains(&slot)
}

/// Slot a supporting resource block gets on save when it has none.
pub fn default_slot_for(kind: BlockType) -> ResourceSlot {
  allowed_slots(kind).first().copied().unwrap_or(ResourceSlot::None)
}

/// Well-formed default block of the requested type, with a fresh id and `support` role.
pub fn create_block(kind: BlockType) -> DayBlock {
  DayBlock {
    id: new_id(),
    group: default_group_for(kind),
    role: BlockRole::Support,
    resource_slot: None,
    body: BlockBody::empty(kind),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn factory_defaults_group_by_type() {
    for kind in BlockType::ALL {
      let b = create_block(kind);
      assert_eq!(b.block_type(), kind);
      assert_eq!(b.role, BlockRole::Support);
      assert!(!b.id.is_empty());
      let expected = if matches!(kind, BlockType::Checklist | BlockType::Quiz | BlockType::ChallengeSteps) {
        BlockGroup::Challenge
      } else {
        BlockGroup::Resource
      };
      assert_eq!(b.group, expected, "{}", kind.as_str());
    }
  }

  #[test]
  fn new_quiz_has_one_question_with_two_options() {
    let b = create_block(BlockType::Quiz);
    let BlockBody::Quiz(q) = &b.body else { panic!("not a quiz") };
    assert_eq!(q.questions.len(), 1);
    assert_eq!(q.questions[0].options, vec![String::new(), String::new()]);
    assert_eq!(q.questions[0].correct_index, Some(0));
  }

  #[test]
  fn new_checklist_has_one_empty_item() {
    let b = create_block(BlockType::Checklist);
    let BlockBody::Checklist(c) = &b.body else { panic!("not a checklist") };
    assert_eq!(c.items.len(), 1);
    assert!(c.items[0].text.is_empty());
  }

  #[test]
  fn ids_are_unique() {
    let a = create_block(BlockType::Text);
    let b = create_block(BlockType::Text);
    assert_ne!(a.id, b.id);
  }

  #[test]
  fn wire_names_round_trip() {
    for kind in BlockType::ALL {
      assert_eq!(BlockType::from_wire(kind.as_str()), Some(kind));
    }
    assert_eq!(BlockType::from_wire("slideshow"), None);
  }

  #[test]
  fn slot_table_matches_media_kind() {
    assert!(slot_allowed(BlockType::Image, ResourceSlot::Media));
    assert!(!slot_allowed(BlockType::Video, ResourceSlot::Media));
    assert!(slot_allowed(BlockType::File, ResourceSlot::Download));
    assert!(!slot_allowed(BlockType::Image, ResourceSlot::Download));
    assert!(slot_allowed(BlockType::Quiz, ResourceSlot::None));
    assert_eq!(default_slot_for(BlockType::Text), ResourceSlot::Text);
    assert_eq!(default_slot_for(BlockType::Checklist), ResourceSlot::None);
  }
}

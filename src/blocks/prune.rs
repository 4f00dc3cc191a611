//! Save-time cleanup. Parsing keeps half-written entries around so authors don't
//! lose them mid-edit; saving drops whatever cannot be shown to a learner.

use std::collections::HashSet;

use super::resolve::resolve_primary_resource;
use super::schema::*;

/// Strict pass run on an authored block list right before it is serialized.
pub fn prune_for_save(blocks: Vec<DayBlock>) -> Vec<DayBlock> {
  let mut seen_primary = false;
  blocks
    .into_iter()
    .map(|mut block| {
      match block.group {
        BlockGroup::Challenge => block.role = BlockRole::Support,
        BlockGroup::Resource if block.role == BlockRole::Primary => {
          if seen_primary {
            block.role = BlockRole::Support;
          }
          seen_primary = true;
        }
        BlockGroup::Resource => {}
      }
      if block.is_resource() && block.role == BlockRole::Support && block.resource_slot.is_none() {
        block.resource_slot = Some(default_slot_for(block.block_type()));
      }
      prune_body(&mut block.body);
      block
    })
    .collect()
}

fn prune_body(body: &mut BlockBody) {
  match body {
    BlockBody::Text { .. } => {}
    BlockBody::Video(m) | BlockBody::Audio(m) | BlockBody::Image(m) | BlockBody::File(m) => {
      m.url = m.url.trim().to_string();
      m.caption = trimmed(m.caption.take());
    }
    BlockBody::Checklist(c) => {
      c.title = trimmed(c.title.take());
      let mut ids = HashSet::new();
      c.items = std::mem::take(&mut c.items)
        .into_iter()
        .filter_map(|mut item| {
          item.text = item.text.trim().to_string();
          (!item.text.is_empty() && ids.insert(item.id.clone())).then_some(item)
        })
        .collect();
    }
    BlockBody::Quiz(q) => {
      q.title = trimmed(q.title.take());
      let mut ids = HashSet::new();
      q.questions = std::mem::take(&mut q.questions)
        .into_iter()
        .filter_map(prune_question)
        .filter(|question| ids.insert(question.id.clone()))
        .collect();
    }
    BlockBody::ChallengeSteps(s) => {
      s.title = trimmed(s.title.take());
      let mut ids = HashSet::new();
      s.steps = std::mem::take(&mut s.steps)
        .into_iter()
        .filter_map(|mut step| {
          step.text = step.text.trim().to_string();
          (!step.text.is_empty() && ids.insert(step.id.clone())).then_some(step)
        })
        .enumerate()
        .map(|(i, mut step)| {
          let label = step.label.trim();
          step.label = if label.is_empty() { step_label(i + 1) } else { label.to_string() };
          step
        })
        .collect();
    }
  }
}

/// Drops empty options (keeping `correctIndex` pointed at the same option) and
/// rejects questions that cannot be answered.
fn prune_question(mut q: QuizQuestion) -> Option<QuizQuestion> {
  q.prompt = q.prompt.trim().to_string();
  let mut correct = None;
  let mut options = Vec::with_capacity(q.options.len());
  for (i, option) in q.options.iter().enumerate() {
    let option = option.trim();
    if option.is_empty() {
      continue;
    }
    if q.correct_index == Some(i) {
      correct = Some(options.len());
    }
    options.push(option.to_string());
  }
  if q.prompt.is_empty() || options.len() < 2 {
    return None;
  }
  q.options = options;
  q.correct_index = correct;
  q.explanation = trimmed(q.explanation.take());
  Some(q)
}

fn trimmed(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Value for the legacy `video_url` column: the primary block's URL when it is a video.
pub fn legacy_video_url(blocks: &[DayBlock]) -> Option<String> {
  let primary = resolve_primary_resource(blocks)?;
  if primary.block.block_type() != BlockType::Video {
    return None;
  }
  primary.block.media_url().filter(|u| !u.is_empty()).map(str::to_string)
}

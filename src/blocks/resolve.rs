//! Primary-resource resolution: which single block is "the" material of a day.
//!
//! Precedence, always in document order:
//!   1. first resource block explicitly marked `primary`
//!   2. first resource video with a recognizable provider id
//!   3. first resource block of any type
//!   4. nothing (challenge-only day)

use serde::Serialize;
use url::Url;

use super::schema::{BlockType, DayBlock};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoProvider {
  Youtube,
  Vimeo,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VideoRef {
  pub provider: VideoProvider,
  pub id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
  MarkedPrimary,
  FirstPlayableVideo,
  FirstResource,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrimaryResource<'a> {
  pub index: usize,
  pub block: &'a DayBlock,
  pub reason: SelectionReason,
  pub video: Option<VideoRef>,
  /// Learner must watch before marking the day complete.
  pub gating: bool,
}

pub fn resolve_primary_resource(blocks: &[DayBlock]) -> Option<PrimaryResource<'_>> {
  let resources = || blocks.iter().enumerate().filter(|(_, b)| b.is_resource());

  let (index, block, reason) = resources()
    .find(|(_, b)| b.is_marked_primary())
    .map(|(i, b)| (i, b, SelectionReason::MarkedPrimary))
    .or_else(|| {
      resources()
        .find(|(_, b)| playable_video(b).is_some())
        .map(|(i, b)| (i, b, SelectionReason::FirstPlayableVideo))
    })
    .or_else(|| resources().next().map(|(i, b)| (i, b, SelectionReason::FirstResource)))?;

  let video = playable_video(block);
  let gating = video.is_some();
  Some(PrimaryResource { index, block, reason, video, gating })
}

fn playable_video(block: &DayBlock) -> Option<VideoRef> {
  if block.block_type() != BlockType::Video {
    return None;
  }
  block.media_url().and_then(extract_video_ref)
}

/// Recognize YouTube and Vimeo links. Scheme-less input ("youtu.be/ID") is accepted.
pub fn extract_video_ref(raw: &str) -> Option<VideoRef> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  let url = Url::parse(raw).or_else(|_| Url::parse(&format!("https://{raw}"))).ok()?;
  let host = url.host_str()?.to_ascii_lowercase();
  let host = host.trim_start_matches("www.").trim_start_matches("m.");
  let segments: Vec<&str> = url.path_segments().map(|s| s.filter(|p| !p.is_empty()).collect()).unwrap_or_default();

  match host {
    "youtu.be" => segments.first().copied().and_then(youtube_id),
    "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => match segments.as_slice() {
      ["watch", ..] => url
        .query_pairs()
        .find(|(k, _)| k == "v")
        .and_then(|(_, v)| youtube_id(&v)),
      ["embed" | "shorts" | "live" | "v", id, ..] => youtube_id(id),
      _ => None,
    },
    "vimeo.com" => segments.first().copied().and_then(vimeo_id),
    "player.vimeo.com" => match segments.as_slice() {
      ["video", id, ..] => vimeo_id(id),
      _ => None,
    },
    _ => None,
  }
}

fn youtube_id(candidate: &str) -> Option<VideoRef> {
  let valid = candidate.len() == 11 && candidate.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
  valid.then(|| VideoRef { provider: VideoProvider::Youtube, id: candidate.to_string() })
}

fn vimeo_id(candidate: &str) -> Option<VideoRef> {
  let valid = !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit());
  valid.then(|| VideoRef { provider: VideoProvider::Vimeo, id: candidate.to_string() })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blocks::parse::parse_day_content;
  use crate::blocks::schema::*;

  fn block(id: &str, group: BlockGroup, role: BlockRole, body: BlockBody) -> DayBlock {
    DayBlock { id: id.into(), group, role, resource_slot: None, body }
  }

  fn video(id: &str, url: &str) -> DayBlock {
    block(id, BlockGroup::Resource, BlockRole::Support, BlockBody::Video(MediaBody { url: url.into(), caption: None }))
  }

  fn text(id: &str) -> DayBlock {
    block(id, BlockGroup::Resource, BlockRole::Support, BlockBody::Text { html: "<p>x</p>".into() })
  }

  #[test]
  fn youtube_variants() {
    for url in [
      "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
      "https://youtu.be/dQw4w9WgXcQ?t=42",
      "youtube.com/embed/dQw4w9WgXcQ",
      "https://m.youtube.com/shorts/dQw4w9WgXcQ",
      "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
      "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
    ] {
      let r = extract_video_ref(url).unwrap_or_else(|| panic!("no id for {url}"));
      assert_eq!(r, VideoRef { provider: VideoProvider::Youtube, id: "dQw4w9WgXcQ".into() });
    }
  }

  #[test]
  fn vimeo_and_rejects() {
    assert_eq!(extract_video_ref("https://vimeo.com/76979871").map(|r| r.provider), Some(VideoProvider::Vimeo));
    assert_eq!(extract_video_ref("https://player.vimeo.com/video/76979871").map(|r| r.id), Some("76979871".into()));
    assert_eq!(extract_video_ref("https://cdn.example.com/clip.mp4"), None);
    assert_eq!(extract_video_ref("https://youtu.be/short"), None);
    assert_eq!(extract_video_ref(""), None);
  }

  #[test]
  fn marked_primary_wins() {
    let mut t = text("t");
    t.role = BlockRole::Primary;
    let blocks = vec![video("v", "https://youtu.be/dQw4w9WgXcQ"), t];
    let p = resolve_primary_resource(&blocks).unwrap();
    assert_eq!(p.block.id, "t");
    assert_eq!(p.reason, SelectionReason::MarkedPrimary);
    assert!(!p.gating);
  }

  #[test]
  fn first_marked_primary_in_document_order() {
    let mut a = video("a", "https://cdn.example.com/a.mp4");
    a.role = BlockRole::Primary;
    let mut b = video("b", "https://youtu.be/dQw4w9WgXcQ");
    b.role = BlockRole::Primary;
    let blocks = vec![text("t"), a, b];
    let p = resolve_primary_resource(&blocks).unwrap();
    assert_eq!((p.index, p.block.id.as_str()), (1, "a"));
    assert!(!p.gating, "a video without a provider id cannot gate");
  }

  #[test]
  fn playable_video_beats_earlier_resources() {
    let blocks = vec![text("t"), video("raw", "https://cdn.example.com/a.mp4"), video("yt", "https://youtu.be/dQw4w9WgXcQ")];
    let p = resolve_primary_resource(&blocks).unwrap();
    assert_eq!(p.block.id, "yt");
    assert_eq!(p.reason, SelectionReason::FirstPlayableVideo);
    assert!(p.gating);
  }

  #[test]
  fn falls_back_to_first_resource_then_nothing() {
    let quiz = create_block(BlockType::Quiz);
    let blocks = vec![quiz.clone(), text("t")];
    let p = resolve_primary_resource(&blocks).unwrap();
    assert_eq!((p.index, p.reason), (1, SelectionReason::FirstResource));
    assert!(resolve_primary_resource(&[quiz]).is_none());
    assert!(resolve_primary_resource(&[]).is_none());
  }

  #[test]
  fn challenge_blocks_never_selected_even_if_marked() {
    let mut steps = create_block(BlockType::ChallengeSteps);
    steps.role = BlockRole::Primary;
    assert!(resolve_primary_resource(&[steps]).is_none());
  }

  #[test]
  fn legacy_video_column_gates() {
    let blocks = parse_day_content(Some(""), Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
    let p = resolve_primary_resource(&blocks).unwrap();
    assert_eq!(p.block.id, crate::blocks::parse::LEGACY_VIDEO_ID);
    assert_eq!(p.reason, SelectionReason::MarkedPrimary);
    assert!(p.gating);
    assert_eq!(p.video.map(|v| v.id), Some("dQw4w9WgXcQ".into()));
  }

  #[test]
  fn multiple_primaries_resolve_to_exactly_one() {
    let content = serde_json::json!([
      { "id": "a", "type": "text", "role": "primary", "html": "a" },
      { "id": "b", "type": "video", "role": "primary", "url": "https://youtu.be/dQw4w9WgXcQ" }
    ])
    .to_string();
    let blocks = parse_day_content(Some(&content), None);
    assert_eq!(blocks.iter().filter(|b| b.is_marked_primary()).count(), 2);
    let first = resolve_primary_resource(&blocks).unwrap();
    let again = resolve_primary_resource(&parse_day_content(Some(&content), None)).map(|p| p.block.id.clone());
    assert_eq!(first.block.id, "a");
    assert_eq!(again.as_deref(), Some("a"));
  }
}

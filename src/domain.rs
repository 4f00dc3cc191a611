//! Records owned by the backing store: labs and their days.
//!
//! A day's blocks are not stored as rows of their own; they live serialized
//! inside `Day::content` (see `crate::blocks`).

/// A multi-day learning track.
#[derive(Clone, Debug, PartialEq)]
pub struct Lab {
  pub slug: String,
  pub title: String,
  pub description: String,
}

/// One day of a lab. `day_number` is unique within the lab and orders the days.
#[derive(Clone, Debug, PartialEq)]
pub struct Day {
  pub lab_slug: String,
  pub day_number: u32,
  pub title: String,
  /// Legacy column, kept in sync with the primary video on every save.
  pub video_url: Option<String>,
  /// Serialized block payload, or legacy plain text.
  pub content: Option<String>,
  /// Bumped on every write; writes are last-write-wins.
  pub revision: u64,
}
